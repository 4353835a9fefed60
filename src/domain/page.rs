use serde::{Deserialize, Serialize};

/// One slice of a paginated list as reported by the upstream service.
///
/// `number` is whatever the upstream reports; some endpoints count pages from
/// zero, others from one.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u64,
    #[serde(default, alias = "pageIndex")]
    pub number: u64,
    #[serde(default, alias = "pageSize")]
    pub size: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            content: Vec::new(),
            total_elements: 0,
            total_pages: 0,
            number: 0,
            size: 0,
        }
    }
}
