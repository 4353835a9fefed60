//! Search request value object shared by every list resource.
//!
//! A [`SearchRequest`] is rebuilt from scratch on each parameter change; the
//! builder-style methods consume `self` and return the updated value.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sentinel filter value meaning "no constraint".
pub const FILTER_ALL: &str = "all";

/// Page size used when neither the caller nor the query string provides one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Sort order applied together with a sort field.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl Display for SortDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(()),
        }
    }
}

/// Scalar value of a named filter.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FilterValue {
    /// Whether the filter constrains the search at all.
    ///
    /// Empty strings, zero, NaN, `false` and the `"all"` sentinel are inactive.
    pub fn is_active(&self) -> bool {
        match self {
            FilterValue::Bool(value) => *value,
            FilterValue::Integer(value) => *value != 0,
            FilterValue::Float(value) => *value != 0.0 && !value.is_nan(),
            FilterValue::Text(value) => !value.is_empty() && value != FILTER_ALL,
        }
    }
}

impl Display for FilterValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterValue::Bool(value) => write!(f, "{value}"),
            FilterValue::Integer(value) => write!(f, "{value}"),
            FilterValue::Float(value) => write!(f, "{value}"),
            FilterValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Integer(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Float(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

/// Named filters in insertion order.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Filters(Vec<(String, FilterValue)>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, replacing an existing entry in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.0
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Entries that will actually reach the wire.
    pub fn active(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.iter().filter(|(_, value)| value.is_active())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Filters
where
    K: Into<String>,
    V: Into<FilterValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = Filters::new();
        for (key, value) in iter {
            filters.set(key, value);
        }
        filters
    }
}

/// Structured search parameters for one list request.
///
/// `page_index` is 1-based. Both counters are clamped to at least 1.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub page_index: u32,
    pub page_size: u32,
    pub keyword: Option<String>,
    pub sort_field: Option<String>,
    pub sort_direction: SortDirection,
    pub filters: Filters,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl SearchRequest {
    /// First page with the given page size and no constraints.
    pub fn new(page_size: u32) -> Self {
        Self {
            page_index: 1,
            page_size: page_size.max(1),
            keyword: None,
            sort_field: None,
            sort_direction: SortDirection::Asc,
            filters: Filters::new(),
        }
    }

    pub fn page(mut self, page_index: u32) -> Self {
        self.page_index = page_index.max(1);
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Stores the trimmed keyword; blank input clears it.
    pub fn keyword(mut self, keyword: impl AsRef<str>) -> Self {
        let keyword = keyword.as_ref().trim();
        self.keyword = (!keyword.is_empty()).then(|| keyword.to_string());
        self
    }

    /// Sets the sort field; blank input clears sorting.
    pub fn sort(mut self, field: impl AsRef<str>, direction: SortDirection) -> Self {
        let field = field.as_ref().trim();
        self.sort_field = (!field.is_empty()).then(|| field.to_string());
        self.sort_direction = direction;
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters.set(key, value);
        self
    }

    /// Same constraints, back on the first page.
    pub fn first_page(self) -> Self {
        self.page(1)
    }
}
