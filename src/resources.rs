//! Resource wiring table.
//!
//! Each list resource exposed by the proxy is one row here instead of its own
//! set of handlers.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::search::DEFAULT_PAGE_SIZE;

/// One proxied resource.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct ResourceConfig {
    /// Path segment used by clients, e.g. `active-compounds`.
    #[validate(length(min = 1))]
    pub name: String,
    /// Upstream collection endpoint, e.g. `/api/active-compounds`.
    #[validate(length(min = 1))]
    pub endpoint: String,
    /// Human label used in success messages.
    #[validate(length(min = 1))]
    pub label: String,
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 200))]
    pub default_page_size: u32,
    /// Whether search and detail reads work without a token.
    #[serde(default = "default_public_read")]
    pub public_read: bool,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_public_read() -> bool {
    true
}

impl ResourceConfig {
    pub fn new(name: &str, label: &str, default_page_size: u32, public_read: bool) -> Self {
        Self {
            name: name.to_string(),
            endpoint: format!("/api/{name}"),
            label: label.to_string(),
            default_page_size,
            public_read,
        }
    }

    pub fn search_endpoint(&self, query: &str) -> String {
        format!("{}/search?{query}", self.collection())
    }

    pub fn item_endpoint(&self, id: &str) -> String {
        format!("{}/{id}", self.collection())
    }

    pub fn collection(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }

    /// Reads honour `public_read`; writes always need a token.
    pub fn requires_auth(&self, action: Action) -> bool {
        match action {
            Action::Search | Action::Get => !self.public_read,
            Action::Create | Action::Update | Action::Delete => true,
        }
    }

    pub fn success_message(&self, action: Action) -> String {
        let verb = match action {
            Action::Search => "retrieved",
            Action::Get => "loaded",
            Action::Create => "created",
            Action::Update => "updated",
            Action::Delete => "deleted",
        };
        format!("{} {verb} successfully", self.label)
    }
}

/// Operations every resource supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Search,
    Get,
    Create,
    Update,
    Delete,
}

/// Built-in table used when configuration provides none.
pub fn default_resources() -> Vec<ResourceConfig> {
    vec![
        ResourceConfig::new("plants", "Plants", 12, true),
        ResourceConfig::new("experts", "Experts", 10, true),
        ResourceConfig::new("research", "Research", 10, true),
        ResourceConfig::new("families", "Families", 10, true),
        ResourceConfig::new("genera", "Genera", 10, true),
        ResourceConfig::new("active-compounds", "Active compounds", 10, true),
        ResourceConfig::new("diseases", "Diseases", 10, true),
        ResourceConfig::new("media", "Media", 12, true),
        ResourceConfig::new("users", "Users", 10, false),
    ]
}

/// Lookup over the configured resources.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceRegistry {
    resources: Vec<ResourceConfig>,
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new(default_resources())
    }
}

impl ResourceRegistry {
    pub fn new(resources: Vec<ResourceConfig>) -> Self {
        Self { resources }
    }

    pub fn get(&self, name: &str) -> Option<&ResourceConfig> {
        self.resources.iter().find(|resource| resource.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceConfig> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_covers_every_resource() {
        let registry = ResourceRegistry::default();

        for name in [
            "plants",
            "experts",
            "research",
            "families",
            "genera",
            "active-compounds",
            "users",
            "diseases",
            "media",
        ] {
            let resource = registry.get(name).expect("resource should be registered");
            assert!(resource.validate().is_ok());
        }
        assert!(registry.get("herbs").is_none());
        assert_eq!(registry.iter().next().map(|r| r.name.as_str()), Some("plants"));
        assert!(!registry.is_empty());
        assert!(ResourceRegistry::new(Vec::new()).is_empty());
    }

    #[test]
    fn endpoints_are_built_from_the_collection() {
        let mut resource = ResourceConfig::new("genera", "Genera", 10, true);
        resource.endpoint = "/api/v2/genera/".to_string();

        assert_eq!(
            resource.search_endpoint("pageIndex=1&pageSize=10"),
            "/api/v2/genera/search?pageIndex=1&pageSize=10"
        );
        assert_eq!(resource.item_endpoint("42"), "/api/v2/genera/42");
    }

    #[test]
    fn writes_always_require_auth() {
        let plants = ResourceConfig::new("plants", "Plants", 12, true);
        let users = ResourceConfig::new("users", "Users", 10, false);

        assert!(!plants.requires_auth(Action::Search));
        assert!(plants.requires_auth(Action::Delete));
        assert!(users.requires_auth(Action::Get));
        assert_eq!(
            plants.success_message(Action::Create),
            "Plants created successfully"
        );
    }

    #[test]
    fn zero_page_size_fails_validation() {
        let resource = ResourceConfig::new("plants", "Plants", 0, true);
        assert!(resource.validate().is_err());
    }
}
