//! Configuration model loaded from external sources.

use std::time::Duration;

use serde::Deserialize;
use validator::Validate;

use crate::resources::{ResourceConfig, ResourceRegistry, default_resources};

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "http://localhost:8081";

#[derive(Clone, Debug, Deserialize, Validate)]
/// Settings shared across handlers.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    /// Prefix for this application's own routes, e.g. `/admin`. Empty for none.
    #[serde(default)]
    pub base_path: String,
    #[serde(default = "default_upstream_base_url")]
    #[validate(url)]
    pub upstream_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    #[validate(range(min = 1, max = 300))]
    pub request_timeout_secs: u64,
    #[serde(default = "default_resources")]
    #[validate(nested)]
    pub resources: Vec<ResourceConfig>,
}

fn default_upstream_base_url() -> String {
    DEFAULT_UPSTREAM_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn registry(&self) -> ResourceRegistry {
        ResourceRegistry::new(self.resources.clone())
    }

    /// Base path normalized to `""` or `/segment` without a trailing slash.
    pub fn scope_path(&self) -> String {
        let trimmed = self.base_path.trim().trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        }
    }
}
