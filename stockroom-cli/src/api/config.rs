//! HTTP client configuration with builder pattern

use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Settings for talking to the inventory backend
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// API root, without trailing slash (e.g., "https://shop.example.com/api")
    pub base_url: String,
    /// Bearer token sent with every request
    pub token: Option<String>,
    /// Whole-request timeout; `None` leaves the transport default
    pub timeout: Option<Duration>,
    pub user_agent: String,
    /// Collection name -> path override (e.g., "employees" -> "staff")
    pub endpoints: HashMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout: None,
            user_agent: format!("stockroom/{}", env!("CARGO_PKG_VERSION")),
            endpoints: HashMap::new(),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for ClientConfig
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Path segment for a collection, honoring overrides
    pub fn collection_path<'a>(&'a self, collection: &'a str) -> &'a str {
        self.endpoints
            .get(collection)
            .map(|p| p.trim_matches('/'))
            .unwrap_or(collection)
    }

    /// Absolute URL for a collection plus optional suffix (e.g., "/bulk")
    pub fn url_for(&self, collection: &str, suffix: &str) -> String {
        format!(
            "{}/{}{}",
            self.base_url.trim_end_matches('/'),
            self.collection_path(collection),
            suffix
        )
    }
}

/// Builder for ClientConfig
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Set the API root URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the bearer token
    pub fn token(mut self, token: Option<String>) -> Self {
        self.config.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Route a collection to a different path
    pub fn endpoint(mut self, collection: impl Into<String>, path: impl Into<String>) -> Self {
        self.config.endpoints.insert(collection.into(), path.into());
        self
    }

    /// Build the final configuration
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
