//! Configuration loading and management

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Configuration of a playground session
///
/// Every field is optional in YAML; missing ones take the built-in defaults.
///
/// ```yaml
/// endpoint: https://countries.trevorblades.com/
/// demo_schema: blog
/// request_timeout_secs: 30
/// log_filter: playground=debug
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaygroundConfig {
    /// Endpoint requests are posted to
    pub endpoint: String,

    /// Initial query editor text
    pub query: String,

    /// Initial variables editor text (JSON)
    pub variables: String,

    /// Demo schema to load at startup (e.g., "blog")
    pub demo_schema: Option<String>,

    /// HTTP timeout in seconds (requests never time out when unset)
    pub request_timeout_secs: Option<u64>,

    /// Tracing filter used when `RUST_LOG` is not set
    pub log_filter: String,
}

/// Public endpoint the sample query targets
pub const DEFAULT_ENDPOINT: &str = "https://countries.trevorblades.com/";

/// Sample query shown in a fresh session
pub const DEFAULT_QUERY: &str = "query GetCountries($first: Int) {
  countries(first: $first) {
    code
    name
    emoji
    currency
  }
}";

/// Variables of the sample query
pub const DEFAULT_VARIABLES: &str = "{\n  \"first\": 5\n}";

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            query: DEFAULT_QUERY.to_string(),
            variables: DEFAULT_VARIABLES.to_string(),
            demo_schema: None,
            request_timeout_secs: None,
            log_filter: "info".to_string(),
        }
    }
}

impl PlaygroundConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Install a fmt subscriber filtered by `RUST_LOG`, or by `log_filter` when unset
    ///
    /// Does nothing when a global subscriber is already installed.
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.log_filter));

        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }
}
