use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Public web address that shareable links point at
#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_web_base_url")]
    pub base_url: String,
}

fn default_web_base_url() -> String {
    "https://cipherb.in".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            base_url: default_web_base_url(),
        }
    }
}

/// Remote message API configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    /// Upper bound for every store request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://api.cipherb.in".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Helper to join a base URL and a path with proper slash handling
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{}/{}", base, path)
}

/// Root application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(None)
    }

    /// Same as [`AppConfig::load`], with an extra file layered above the
    /// default files and below the environment.
    pub fn load_with(extra: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(extra, environment())
    }

    fn load_from(extra: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            // Start with default config file
            .add_source(File::with_name("config/default").required(false))
            // Override with local config if present
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = extra {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder.add_source(env).build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.web.base_url.trim().is_empty() {
            return Err(ConfigError::Message("web.base_url must not be empty".into()));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Message("api.base_url must not be empty".into()));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Message("api.timeout_secs must be positive".into()));
        }
        Ok(())
    }
}

/// Environment overrides (prefix: CIPHERLINK_)
/// e.g., CIPHERLINK_WEB__BASE_URL, CIPHERLINK_API__TIMEOUT_SECS
fn environment() -> Environment {
    Environment::with_prefix("CIPHERLINK")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        assert_eq!(endpoint_url("http://localhost:8000/", "/msg"), "http://localhost:8000/msg");
        assert_eq!(endpoint_url("http://localhost:8000", "msg"), "http://localhost:8000/msg");
    }

    #[test]
    fn test_single_underscore_prefix_overrides() {
        let vars: config::Map<String, String> = [
            ("CIPHERLINK_WEB__BASE_URL", "https://single.example"),
            ("CIPHERLINK_API__BASE_URL", "https://api.single.example"),
            ("CIPHERLINK_API__TIMEOUT_SECS", "3"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = AppConfig::load_from(None, environment().source(Some(vars))).unwrap();
        assert_eq!(config.web.base_url, "https://single.example");
        assert_eq!(config.api.base_url, "https://api.single.example");
        assert_eq!(config.api.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_files_and_defaults_without_overrides() {
        let config =
            AppConfig::load_from(None, environment().source(Some(config::Map::new()))).unwrap();
        assert_eq!(config.web.base_url, "https://cipherb.in");
        assert_eq!(config.api.timeout_secs, 15);
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.web.base_url, "https://cipherb.in");
        assert_eq!(config.api.base_url, "https://api.cipherb.in");
        assert_eq!(config.api.timeout_secs, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = AppConfig::default();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
