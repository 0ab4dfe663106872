//! Layered configuration
//!
//! Precedence, lowest first: built-in defaults, the TOML file, environment
//! variables (with `.env` loaded by `main`), command-line flags.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::ClientConfig;
use crate::api::config::DEFAULT_BASE_URL;

pub const ENV_API_URL: &str = "STOCKROOM_API_URL";
pub const ENV_API_TOKEN: &str = "STOCKROOM_API_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "STOCKROOM_TIMEOUT_SECS";

const CONFIG_DIR: &str = "stockroom";
const CONFIG_FILE: &str = "config.toml";

/// Template written by `config init`
const DEFAULT_CONFIG: &str = r#"# stockroom configuration

[api]
base_url = "http://localhost:8080/api"
# token = "..."
# timeout_secs = 30

# Per-collection path overrides
[endpoints]
# employees = "staff"
"#;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    /// Collection name -> path under the API root
    pub endpoints: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout_secs: None,
            user_agent: None,
        }
    }
}

/// Values given on the command line; `None` leaves lower layers alone
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub token: Option<String>,
}

/// Default config file location (~/.config/stockroom/config.toml on Linux)
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

impl Config {
    /// Resolve all layers from the real environment
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(default_path);
        let mut config = Self::from_file(&path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_overrides(overrides);
        Ok(config)
    }

    /// Read the TOML file; a missing file yields the defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        log::info!("Loading config from: {}", path.display());
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Apply environment variables through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup(ENV_API_URL) {
            self.api.base_url = url;
        }
        if let Some(token) = lookup(ENV_API_TOKEN) {
            self.api.token = Some(token);
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs = secs
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{} must be a whole number of seconds", ENV_TIMEOUT_SECS))?;
            self.api.timeout_secs = Some(secs);
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(ref url) = overrides.api_url {
            self.api.base_url = url.clone();
        }
        if let Some(ref token) = overrides.token {
            self.api.token = Some(token.clone());
        }
    }

    /// HTTP client settings for this configuration
    pub fn to_client_config(&self) -> ClientConfig {
        let mut builder = ClientConfig::builder()
            .base_url(self.api.base_url.clone())
            .token(self.api.token.clone())
            .timeout(self.api.timeout_secs.map(Duration::from_secs));
        if let Some(ref agent) = self.api.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        for (collection, path) in &self.endpoints {
            builder = builder.endpoint(collection.clone(), path.clone());
        }
        builder.build()
    }

    /// TOML rendering with the token masked
    pub fn to_display_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        if shown.api.token.is_some() {
            shown.api.token = Some("********".to_string());
        }
        toml::to_string_pretty(&shown).context("Failed to render configuration")
    }
}

/// Write the commented default config file. Refuses to overwrite unless `force`.
pub fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    log::info!("Wrote default config to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("stockroom-config-{}", uuid::Uuid::new_v4()))
            .join(CONFIG_FILE)
    }

    #[test]
    fn test_default_config_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::from_file(&temp_path()).unwrap();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_file_layer() {
        let path = temp_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            "[api]\nbase_url = \"https://shop.example.com/api\"\ntimeout_secs = 5\n\n[endpoints]\nemployees = \"staff\"\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        std::fs::remove_dir_all(path.parent().unwrap()).ok();

        assert_eq!(config.api.base_url, "https://shop.example.com/api");
        assert_eq!(config.api.timeout_secs, Some(5));
        assert_eq!(
            config.to_client_config().url_for("employees", ""),
            "https://shop.example.com/api/staff"
        );
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let path = temp_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[api\n").unwrap();

        let result = Config::from_file(&path);
        std::fs::remove_dir_all(path.parent().unwrap()).ok();

        assert!(result.is_err());
    }

    #[test]
    fn test_precedence() {
        let mut config = Config::default();
        config.api.base_url = "http://from-file".to_string();

        config
            .apply_env(|key| match key {
                ENV_API_URL => Some("http://from-env".to_string()),
                ENV_API_TOKEN => Some("env-token".to_string()),
                ENV_TIMEOUT_SECS => Some("12".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.api.base_url, "http://from-env");
        assert_eq!(config.api.timeout_secs, Some(12));

        config.apply_overrides(&Overrides {
            api_url: Some("http://from-flag".to_string()),
            token: None,
        });
        assert_eq!(config.api.base_url, "http://from-flag");
        assert_eq!(config.api.token.as_deref(), Some("env-token"));

        let client = config.to_client_config();
        assert_eq!(client.timeout, Some(Duration::from_secs(12)));
    }

    #[test]
    fn test_bad_timeout_env() {
        let mut config = Config::default();
        let result = config.apply_env(|key| (key == ENV_TIMEOUT_SECS).then(|| "soon".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let path = temp_path();

        init(&path, false).unwrap();
        assert!(init(&path, false).is_err());
        init(&path, true).unwrap();

        let config = Config::from_file(&path).unwrap();
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_display_masks_token() {
        let mut config = Config::default();
        config.api.token = Some("secret".to_string());

        let shown = config.to_display_toml().unwrap();
        assert!(!shown.contains("secret"));
        assert!(shown.contains("********"));
    }
}
