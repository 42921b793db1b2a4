//! Layered configuration loading and validation.

use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::value::{Uncased, UncasedStr};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Prefix shared by every environment variable the gateway reads.
pub const ENV_PREFIX: &str = "JIRA_MCP_";

/// Project config file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required key has no value in any source.
    #[error("Required configuration value not set: {key}. Set it in config.yaml or via {env_var}")]
    MissingRequired {
        /// Dotted config key, e.g. `jira.url`.
        key: &'static str,
        /// Environment variable that would supply it.
        env_var: &'static str,
    },

    /// JIRA URL without an http(s) scheme.
    #[error("Invalid JIRA URL: {0}. Must start with http:// or https://")]
    InvalidJiraUrl(String),

    /// Port 0.
    #[error("Invalid port: {0}. Must be between 1 and 65535")]
    InvalidPort(u16),

    /// Blank `jira.epic_link_field`.
    #[error("Epic link field cannot be empty")]
    EmptyEpicLinkField,

    /// Zero request timeout.
    #[error("Invalid timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    /// Log level outside the accepted set.
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. `config.yaml` in the working directory (optional)
    /// 3. The file passed as `explicit` (must exist when given)
    /// 4. Environment variables (`JIRA_MCP_*` prefix, highest priority)
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        if let Some(path) = explicit {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
        }

        let config: Config = Self::figment(Path::new(DEFAULT_CONFIG_FILE), explicit)
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Build the provider chain without extracting it.
    pub fn figment(base_file: &Path, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file));

        if let Some(path) = explicit {
            figment = figment.merge(Yaml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).map(map_env_key))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let required = [
            ("jira.url", "JIRA_MCP_JIRA_URL", &config.jira.url),
            ("jira.user_email", "JIRA_MCP_JIRA_USER_EMAIL", &config.jira.user_email),
            ("jira.api_token", "JIRA_MCP_JIRA_API_TOKEN", &config.jira.api_token),
        ];
        for (key, env_var, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingRequired { key, env_var });
            }
        }

        let url = config.jira.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidJiraUrl(config.jira.url.clone()));
        }

        if config.server.port == 0 {
            return Err(ConfigError::InvalidPort(config.server.port));
        }

        if config.jira.epic_link_field.trim().is_empty() {
            return Err(ConfigError::EmptyEpicLinkField);
        }

        if config.jira.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.jira.timeout_secs));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        Ok(())
    }
}

/// Map a prefix-stripped environment key onto a config path.
///
/// Nested keys use `__` (`JIRA_MCP_LOGGING__LEVEL` -> `logging.level`).
/// Flat names such as `JIRA_MCP_PORT` and `JIRA_MCP_JIRA_URL` are accepted as aliases.
fn map_env_key(key: &UncasedStr) -> Uncased<'_> {
    let lowered = key.as_str().to_ascii_lowercase();
    let mapped = match lowered.as_str() {
        "port" => "server.port".to_string(),
        "host" => "server.host".to_string(),
        "jira_url" => "jira.url".to_string(),
        "jira_user_email" => "jira.user_email".to_string(),
        "jira_api_token" => "jira.api_token".to_string(),
        "epic_link_field" => "jira.epic_link_field".to_string(),
        other => other.replace("__", "."),
    };
    Uncased::from(mapped)
}
