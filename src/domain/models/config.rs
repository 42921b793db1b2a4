//! Gateway configuration model.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for the gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Inbound HTTP listener
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream JIRA connection
    #[serde(default)]
    pub jira: JiraConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    /// Interface to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// JIRA Cloud connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct JiraConfig {
    /// Base URL of the JIRA instance, e.g. `https://acme.atlassian.net`
    #[serde(default)]
    pub url: String,

    /// Account email used for Basic authentication
    #[serde(default)]
    pub user_email: String,

    /// API token paired with `user_email`
    #[serde(default)]
    pub api_token: String,

    /// Custom field holding the "Epic Link". Varies between JIRA instances;
    /// `customfield_10014` and `customfield_10008` are common.
    #[serde(default = "default_epic_link_field")]
    pub epic_link_field: String,

    /// Per-request timeout for upstream calls, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Epic Link field id used by most JIRA Cloud instances.
pub const DEFAULT_EPIC_LINK_FIELD: &str = "customfield_10014";

fn default_epic_link_field() -> String {
    DEFAULT_EPIC_LINK_FIELD.to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            user_email: String::new(),
            api_token: String::new(),
            epic_link_field: default_epic_link_field(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Stdout format
    #[serde(default)]
    pub format: LogFormat,

    /// Directory for rolling log files (stdout only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Rotation policy for the log file
    #[serde(default)]
    pub rotation: RotationPolicy,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            log_dir: None,
            rotation: RotationPolicy::default(),
        }
    }
}

/// Stdout log encoding.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Human-readable, multi-line
    Pretty,
}

/// How often the log file rolls over.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    /// New file every day
    #[default]
    Daily,
    /// New file every hour
    Hourly,
    /// Single file, never rotated
    Never,
}
