//! Domain models for configuration and JIRA issues.

pub mod config;
pub mod issue;

pub use config::{Config, JiraConfig, LogFormat, LoggingConfig, RotationPolicy, ServerConfig};
pub use issue::{
    epic_link_jql, normalize_max_results, CreateIssueRequest, CreateIssueResult, Issue,
    SearchRequest, SearchResult, DEFAULT_MAX_RESULTS,
};
