//! JIRA Gateway - HTTP front for the JIRA Cloud REST API
//!
//! Exposes a small set of simplified JSON endpoints that map one-to-one
//! onto JIRA REST v3 calls: create an issue, search with JQL, fetch an
//! issue, and list the issues of an epic.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, the error taxonomy and the `IssueTracker` port
//! - **Infrastructure Layer** (`infrastructure`): JIRA client, configuration, logging
//! - **Adapters** (`adapters`): The inbound HTTP server
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use jira_gateway::{ConfigLoader, GatewayHttpServer, HttpServerConfig, JiraClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load(None)?;
//!     let client = JiraClient::new((&config.jira).into())?;
//!     let server = GatewayHttpServer::new(Arc::new(client), HttpServerConfig::default());
//!     server.serve().await.map_err(|e| anyhow::anyhow!(e))?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use adapters::http::{ApiError, GatewayHttpServer, HttpServerConfig};
pub use domain::models::{
    Config, CreateIssueRequest, CreateIssueResult, Issue, JiraConfig, LoggingConfig,
    SearchRequest, SearchResult, ServerConfig,
};
pub use domain::{IssueTracker, JiraError, JiraResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::jira::{JiraClient, JiraClientConfig};
pub use infrastructure::logging::LoggerImpl;
