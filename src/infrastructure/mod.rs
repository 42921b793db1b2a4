//! Infrastructure layer module
//!
//! External integrations and process plumbing:
//! - JIRA REST API client
//! - Configuration management
//! - Logging infrastructure
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod jira;
pub mod logging;
