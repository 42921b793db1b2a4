//! Domain layer for the JIRA gateway
//!
//! Request/response models, the error taxonomy and the `IssueTracker`
//! port. Nothing in here performs I/O.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{JiraError, JiraResult};
pub use ports::IssueTracker;
