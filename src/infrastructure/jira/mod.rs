//! JIRA Cloud adapter.
//!
//! `JiraClient` implements the `IssueTracker` port against the
//! JIRA REST API v3.

pub mod client;
pub mod types;

pub use client::{JiraClient, JiraClientConfig};
