//! Outbound ports.

use async_trait::async_trait;

use super::errors::JiraResult;
use super::models::{CreateIssueRequest, CreateIssueResult, Issue, SearchResult};

/// Capability interface for the issue tracker behind the gateway.
///
/// The HTTP handlers depend only on this trait, so tests can substitute
/// a double for the real JIRA client. Implementations must not keep
/// per-call state: every method is one independent request/response
/// round trip.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Create an issue
    ///
    /// # Returns
    /// * `Ok(CreateIssueResult)` - key and self URL of the new issue
    /// * `Err(JiraError::Validation)` if project key, summary or issue type is empty
    /// * `Err(JiraError::Api)` on a non-2xx upstream response
    async fn create_issue(&self, request: &CreateIssueRequest) -> JiraResult<CreateIssueResult>;

    /// Search issues with a JQL query
    ///
    /// # Arguments
    /// * `jql` - Query, passed to JIRA unchanged
    /// * `max_results` - Page size
    /// * `fields` - Fields to project; empty means JIRA's default set
    async fn search_issues(
        &self,
        jql: &str,
        max_results: u32,
        fields: &[String],
    ) -> JiraResult<SearchResult>;

    /// Fetch a single issue by key
    ///
    /// # Arguments
    /// * `issue_key` - Issue key such as `PROJ-123`
    /// * `fields` - Fields to project; empty means all fields
    async fn get_issue(&self, issue_key: &str, fields: &[String]) -> JiraResult<Issue>;

    /// List issues linked to an epic
    ///
    /// Not a distinct JIRA operation: implementations compose an
    /// Epic Link JQL query and delegate to a search.
    async fn get_epic_issues(
        &self,
        epic_key: &str,
        max_results: u32,
        fields: &[String],
    ) -> JiraResult<SearchResult>;
}
