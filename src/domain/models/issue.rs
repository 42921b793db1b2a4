//! Issue-level request and response types.
//!
//! Inbound types use the gateway's snake_case wire names. Types passed
//! through from JIRA keep JIRA's camelCase shape so callers see the
//! upstream document unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default number of results requested from a JIRA search.
pub const DEFAULT_MAX_RESULTS: u32 = 50;

/// Request to create a new JIRA issue.
///
/// Required fields decode to empty strings when absent so that the
/// client's validation reports them, rather than the JSON decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIssueRequest {
    /// Project key, e.g. `PROJ`. Required.
    #[serde(default)]
    pub project_key: String,
    /// Issue title. Required.
    #[serde(default)]
    pub summary: String,
    /// Issue type name, e.g. `Task`. Required.
    #[serde(default)]
    pub issue_type: String,
    /// Plain-text description, sent as a single ADF paragraph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Accepted for compatibility; never forwarded to JIRA.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_email: Option<String>,
    /// Parent issue key. Set for sub-tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_key: Option<String>,
}

impl CreateIssueRequest {
    /// Description text, if present and non-empty.
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }

    /// Parent key, if present and non-empty.
    pub fn parent(&self) -> Option<&str> {
        self.parent_key.as_deref().filter(|k| !k.is_empty())
    }
}

/// Response from JIRA's create-issue endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIssueResult {
    /// Numeric issue id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Issue key assigned by JIRA.
    pub key: String,
    /// REST URL of the new issue.
    #[serde(rename = "self")]
    pub self_url: String,
}

/// A JIRA issue.
///
/// `fields` is left untyped: the available fields depend on the JIRA
/// instance and on the projection the caller asked for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Expandable sections JIRA offers for this issue.
    #[serde(default)]
    pub expand: String,
    /// Numeric issue id.
    #[serde(default)]
    pub id: String,
    /// Issue key.
    pub key: String,
    /// REST URL of the issue.
    #[serde(rename = "self", default)]
    pub self_url: String,
    /// Field values keyed by field id.
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// Result page of a JQL search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Expandable sections of the result.
    #[serde(default)]
    pub expand: String,
    /// Offset of the first returned issue.
    #[serde(default)]
    pub start_at: u32,
    /// Page size JIRA applied.
    #[serde(default)]
    pub max_results: u32,
    /// Total matches across all pages.
    #[serde(default)]
    pub total: u32,
    /// Issues on this page.
    #[serde(default)]
    pub issues: Vec<Issue>,
}

/// Inbound search request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchRequest {
    /// JQL query. Required.
    #[serde(default)]
    pub jql: String,
    /// Requested page size; non-positive values mean the default.
    #[serde(default, alias = "maxResults")]
    pub max_results: Option<i64>,
    /// Fields to return. `None` means JIRA's default set.
    #[serde(default)]
    pub fields: Option<Vec<String>>,
}

impl SearchRequest {
    /// Requested page size, falling back to [`DEFAULT_MAX_RESULTS`] when
    /// absent or not positive.
    pub fn effective_max_results(&self) -> u32 {
        normalize_max_results(self.max_results)
    }
}

/// Clamp a caller-supplied page size into the range JIRA accepts.
pub fn normalize_max_results(requested: Option<i64>) -> u32 {
    match requested {
        Some(n) if n > 0 => u32::try_from(n).unwrap_or(u32::MAX),
        _ => DEFAULT_MAX_RESULTS,
    }
}

/// Build the JQL selecting every issue linked to `epic_key` through the
/// custom field `epic_link_field`.
///
/// Both sides are single-quoted; custom field ids must be quoted in JQL.
pub fn epic_link_jql(epic_link_field: &str, epic_key: &str) -> String {
    format!("'{epic_link_field}' = '{epic_key}'")
}
