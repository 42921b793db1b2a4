//! JIRA REST API v3 request payloads.
//!
//! These structs map to the JSON bodies the client sends. They are
//! internal to the client and not part of the domain model.

use serde::Serialize;

use crate::domain::models::CreateIssueRequest;

/// Body of `POST /rest/api/3/issue`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateIssuePayload {
    /// Issue field values.
    pub fields: IssueFields,
}

/// The `fields` object of a create-issue payload.
#[derive(Debug, Clone, Serialize)]
pub struct IssueFields {
    /// Target project.
    pub project: KeyRef,
    /// One-line title.
    pub summary: String,
    /// Issue type by name.
    pub issuetype: NameRef,
    /// Rich-text body. Omitted when the request had no description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<AdfDocument>,
    /// Parent issue, for sub-tasks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<KeyRef>,
}

/// Reference to a JIRA entity by key (`{"key": "PROJ"}`).
#[derive(Debug, Clone, Serialize)]
pub struct KeyRef {
    /// Entity key.
    pub key: String,
}

/// Reference to a JIRA entity by name (`{"name": "Task"}`).
#[derive(Debug, Clone, Serialize)]
pub struct NameRef {
    /// Entity name.
    pub name: String,
}

/// Atlassian Document Format root node.
#[derive(Debug, Clone, Serialize)]
pub struct AdfDocument {
    /// Always `doc`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// ADF schema version.
    pub version: u8,
    /// Top-level block nodes.
    pub content: Vec<AdfNode>,
}

/// A block or inline ADF node.
#[derive(Debug, Clone, Serialize)]
pub struct AdfNode {
    /// Node type, e.g. `paragraph` or `text`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Child nodes of a block node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<AdfNode>>,
    /// Text of a `text` node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl AdfDocument {
    /// Wrap plain text as a document with a single paragraph holding a
    /// single text node.
    pub fn from_plain_text(text: &str) -> Self {
        let text_node = AdfNode {
            kind: "text",
            content: None,
            text: Some(text.to_string()),
        };
        let paragraph = AdfNode {
            kind: "paragraph",
            content: Some(vec![text_node]),
            text: None,
        };
        Self {
            kind: "doc",
            version: 1,
            content: vec![paragraph],
        }
    }
}

impl From<&CreateIssueRequest> for CreateIssuePayload {
    // Assignee is not forwarded: JIRA Cloud only assigns by account id.
    fn from(req: &CreateIssueRequest) -> Self {
        Self {
            fields: IssueFields {
                project: KeyRef {
                    key: req.project_key.clone(),
                },
                summary: req.summary.clone(),
                issuetype: NameRef {
                    name: req.issue_type.clone(),
                },
                description: req.description_text().map(AdfDocument::from_plain_text),
                parent: req.parent().map(|key| KeyRef {
                    key: key.to_string(),
                }),
            },
        }
    }
}

/// Body of `POST /rest/api/3/search`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchPayload<'a> {
    /// JQL query.
    pub jql: &'a str,
    /// Page size.
    #[serde(rename = "maxResults")]
    pub max_results: u32,
    /// Omitted when empty so JIRA applies its default field set.
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub fields: &'a [String],
}
