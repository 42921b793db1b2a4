//! JIRA Cloud REST API v3 client.
//!
//! Translates the four `IssueTracker` operations into authenticated HTTP
//! calls and normalizes both success and failure shapes. Every call is a
//! single request/response round trip: no retries, no caching.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::domain::errors::{JiraError, JiraResult};
use crate::domain::models::{
    epic_link_jql, CreateIssueRequest, CreateIssueResult, Issue, JiraConfig, SearchResult,
};
use crate::domain::ports::IssueTracker;

use super::types::{CreateIssuePayload, SearchPayload};

/// Connection settings for [`JiraClient`].
#[derive(Clone)]
pub struct JiraClientConfig {
    /// Base URL of the JIRA instance
    pub base_url: String,
    /// Account email for Basic authentication
    pub user_email: String,
    /// API token for Basic authentication
    pub api_token: String,
    /// Custom field id of the Epic Link
    pub epic_link_field: String,
    /// Request timeout applied by the default transport
    pub timeout_secs: u64,
}

impl From<&JiraConfig> for JiraClientConfig {
    fn from(config: &JiraConfig) -> Self {
        Self {
            base_url: config.url.clone(),
            user_email: config.user_email.clone(),
            api_token: config.api_token.clone(),
            epic_link_field: config.epic_link_field.clone(),
            timeout_secs: config.timeout_secs,
        }
    }
}

impl fmt::Debug for JiraClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraClientConfig")
            .field("base_url", &self.base_url)
            .field("user_email", &self.user_email)
            .field("api_token", &"[REDACTED]")
            .field("epic_link_field", &self.epic_link_field)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// HTTP client for the JIRA Cloud REST API.
///
/// Holds only immutable configuration and a pooled `reqwest::Client`,
/// so one instance can be shared by every request handler.
#[derive(Clone)]
pub struct JiraClient {
    http: Client,
    base_url: String,
    user_email: String,
    api_token: String,
    epic_link_field: String,
}

impl JiraClient {
    /// Create a client with the default transport.
    ///
    /// Fails with [`JiraError::Config`] when the base URL, email or token
    /// is empty. No network call is made.
    pub fn new(config: JiraClientConfig) -> JiraResult<Self> {
        Self::check_config(&config)?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| JiraError::Config(format!("failed to build HTTP client: {e}")))?;
        Self::with_http_client(config, http)
    }

    /// Create a client on top of a caller-supplied transport.
    pub fn with_http_client(config: JiraClientConfig, http: Client) -> JiraResult<Self> {
        Self::check_config(&config)?;
        Ok(Self {
            http,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            user_email: config.user_email,
            api_token: config.api_token,
            epic_link_field: config.epic_link_field,
        })
    }

    fn check_config(config: &JiraClientConfig) -> JiraResult<()> {
        let missing: Vec<&str> = [
            ("JIRA_URL", &config.base_url),
            ("JIRA_USER_EMAIL", &config.user_email),
            ("JIRA_API_TOKEN", &config.api_token),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(JiraError::Config(format!(
                "missing required JIRA credentials ({})",
                missing.join(", ")
            )))
        }
    }

    /// Base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Custom field id used to compose epic queries.
    pub fn epic_link_field(&self) -> &str {
        &self.epic_link_field
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/rest/api/3/{}", self.base_url, path)
    }

    /// URL of a single issue, with the key appended as one encoded path
    /// segment.
    fn issue_url(&self, issue_key: &str) -> JiraResult<Url> {
        let mut url = Url::parse(&self.endpoint("issue"))
            .map_err(|e| JiraError::Config(format!("invalid JIRA base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| JiraError::Config("JIRA base URL cannot carry a path".to_string()))?
            .push(issue_key);
        Ok(url)
    }

    /// Authenticate, send, and decode a 2xx body into `T`.
    ///
    /// Non-2xx responses become [`JiraError::Api`] carrying the full body
    /// and the request URL.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> JiraResult<T> {
        let request = request
            .header(ACCEPT, "application/json")
            .basic_auth(&self.user_email, Some(&self.api_token))
            .build()
            .map_err(|e| JiraError::Transport(format!("failed to build request: {e}")))?;
        let url = request.url().to_string();

        debug!(method = %request.method(), url = %url, "sending JIRA request");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| JiraError::from(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), url = %url, "JIRA returned an error status");
            return Err(JiraError::Api {
                status: status.as_u16(),
                body,
                url,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| JiraError::from(e.without_url()))?;
        serde_json::from_slice(&bytes).map_err(JiraError::from)
    }
}

impl fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraClient")
            .field("base_url", &self.base_url)
            .field("user_email", &self.user_email)
            .field("epic_link_field", &self.epic_link_field)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    #[instrument(skip(self, request), fields(project = %request.project_key))]
    async fn create_issue(&self, request: &CreateIssueRequest) -> JiraResult<CreateIssueResult> {
        if request.project_key.is_empty()
            || request.summary.is_empty()
            || request.issue_type.is_empty()
        {
            return Err(JiraError::Validation(
                "project_key, summary, and issue_type are required".to_string(),
            ));
        }

        let payload = CreateIssuePayload::from(request);
        let builder = self.http.post(self.endpoint("issue")).json(&payload);
        self.send(builder).await
    }

    #[instrument(skip(self, fields))]
    async fn search_issues(
        &self,
        jql: &str,
        max_results: u32,
        fields: &[String],
    ) -> JiraResult<SearchResult> {
        if jql.is_empty() {
            return Err(JiraError::Validation("JQL query cannot be empty".to_string()));
        }

        let payload = SearchPayload {
            jql,
            max_results,
            fields,
        };
        let builder = self.http.post(self.endpoint("search")).json(&payload);
        self.send(builder).await
    }

    #[instrument(skip(self, fields))]
    async fn get_issue(&self, issue_key: &str, fields: &[String]) -> JiraResult<Issue> {
        if issue_key.is_empty() {
            return Err(JiraError::Validation("issue key cannot be empty".to_string()));
        }
        if !is_plain_issue_key(issue_key) {
            return Err(JiraError::Validation(
                "issue key contains invalid characters".to_string(),
            ));
        }

        let mut builder = self.http.get(self.issue_url(issue_key)?);
        if !fields.is_empty() {
            builder = builder.query(&[("fields", fields.join(","))]);
        }
        self.send(builder).await
    }

    #[instrument(skip(self, fields))]
    async fn get_epic_issues(
        &self,
        epic_key: &str,
        max_results: u32,
        fields: &[String],
    ) -> JiraResult<SearchResult> {
        if epic_key.is_empty() {
            return Err(JiraError::Validation("epic key cannot be empty".to_string()));
        }

        let jql = epic_link_jql(&self.epic_link_field, epic_key);
        self.search_issues(&jql, max_results, fields).await
    }
}

/// An issue key must name exactly one path segment below `/issue`.
fn is_plain_issue_key(key: &str) -> bool {
    key != "." && key != ".." && !key.contains(['/', '\\', '?', '#'])
}
