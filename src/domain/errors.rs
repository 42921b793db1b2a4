//! Domain errors for the JIRA gateway.

use thiserror::Error;

/// Errors produced while translating a request into a JIRA API call.
///
/// The variants follow the gateway's error taxonomy: local validation,
/// non-2xx upstream responses, transport failures and malformed upstream
/// payloads. Handlers convert every variant into a sanitized outward
/// response; none of them is fatal to the process.
#[derive(Debug, Error)]
pub enum JiraError {
    /// Required input was missing or malformed. Raised before any network call.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// JIRA answered with a non-2xx status.
    #[error("JIRA API error: status {status}, message: {body} (URL: {url})")]
    Api {
        /// HTTP status code returned by JIRA.
        status: u16,
        /// Raw response body, kept for internal logging only.
        body: String,
        /// URL of the request that failed.
        url: String,
    },

    /// JIRA could not be reached, or the exchange was interrupted.
    #[error("Failed to communicate with JIRA: {0}")]
    Transport(String),

    /// A 2xx response body did not match the expected shape.
    #[error("Failed to decode JIRA response: {0}")]
    Decode(String),

    /// Client configuration is incomplete.
    #[error("Missing JIRA configuration: {0}")]
    Config(String),
}

impl JiraError {
    /// Upstream status code, if this error came from a JIRA response.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the error was raised locally, before any network call.
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type for issue tracker operations.
pub type JiraResult<T> = Result<T, JiraError>;

impl From<reqwest::Error> for JiraError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for JiraError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
