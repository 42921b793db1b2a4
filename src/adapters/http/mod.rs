//! HTTP surface of the gateway.

pub mod error;
pub mod issues_http;

pub use error::{map_jira_error, ApiError, ErrorResponse};
pub use issues_http::{AppState, CreateIssueResponse, GatewayHttpServer, HttpServerConfig};
