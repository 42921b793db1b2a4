//! JIRA gateway HTTP server.
//!
//! Exposes the four issue operations as simplified JSON endpoints and
//! forwards each to the configured [`IssueTracker`]. Handlers never
//! return raw upstream bodies; failures go through [`map_jira_error`].
//!
//! [`map_jira_error`]: super::error::map_jira_error

use axum::{
    body::Bytes,
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{Method, StatusCode, Uri},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::domain::models::{
    normalize_max_results, CreateIssueRequest, Issue, SearchRequest, SearchResult, ServerConfig,
};
use crate::domain::ports::IssueTracker;

use super::error::ApiError;

/// Configuration for the gateway HTTP server.
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl From<&ServerConfig> for HttpServerConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
        }
    }
}

/// Body returned by a successful issue creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIssueResponse {
    /// Fixed confirmation text.
    pub message: String,
    /// Key of the new issue.
    pub key: String,
    /// REST URL of the new issue.
    pub url: String,
}

/// Query parameters for `GET /jira_issue/{issue_key}`.
#[derive(Debug, Default, Deserialize)]
pub struct IssueQueryParams {
    /// Comma-separated field ids.
    #[serde(default)]
    pub fields: Option<String>,
}

/// Query parameters for `GET /jira_epic/{epic_key}/issues`.
///
/// `max_results` is kept as text so an unparseable value falls back to the
/// default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct EpicQueryParams {
    /// Page size, as sent.
    #[serde(default)]
    pub max_results: Option<String>,
    /// Comma-separated field ids.
    #[serde(default)]
    pub fields: Option<String>,
}

impl EpicQueryParams {
    fn max_results(&self) -> u32 {
        normalize_max_results(
            self.max_results
                .as_deref()
                .and_then(|raw| raw.trim().parse::<i64>().ok()),
        )
    }
}

/// Shared state for the gateway HTTP server.
#[derive(Clone)]
pub struct AppState {
    tracker: Arc<dyn IssueTracker>,
}

/// Gateway HTTP server.
pub struct GatewayHttpServer {
    config: HttpServerConfig,
    tracker: Arc<dyn IssueTracker>,
}

impl GatewayHttpServer {
    /// Create a server that forwards to `tracker`.
    pub fn new(tracker: Arc<dyn IssueTracker>, config: HttpServerConfig) -> Self {
        Self { config, tracker }
    }

    /// Build the router.
    pub fn router(&self) -> Router {
        let state = AppState {
            tracker: Arc::clone(&self.tracker),
        };

        Router::new()
            .route(
                "/create_jira_issue",
                post(create_issue).fallback(method_not_allowed),
            )
            .route(
                "/search_jira_issues",
                post(search_issues).fallback(method_not_allowed),
            )
            // Issue details
            .route(
                "/jira_issue/{issue_key}",
                get(get_issue).fallback(method_not_allowed),
            )
            .route(
                "/jira_issue/",
                get(missing_issue_key).fallback(method_not_allowed),
            )
            // Epic members
            .route(
                "/jira_epic/{epic_key}/issues",
                get(get_epic_issues).fallback(method_not_allowed),
            )
            .route(
                "/jira_epic/",
                get(missing_epic_key).fallback(method_not_allowed),
            )
            // Health check
            .route("/health", get(health_check).fallback(method_not_allowed))
            .fallback(not_found)
            .with_state(state)
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
    }

    fn socket_addr(&self) -> Result<SocketAddr, Box<dyn std::error::Error + Send + Sync>> {
        Ok(format!("{}:{}", self.config.host, self.config.port).parse()?)
    }

    /// Start the server.
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = self.socket_addr()?;
        let router = self.router();

        tracing::info!("JIRA gateway listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;
        Ok(())
    }

    /// Start the server with a shutdown signal.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = self.socket_addr()?;
        let router = self.router();

        tracing::info!("JIRA gateway listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        tracing::info!("JIRA gateway stopped");
        Ok(())
    }
}

// Handler functions

async fn health_check() -> &'static str {
    "OK"
}

async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    tracing::warn!(method = %method, path = %uri.path(), "method not allowed");
    ApiError::method_not_allowed()
}

async fn not_found(uri: Uri) -> ApiError {
    tracing::debug!(path = %uri.path(), "no route matched");
    ApiError::not_found()
}

async fn create_issue(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreateIssueResponse>), ApiError> {
    tracing::info!(method = "POST", path = "/create_jira_issue", "request received");

    let req: CreateIssueRequest = decode_body(&body)?;
    let created = state.tracker.create_issue(&req).await?;

    tracing::info!(key = %created.key, "JIRA issue created");
    Ok((
        StatusCode::CREATED,
        Json(CreateIssueResponse {
            message: "JIRA issue created successfully".to_string(),
            key: created.key,
            url: created.self_url,
        }),
    ))
}

async fn search_issues(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SearchResult>, ApiError> {
    tracing::info!(method = "POST", path = "/search_jira_issues", "request received");

    let req: SearchRequest = decode_body(&body)?;
    if req.jql.is_empty() {
        return Err(ApiError::bad_request("Missing required field: jql"));
    }

    let max_results = req.effective_max_results();
    let fields = req.fields.unwrap_or_default();
    let result = state
        .tracker
        .search_issues(&req.jql, max_results, &fields)
        .await?;

    tracing::info!(total = result.total, returned = result.issues.len(), "search completed");
    Ok(Json(result))
}

async fn get_issue(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<IssueQueryParams>, QueryRejection>,
) -> Result<Json<Issue>, ApiError> {
    let issue_key = path_key(path, "Invalid issue key in URL path")?;
    let Query(params) = query_params(query)?;
    tracing::info!(method = "GET", issue_key = %issue_key, "request received");

    if issue_key.is_empty() {
        return Err(missing_issue_key_error());
    }

    let fields = split_fields(params.fields.as_deref());
    let issue = state.tracker.get_issue(&issue_key, &fields).await?;
    Ok(Json(issue))
}

async fn get_epic_issues(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<EpicQueryParams>, QueryRejection>,
) -> Result<Json<SearchResult>, ApiError> {
    let epic_key = path_key(path, "Invalid epic key in URL path")?;
    let Query(params) = query_params(query)?;
    tracing::info!(method = "GET", epic_key = %epic_key, "request received");

    if epic_key.is_empty() {
        return Err(missing_epic_key_error());
    }

    let fields = split_fields(params.fields.as_deref());
    let result = state
        .tracker
        .get_epic_issues(&epic_key, params.max_results(), &fields)
        .await?;

    tracing::info!(epic_key = %epic_key, total = result.total, "epic issues retrieved");
    Ok(Json(result))
}

async fn missing_issue_key() -> ApiError {
    missing_issue_key_error()
}

async fn missing_epic_key() -> ApiError {
    missing_epic_key_error()
}

fn missing_issue_key_error() -> ApiError {
    ApiError::bad_request("Missing issue key in URL path")
}

fn missing_epic_key_error() -> ApiError {
    ApiError::bad_request("Missing epic key in URL path")
}

/// Unwrap a single path parameter, trimmed. Extractor messages are logged
/// and replaced by `message`.
fn path_key(
    path: Result<Path<String>, PathRejection>,
    message: &'static str,
) -> Result<String, ApiError> {
    match path {
        Ok(Path(key)) => Ok(key.trim().to_string()),
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "rejected path parameter");
            Err(ApiError::bad_request(message))
        }
    }
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<Query<T>, ApiError> {
    query.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "rejected query string");
        ApiError::bad_request("Invalid query parameters")
    })
}

/// Decode a JSON body regardless of its declared content type. The decoder
/// message is logged and replaced by a generic one.
fn decode_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(error = %e, "failed to decode request body");
        ApiError::bad_request("Invalid request body")
    })
}

/// Split a comma-separated `fields` parameter, trimming items and
/// dropping empty ones.
fn split_fields(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
