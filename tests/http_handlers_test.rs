/// Integration tests for the gateway HTTP handlers
///
/// Most tests drive the router in-process against a recording double of
/// `IssueTracker`, so each test can assert exactly which calls reached the
/// tracker. The end-to-end tests at the bottom wire the real `JiraClient`
/// to a mockito server.
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use jira_gateway::domain::models::{CreateIssueRequest, CreateIssueResult, Issue, SearchResult};
use jira_gateway::{
    GatewayHttpServer, HttpServerConfig, IssueTracker, JiraClient, JiraClientConfig, JiraError,
    JiraResult,
};
use mockito::{Matcher, Server};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tower::ServiceExt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Create(CreateIssueRequest),
    Search {
        jql: String,
        max_results: u32,
        fields: Vec<String>,
    },
    Get {
        issue_key: String,
        fields: Vec<String>,
    },
    Epic {
        epic_key: String,
        max_results: u32,
        fields: Vec<String>,
    },
}

/// How the double answers every call.
#[derive(Debug, Clone, Copy)]
enum Outcome {
    Success,
    UpstreamStatus(u16),
    Transport,
}

struct RecordingTracker {
    calls: Mutex<Vec<Call>>,
    outcome: Outcome,
}

impl RecordingTracker {
    fn new(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            outcome,
        })
    }

    fn record(&self, call: Call) -> JiraResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.outcome {
            Outcome::Success => Ok(()),
            Outcome::UpstreamStatus(status) => Err(JiraError::Api {
                status,
                body: r#"{"errorMessages":["secret upstream detail"]}"#.to_string(),
                url: "https://jira.example.com/rest/api/3/search".to_string(),
            }),
            Outcome::Transport => Err(JiraError::Transport(
                "error trying to connect: tcp connect error: 10.0.0.7:443".to_string(),
            )),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

fn sample_search_result() -> SearchResult {
    serde_json::from_value(json!({
        "expand": "names",
        "startAt": 0,
        "maxResults": 50,
        "total": 1,
        "issues": [
            { "id": "10001", "key": "PROJ-1", "self": "https://x/issue/10001", "fields": { "summary": "One" } }
        ]
    }))
    .unwrap()
}

#[async_trait]
impl IssueTracker for RecordingTracker {
    async fn create_issue(&self, request: &CreateIssueRequest) -> JiraResult<CreateIssueResult> {
        self.record(Call::Create(request.clone()))?;
        Ok(CreateIssueResult {
            id: Some("10001".to_string()),
            key: "PROJ-123".to_string(),
            self_url: "https://x/issue/123".to_string(),
        })
    }

    async fn search_issues(
        &self,
        jql: &str,
        max_results: u32,
        fields: &[String],
    ) -> JiraResult<SearchResult> {
        self.record(Call::Search {
            jql: jql.to_string(),
            max_results,
            fields: fields.to_vec(),
        })?;
        Ok(sample_search_result())
    }

    async fn get_issue(&self, issue_key: &str, fields: &[String]) -> JiraResult<Issue> {
        self.record(Call::Get {
            issue_key: issue_key.to_string(),
            fields: fields.to_vec(),
        })?;
        Ok(sample_search_result().issues.remove(0))
    }

    async fn get_epic_issues(
        &self,
        epic_key: &str,
        max_results: u32,
        fields: &[String],
    ) -> JiraResult<SearchResult> {
        self.record(Call::Epic {
            epic_key: epic_key.to_string(),
            max_results,
            fields: fields.to_vec(),
        })?;
        Ok(sample_search_result())
    }
}

fn router_with(tracker: Arc<dyn IssueTracker>) -> Router {
    GatewayHttpServer::new(tracker, HttpServerConfig::default()).router()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn send_json(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(router, request).await;
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("response is not JSON ({e}): {:?}", String::from_utf8_lossy(&bytes)));
    (status, value)
}

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_create_issue_returns_created() {
    let tracker = RecordingTracker::new(Outcome::Success);
    let router = router_with(tracker.clone());

    let body = json!({
        "project_key": "PROJ",
        "summary": "S",
        "issue_type": "Task",
        "description": "details",
        "assignee_email": "dev@acme.io"
    });
    let (status, value) = send_json(router, post("/create_jira_issue", body.to_string())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        value,
        json!({
            "message": "JIRA issue created successfully",
            "key": "PROJ-123",
            "url": "https://x/issue/123"
        })
    );

    let calls = tracker.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        Call::Create(req) => {
            assert_eq!(req.project_key, "PROJ");
            assert_eq!(req.description.as_deref(), Some("details"));
        }
        other => panic!("Expected Create call, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_issue_invalid_body() {
    let tracker = RecordingTracker::new(Outcome::Success);
    let router = router_with(tracker.clone());

    let (status, value) = send_json(router, post("/create_jira_issue", "{\"project_key\": ")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value, json!({ "error": "Invalid request body" }));
    assert!(tracker.calls().is_empty());
}

#[tokio::test]
async fn test_body_decoded_regardless_of_content_type() {
    let tracker = RecordingTracker::new(Outcome::Success);
    let router = router_with(tracker.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/search_jira_issues")
        .header("content-type", "text/plain")
        .body(Body::from(r#"{"jql":"project = PROJ"}"#))
        .unwrap();
    let (status, _) = send(router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(tracker.calls().len(), 1);
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_search_normalizes_max_results() {
    for (body, expected) in [
        (json!({ "jql": "project = PROJ" }), 50),
        (json!({ "jql": "project = PROJ", "max_results": 0 }), 50),
        (json!({ "jql": "project = PROJ", "max_results": -5 }), 50),
        (json!({ "jql": "project = PROJ", "max_results": 10 }), 10),
        (json!({ "jql": "project = PROJ", "maxResults": 20 }), 20),
    ] {
        let tracker = RecordingTracker::new(Outcome::Success);
        let router = router_with(tracker.clone());

        let (status, value) = send_json(router, post("/search_jira_issues", body.to_string())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["issues"][0]["key"], "PROJ-1");
        assert_eq!(
            tracker.calls(),
            vec![Call::Search {
                jql: "project = PROJ".to_string(),
                max_results: expected,
                fields: Vec::new(),
            }],
            "body {body}"
        );
    }
}

#[tokio::test]
async fn test_search_passes_fields() {
    let tracker = RecordingTracker::new(Outcome::Success);
    let router = router_with(tracker.clone());

    let body = json!({ "jql": "project = PROJ", "fields": ["summary", "status"] });
    let (status, _) = send(router, post("/search_jira_issues", body.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        tracker.calls(),
        vec![Call::Search {
            jql: "project = PROJ".to_string(),
            max_results: 50,
            fields: vec!["summary".to_string(), "status".to_string()],
        }]
    );
}

#[tokio::test]
async fn test_search_missing_jql() {
    let tracker = RecordingTracker::new(Outcome::Success);
    let router = router_with(tracker.clone());

    let (status, value) = send_json(router, post("/search_jira_issues", r#"{"max_results": 5}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value, json!({ "error": "Missing required field: jql" }));
    assert!(tracker.calls().is_empty());
}

// ---------------------------------------------------------------------------
// Issue details
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_get_issue_splits_fields() {
    let tracker = RecordingTracker::new(Outcome::Success);
    let router = router_with(tracker.clone());

    let (status, value) = send_json(router, get("/jira_issue/PROJ-1?fields=summary,%20status,")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["key"], "PROJ-1");
    assert_eq!(value["self"], "https://x/issue/10001");
    assert_eq!(
        tracker.calls(),
        vec![Call::Get {
            issue_key: "PROJ-1".to_string(),
            fields: vec!["summary".to_string(), "status".to_string()],
        }]
    );
}

#[tokio::test]
async fn test_get_issue_missing_key() {
    for uri in ["/jira_issue/", "/jira_issue/%20%20"] {
        let tracker = RecordingTracker::new(Outcome::Success);
        let router = router_with(tracker.clone());

        let (status, value) = send_json(router, get(uri)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {uri}");
        assert_eq!(value, json!({ "error": "Missing issue key in URL path" }));
        assert!(tracker.calls().is_empty());
    }
}

#[tokio::test]
async fn test_path_keys_are_trimmed_before_forwarding() {
    let tracker = RecordingTracker::new(Outcome::Success);
    let router = router_with(tracker.clone());

    let (status, _) = send(router, get("/jira_issue/%20PROJ-1%20")).await;
    assert_eq!(status, StatusCode::OK);

    let router = router_with(tracker.clone());
    let (status, _) = send(router, get("/jira_epic/%20EPIC-1%20/issues")).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(
        tracker.calls(),
        vec![
            Call::Get {
                issue_key: "PROJ-1".to_string(),
                fields: Vec::new(),
            },
            Call::Epic {
                epic_key: "EPIC-1".to_string(),
                max_results: 50,
                fields: Vec::new(),
            },
        ]
    );
}

#[tokio::test]
async fn test_get_issue_bad_path_and_query_are_json_errors() {
    let cases = [
        ("/jira_issue/%FF", "Invalid issue key in URL path"),
        ("/jira_issue/PROJ-1?fields=a&fields=b", "Invalid query parameters"),
        ("/jira_epic/%FF/issues", "Invalid epic key in URL path"),
        ("/jira_epic/EPIC-1/issues?fields=a&fields=b", "Invalid query parameters"),
    ];

    for (uri, expected) in cases {
        let tracker = RecordingTracker::new(Outcome::Success);
        let router = router_with(tracker.clone());

        let (status, value) = send_json(router, get(uri)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {uri}");
        assert_eq!(value, json!({ "error": expected }), "uri {uri}");
        assert!(tracker.calls().is_empty());
    }
}

// ---------------------------------------------------------------------------
// Epic issues
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_epic_issues_defaults() {
    let tracker = RecordingTracker::new(Outcome::Success);
    let router = router_with(tracker.clone());

    let (status, value) = send_json(router, get("/jira_epic/EPIC-1/issues")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["total"], 1);
    assert_eq!(
        tracker.calls(),
        vec![Call::Epic {
            epic_key: "EPIC-1".to_string(),
            max_results: 50,
            fields: Vec::new(),
        }]
    );
}

#[tokio::test]
async fn test_epic_issues_query_overrides() {
    let tracker = RecordingTracker::new(Outcome::Success);
    let router = router_with(tracker.clone());

    let (status, _) = send(router, get("/jira_epic/EPIC-1/issues?max_results=5&fields=summary")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        tracker.calls(),
        vec![Call::Epic {
            epic_key: "EPIC-1".to_string(),
            max_results: 5,
            fields: vec!["summary".to_string()],
        }]
    );
}

#[tokio::test]
async fn test_epic_issues_missing_key() {
    let tracker = RecordingTracker::new(Outcome::Success);
    let router = router_with(tracker.clone());

    let (status, value) = send_json(router, get("/jira_epic/")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value, json!({ "error": "Missing epic key in URL path" }));
    assert!(tracker.calls().is_empty());
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_upstream_errors_are_sanitized() {
    let cases = [
        (400, StatusCode::BAD_REQUEST, "Invalid request data sent to JIRA."),
        (401, StatusCode::UNAUTHORIZED, "Authentication failed with JIRA."),
        (403, StatusCode::FORBIDDEN, "Permission denied by JIRA."),
        (404, StatusCode::NOT_FOUND, "JIRA resource not found."),
        (
            503,
            StatusCode::INTERNAL_SERVER_ERROR,
            "An unexpected error occurred while communicating with JIRA.",
        ),
    ];

    for (upstream, expected_status, expected_message) in cases {
        let tracker = RecordingTracker::new(Outcome::UpstreamStatus(upstream));
        let router = router_with(tracker);

        let (status, bytes) = send(router, get("/jira_issue/PROJ-1")).await;
        let value: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(status, expected_status, "upstream {upstream}");
        assert_eq!(value, json!({ "error": expected_message }));
        assert!(!String::from_utf8_lossy(&bytes).contains("secret upstream detail"));
    }
}

#[tokio::test]
async fn test_transport_error_is_internal() {
    let tracker = RecordingTracker::new(Outcome::Transport);
    let router = router_with(tracker);

    let (status, bytes) = send(router, post("/search_jira_issues", r#"{"jql":"x = y"}"#)).await;
    let text = String::from_utf8_lossy(&bytes);

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(text, r#"{"error":"An internal server error occurred."}"#);
    assert!(!text.contains("10.0.0.7"));
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_wrong_method_is_rejected() {
    let requests = [
        get("/create_jira_issue"),
        get("/search_jira_issues"),
        post("/jira_issue/PROJ-1", ""),
        post("/jira_epic/EPIC-1/issues", ""),
        Request::builder()
            .method("DELETE")
            .uri("/jira_issue/PROJ-1")
            .body(Body::empty())
            .unwrap(),
    ];

    for request in requests {
        let tracker = RecordingTracker::new(Outcome::Success);
        let router = router_with(tracker.clone());

        let (status, value) = send_json(router, request).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(value, json!({ "error": "Method not allowed" }));
        assert!(tracker.calls().is_empty());
    }
}

#[tokio::test]
async fn test_unknown_route() {
    let router = router_with(RecordingTracker::new(Outcome::Success));

    let (status, value) = send_json(router, get("/jira_projects")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(value, json!({ "error": "Not found" }));
}

#[tokio::test]
async fn test_health_check() {
    let router = router_with(RecordingTracker::new(Outcome::Success));

    let (status, bytes) = send(router, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"OK");
}

// ---------------------------------------------------------------------------
// End-to-end against a mock JIRA
// ---------------------------------------------------------------------------

fn jira_router(server: &mockito::ServerGuard) -> Router {
    let client = JiraClient::new(JiraClientConfig {
        base_url: server.url(),
        user_email: "bot@acme.io".to_string(),
        api_token: "token-123".to_string(),
        epic_link_field: "customfield_10014".to_string(),
        timeout_secs: 5,
    })
    .unwrap();
    router_with(Arc::new(client))
}

#[tokio::test]
async fn test_end_to_end_create_issue() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/api/3/issue")
        .match_body(Matcher::Json(json!({
            "fields": {
                "project": { "key": "PROJ" },
                "summary": "S",
                "issuetype": { "name": "Task" }
            }
        })))
        .with_status(201)
        .with_body(r#"{"key":"PROJ-123","self":"https://x/issue/123"}"#)
        .create_async()
        .await;

    let router = jira_router(&server);
    let body = r#"{"project_key":"PROJ","summary":"S","issue_type":"Task"}"#;
    let (status, value) = send_json(router, post("/create_jira_issue", body)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        value,
        json!({
            "message": "JIRA issue created successfully",
            "key": "PROJ-123",
            "url": "https://x/issue/123"
        })
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_end_to_end_validation_failure() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/api/3/issue")
        .expect(0)
        .create_async()
        .await;

    let router = jira_router(&server);
    let (status, value) = send_json(router, post("/create_jira_issue", r#"{"summary":"S"}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        value,
        json!({ "error": "project_key, summary, and issue_type are required" })
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_end_to_end_missing_issue_key() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let router = jira_router(&server);
    let (status, value) = send_json(router, get("/jira_issue/")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value, json!({ "error": "Missing issue key in URL path" }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_end_to_end_not_found_hides_body() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/rest/api/3/issue/PROJ-404")
        .with_status(404)
        .with_body(r#"{"errorMessages":["Issue does not exist or you do not have permission to see it."]}"#)
        .create_async()
        .await;

    let router = jira_router(&server);
    let (status, bytes) = send(router, get("/jira_issue/PROJ-404")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(bytes, br#"{"error":"JIRA resource not found."}"#);
}

#[tokio::test]
async fn test_end_to_end_epic_issues() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/api/3/search")
        .match_body(Matcher::Json(json!({
            "jql": "'customfield_10014' = 'EPIC-1'",
            "maxResults": 50
        })))
        .with_status(200)
        .with_body(r#"{"startAt":0,"maxResults":50,"total":0,"issues":[]}"#)
        .create_async()
        .await;

    let router = jira_router(&server);
    let (status, value) = send_json(router, get("/jira_epic/EPIC-1/issues")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["total"], 0);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_end_to_end_issue_key_cannot_escape_issue_path() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .with_status(200)
        .with_body(r#"{"key":"LEAK","self":"s","fields":{"emailAddress":"bot@acme.io"}}"#)
        .expect(0)
        .create_async()
        .await;

    for uri in [
        "/jira_issue/..%2Fmyself",
        "/jira_issue/..%2F..%2F2%2Fmyself",
        "/jira_issue/PROJ-1%3Fexpand%3Dchangelog",
        "/jira_issue/..",
    ] {
        let router = jira_router(&server);
        let (status, bytes) = send(router, get(uri)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {uri}");
        assert!(!String::from_utf8_lossy(&bytes).contains("LEAK"), "uri {uri}");
    }
    mock.assert_async().await;
}

/// Upstream that accepts one connection, reads the request head and then
/// never answers. The returned receiver fires once the gateway closes the
/// connection.
async fn silent_upstream() -> (String, tokio::sync::oneshot::Receiver<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (closed_tx, closed_rx) = tokio::sync::oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        loop {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
        }
        let _ = closed_tx.send(());
    });

    (format!("http://{addr}"), closed_rx)
}

#[tokio::test]
async fn test_dropped_request_cancels_upstream_call() {
    let (base_url, closed) = silent_upstream().await;
    let client = JiraClient::new(JiraClientConfig {
        base_url,
        user_email: "bot@acme.io".to_string(),
        api_token: "token-123".to_string(),
        epic_link_field: "customfield_10014".to_string(),
        timeout_secs: 60,
    })
    .unwrap();
    let router = router_with(Arc::new(client));

    // The inbound caller gives up long before the client timeout.
    let outcome = tokio::time::timeout(
        Duration::from_millis(300),
        router.oneshot(get("/jira_issue/PROJ-1")),
    )
    .await;
    assert!(outcome.is_err(), "upstream never answers, so the call must still be pending");

    tokio::time::timeout(Duration::from_secs(5), closed)
        .await
        .expect("upstream connection should close once the request is dropped")
        .unwrap();
}
