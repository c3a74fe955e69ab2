//! Shared test helpers for projects API integration tests
//!
//! Each helper mounts the endpoints a test needs and returns a client
//! pointing at the mock server.

use std::time::Duration;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use projsync_remote::client::ApiClient;

pub const SESSION_KEY: &str = "test-session-key";
pub const ORG_ID: &str = "org-test-001";

/// Starts a mock server and returns it with a client that retries 429
/// quickly.
pub async fn setup_api_mock() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ApiClient::with_base_url(SESSION_KEY, server.uri())
        .with_backoff(3, Duration::from_millis(1));
    (server, client)
}

/// Mounts `GET /organizations` returning an API-only org followed by a
/// chat-capable one.
pub async fn mount_organizations(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/organizations"))
        .and(header("cookie", format!("sessionKey={SESSION_KEY}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "uuid": "org-api-only", "name": "API", "capabilities": ["api"] },
            { "uuid": ORG_ID, "name": "Personal", "capabilities": ["chat", "api"] }
        ])))
        .mount(server)
        .await;
}

/// Path of the documents collection of `project`
pub fn docs_path(project: &str) -> String {
    format!("/organizations/{ORG_ID}/projects/{project}/docs")
}
