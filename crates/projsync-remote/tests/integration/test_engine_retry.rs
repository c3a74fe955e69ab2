//! SyncEngine driving the provider against the mock API
//!
//! Verifies that each failure is retried by exactly one layer: 429 by the
//! client, other retryable failures by the engine, and that uploads are
//! never repeated after a failure the service may have applied.

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use projsync_core::domain::file::LocalFile;
use projsync_core::domain::newtypes::{ProjectId, RelativePath};
use projsync_core::domain::remote::RemoteProjectHandle;
use projsync_core::domain::report::FailureKind;
use projsync_remote::provider::ClaudeProjectsProvider;
use projsync_sync::{RetryPolicy, SyncEngine, SyncOptions};

use crate::common::{docs_path, setup_api_mock, ORG_ID};

const PROJECT: &str = "proj-1";

fn engine(client: projsync_remote::client::ApiClient) -> SyncEngine {
    let options = SyncOptions {
        retry: RetryPolicy {
            max_retries: 3,
            base_delay: Duration::ZERO,
        },
        ..SyncOptions::default()
    };
    SyncEngine::new(Arc::new(ClaudeProjectsProvider::new(client, ORG_ID)), options)
}

fn handle() -> RemoteProjectHandle {
    RemoteProjectHandle::new(ProjectId::new(PROJECT.to_string()).unwrap(), "demo")
}

fn file(p: &str) -> LocalFile {
    LocalFile::new(RelativePath::new(p.to_string()).unwrap(), b"x".to_vec())
}

async fn mount_empty_listing(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(docs_path(PROJECT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(server)
        .await;
}

async fn mount_upload_status(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path(docs_path(PROJECT)))
        .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
        .mount(server)
        .await;
}

async fn post_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == "POST")
        .count()
}

#[tokio::test]
async fn test_forbidden_upload_sent_once_even_for_network_named_file() {
    let (server, client) = setup_api_mock().await;
    mount_empty_listing(&server).await;
    mount_upload_status(&server, 403).await;

    let report = engine(client)
        .update_project(&handle(), &[file("src/network.rs")])
        .await
        .unwrap();

    assert_eq!(post_count(&server).await, 1);
    let failure = report.failures_of(FailureKind::Upload).next().unwrap();
    assert_eq!(failure.target, "src/network.rs");
    assert!(failure.reason.contains("403"));
}

#[tokio::test]
async fn test_throttled_upload_bounded_by_client_retries() {
    let (server, client) = setup_api_mock().await;
    mount_empty_listing(&server).await;
    mount_upload_status(&server, 429).await;

    let report = engine(client)
        .update_project(&handle(), &[file("a.txt")])
        .await
        .unwrap();

    // One request plus three client retries; the engine does not add more.
    assert_eq!(post_count(&server).await, 4);
    assert_eq!(report.failures_of(FailureKind::Upload).count(), 1);
}

#[tokio::test]
async fn test_unavailable_upload_retried_by_engine() {
    let (server, client) = setup_api_mock().await;
    mount_empty_listing(&server).await;
    Mock::given(method("POST"))
        .and(path(docs_path(PROJECT)))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(docs_path(PROJECT)))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "uuid": "doc-new",
            "file_name": "a.txt",
            "content": "x"
        })))
        .mount(&server)
        .await;

    let report = engine(client)
        .update_project(&handle(), &[file("a.txt")])
        .await
        .unwrap();

    assert_eq!(post_count(&server).await, 2);
    assert!(!report.has_failures());
    assert_eq!(report.files_uploaded(), 1);
}

#[tokio::test]
async fn test_gateway_timeout_upload_not_repeated() {
    let (server, client) = setup_api_mock().await;
    mount_empty_listing(&server).await;
    mount_upload_status(&server, 504).await;

    let report = engine(client)
        .update_project(&handle(), &[file("a.txt")])
        .await
        .unwrap();

    assert_eq!(post_count(&server).await, 1);
    assert_eq!(report.failures_of(FailureKind::Upload).count(), 1);
}

#[tokio::test]
async fn test_gateway_timeout_listing_is_repeated() {
    let (server, client) = setup_api_mock().await;
    Mock::given(method("GET"))
        .and(path(docs_path(PROJECT)))
        .respond_with(ResponseTemplate::new(504))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_empty_listing(&server).await;

    let report = engine(client).update_project(&handle(), &[]).await.unwrap();

    let gets = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == "GET")
        .count();
    assert_eq!(gets, 2);
    assert!(!report.has_failures());
}
