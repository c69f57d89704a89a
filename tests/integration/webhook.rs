//! GET|POST /v1/webhook/refresh

use crate::common::{started, TestServer, API_KEY, DEVELOP_FILES};
use axum::http::StatusCode;
use std::time::Duration;
use update_server::core::Branch;
use update_server::di::mocks::MockAzureProvider;
use update_server::release::{IngestOutcome, SourceKind};

async fn develop_server() -> TestServer {
    let azure = MockAzureProvider::new();
    azure.add_build(
        MockAzureProvider::build(12, "2.1.0", started(1)),
        &["New: Artist overview"],
        &DEVELOP_FILES,
    );
    TestServer::new(azure).await
}

#[tokio::test]
async fn test_missing_or_wrong_key_is_refused() {
    let server = develop_server().await;

    for uri in [
        "/v1/webhook/refresh?source=azure".to_string(),
        "/v1/webhook/refresh?source=azure&api_key=".to_string(),
        "/v1/webhook/refresh?source=azure&api_key=guess".to_string(),
        format!("/v1/webhook/refresh?source=azure&api_key={}x", API_KEY),
    ] {
        let (status, body) = server.get(&uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "No, thank you.", "{}", uri);
    }

    assert_eq!(server.azure.list_calls(), 0);
}

#[tokio::test]
async fn test_unknown_source_is_named_back() {
    let server = develop_server().await;

    let (status, body) = server
        .get(&format!("/v1/webhook/refresh?source=gitlab&api_key={}", API_KEY))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Unknown source gitlab");

    let (_, body) = server
        .get(&format!("/v1/webhook/refresh?api_key={}", API_KEY))
        .await;
    assert_eq!(body, "Unknown source ");
}

#[tokio::test]
async fn test_refresh_ingests_in_background() {
    let server = develop_server().await;
    let mut events = server.coordinator.subscribe();

    let (status, body) = server
        .send(
            "POST",
            &format!("/v1/webhook/refresh?source=Azure&api_key={}", API_KEY),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Thank you.");

    let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.branch, Branch::Develop);
    assert_eq!(event.source, SourceKind::Azure);
    assert_eq!(
        event.outcome,
        IngestOutcome::Completed {
            has_new_release: true,
            cursor: Some(12)
        }
    );

    let (_, body) = server.get("/v1/update/develop?version=2.0.0").await;
    assert!(body.contains(r#""version":"2.1.0""#));
}

#[tokio::test]
async fn test_refresh_for_source_without_branches_is_accepted() {
    let server = develop_server().await;

    let (status, body) = server
        .get(&format!("/v1/webhook/refresh?source=github&api_key={}", API_KEY))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Thank you.");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(server.azure.list_calls(), 0);
    assert!(server
        .container
        .store
        .list_releases(Branch::Develop)
        .await
        .unwrap()
        .is_empty());
}
