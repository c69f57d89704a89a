//! GET /v1/update/:branch/changes

use crate::common::{started, TestServer, DEVELOP_FILES};
use axum::http::StatusCode;
use update_server::core::Branch;
use update_server::di::mocks::MockAzureProvider;
use update_server::update::UpdatePackage;

fn packages(body: &str) -> Vec<UpdatePackage> {
    serde_json::from_str(body).unwrap()
}

#[tokio::test]
async fn test_changes_list_newest_first() {
    let azure = MockAzureProvider::new();
    azure.add_build(
        MockAzureProvider::build(11, "2.0.0", started(1)),
        &["Fixed: Slow startup"],
        &["/Lidarr.develop.2.0.0.windows.zip"],
    );
    azure.add_build(
        MockAzureProvider::build(12, "2.1.0", started(2)),
        &["New: Artist overview"],
        &DEVELOP_FILES,
    );
    let server = TestServer::new(azure).await;
    server.coordinator.run_now(Branch::Develop).await.unwrap();

    let (status, body) = server.get("/v1/update/develop/changes?version=1.0.0").await;
    assert_eq!(status, StatusCode::OK);

    let listed = packages(&body);
    let versions: Vec<&str> = listed.iter().map(|p| p.version.as_str()).collect();
    assert_eq!(versions, vec!["2.1.0", "2.0.0"]);
    assert_eq!(listed[0].status.as_deref(), Some("completed"));
    assert!(listed.iter().all(|p| p.runtime.is_none()));
    assert_eq!(listed[1].changes.as_ref().unwrap().fixed, vec!["Slow startup"]);
}

#[tokio::test]
async fn test_changes_filtered_by_os() {
    let azure = MockAzureProvider::new();
    azure.add_build(
        MockAzureProvider::build(11, "2.0.0", started(1)),
        &[],
        &["/Lidarr.develop.2.0.0.windows.zip"],
    );
    azure.add_build(
        MockAzureProvider::build(12, "2.1.0", started(2)),
        &[],
        &DEVELOP_FILES,
    );
    let server = TestServer::new(azure).await;
    server.coordinator.run_now(Branch::Develop).await.unwrap();

    let (_, body) = server.get("/v1/update/develop/changes?os=osx").await;
    let listed = packages(&body);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].filename, "Lidarr.develop.2.1.0.osx.tar.gz");
    assert!(listed[0].changes.is_none());
}

#[tokio::test]
async fn test_changes_for_unknown_branch_is_empty() {
    let server = TestServer::with_develop_release().await;

    for uri in ["/v1/update/master/changes", "/v1/update/feature-x/changes"] {
        let (status, body) = server.get(uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "[]");
    }
}
