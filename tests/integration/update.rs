//! GET /v1/update/:branch

use crate::common::TestServer;
use axum::http::StatusCode;
use update_server::core::{Branch, Runtime};
use update_server::di::mocks::MockArtifactHasher;
use update_server::update::{ErrorResponse, UpdatePackageContainer};

fn container(body: &str) -> UpdatePackageContainer {
    serde_json::from_str(body).unwrap()
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body).unwrap().error_message
}

#[tokio::test]
async fn test_windows_client_is_offered_new_build() {
    let server = TestServer::with_develop_release().await;

    let (status, body) = server
        .get("/v1/update/develop?version=2.0.0.0&os=windows&runtime=dotnet&arch=x64")
        .await;
    assert_eq!(status, StatusCode::OK);

    let result = container(&body);
    assert!(result.available);
    let package = result.update_package.unwrap();
    assert_eq!(package.version, "2.1.0");
    assert_eq!(package.branch, Branch::Develop);
    assert_eq!(package.filename, "Lidarr.develop.2.1.0.windows.zip");
    assert_eq!(
        package.url,
        "https://azure.test/12/Packages/blob-12-0/Lidarr.develop.2.1.0.windows.zip"
    );
    assert_eq!(package.hash, Some(MockArtifactHasher::hash_for(&package.url)));
    assert_eq!(package.runtime, Some(Runtime::DotNet));

    let changes = package.changes.unwrap();
    assert_eq!(changes.new, vec!["Artist overview"]);
    assert_eq!(changes.fixed, vec!["Crash on import"]);
}

#[tokio::test]
async fn test_wire_format_is_camel_case() {
    let server = TestServer::with_develop_release().await;

    let (_, body) = server.get("/v1/update/develop?version=2.0.0").await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();

    let package = &json["updatePackage"];
    assert_eq!(json["available"], true);
    assert_eq!(package["releaseDate"], "2024-05-01T09:00:00Z");
    assert_eq!(package["runtime"], "dotnet");
    assert!(package.get("status").is_none());
}

#[tokio::test]
async fn test_mono_client_gets_managed_build() {
    let server = TestServer::with_develop_release().await;

    let (_, body) = server
        .get("/v1/update/develop?version=2.0.0&os=osx&runtime=mono&arch=arm64")
        .await;

    let package = container(&body).update_package.unwrap();
    assert_eq!(package.filename, "Lidarr.develop.2.1.0.osx.tar.gz");
    assert_eq!(package.runtime, Some(Runtime::DotNet));
}

#[tokio::test]
async fn test_linux_client_matches_native_target() {
    let server = TestServer::with_develop_release().await;

    let (_, body) = server
        .get("/v1/update/develop?version=2.0.0&os=linux&runtime=netcore&arch=x64")
        .await;
    let package = container(&body).update_package.unwrap();
    assert_eq!(package.filename, "Lidarr.develop.2.1.0.linux.tar.gz");
    assert_eq!(package.runtime, Some(Runtime::NetCore));

    let (status, body) = server
        .get("/v1/update/develop?version=2.0.0&os=linux&runtime=netcore&arch=arm64")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(error_message(&body), "Latest update not found.");
}

#[tokio::test]
async fn test_current_client_is_up_to_date() {
    let server = TestServer::with_develop_release().await;

    for version in ["2.1.0", "2.1.0.0", "3.0"] {
        let (status, body) = server
            .get(&format!("/v1/update/develop?version={}", version))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(container(&body), UpdatePackageContainer::up_to_date(), "{}", version);
        assert_eq!(body, r#"{"available":false}"#);
    }
}

#[tokio::test]
async fn test_invalid_version_is_rejected() {
    let server = TestServer::with_develop_release().await;

    for uri in [
        "/v1/update/develop",
        "/v1/update/develop?version=",
        "/v1/update/develop?version=banana",
        "/v1/update/develop?version=2",
        "/v1/update/nightly-ish?version=banana",
    ] {
        let (status, body) = server.get(uri).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(error_message(&body), "Invalid version number specified.", "{}", uri);
    }
}

#[tokio::test]
async fn test_unknown_or_empty_branch_has_no_update() {
    let server = TestServer::with_develop_release().await;

    for uri in [
        "/v1/update/master?version=1.0.0",
        "/v1/update/nightly?version=1.0.0",
        "/v1/update/feature-x?version=1.0.0",
    ] {
        let (status, body) = server.get(uri).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(error_message(&body), "Latest update not found.", "{}", uri);
    }
}

#[tokio::test]
async fn test_unrecognized_platform_params_fall_back_to_defaults() {
    let server = TestServer::with_develop_release().await;

    let (_, body) = server
        .get("/v1/update/develop?version=2.0.0&os=beos&runtime=java&arch=sparc")
        .await;
    let package = container(&body).update_package.unwrap();
    assert_eq!(package.filename, "Lidarr.develop.2.1.0.windows.zip");
}

#[tokio::test]
async fn test_develop_scenario_end_to_end() {
    use crate::common::started;
    use update_server::core::OperatingSystem;
    use update_server::di::mocks::MockAzureProvider;

    let azure = MockAzureProvider::new();
    azure.add_build(
        MockAzureProvider::build(40, "2.1.0", started(3)),
        &[],
        &["Lidarr.develop.windows.zip", "Lidarr.develop.linux.tar.gz"],
    );
    let server = TestServer::new(azure).await;
    server.coordinator.run_now(Branch::Develop).await.unwrap();

    let store = &server.container.store;
    let releases = store.list_releases(Branch::Develop).await.unwrap();
    assert_eq!(releases.len(), 1);
    let artifacts = store.artifacts_for_release(releases[0].id).await.unwrap();
    let platforms: Vec<String> = artifacts.iter().map(|a| a.platform.to_string()).collect();
    assert_eq!(platforms, vec!["linux-netcore-x64", "windows-dotnet-x64"]);
    assert!(artifacts.iter().any(|a| a.platform.os == OperatingSystem::Windows));

    let (_, body) = server.get("/v1/update/develop?version=2.0.0").await;
    assert_eq!(container(&body).update_package.unwrap().version, "2.1.0");

    let (_, body) = server.get("/v1/update/develop?version=2.1.0").await;
    assert!(!container(&body).available);
}

#[tokio::test]
async fn test_invalid_version_answered_without_the_store() {
    use update_server::db::{self, ReleaseStore};
    use update_server::di::mocks::MockAzureProvider;

    // No migrations: every store query fails
    let pool = db::create_pool("sqlite::memory:").await.unwrap();
    let server = TestServer::with_store(MockAzureProvider::new(), ReleaseStore::new(pool));

    let (status, body) = server.get("/v1/update/develop?version=2.0.0").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["code"], "DATABASE_ERROR");

    for version in ["", "banana", "2", "2.0.0-beta"] {
        let (status, body) = server
            .get(&format!("/v1/update/develop?version={}", version))
            .await;
        assert_eq!(status, StatusCode::OK, "{}", version);
        assert_eq!(error_message(&body), "Invalid version number specified.", "{}", version);
    }
}
