//! Common utilities for integration tests

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use tower::ServiceExt;
use update_server::api::create_router;
use update_server::config::{BranchConfig, Config};
use update_server::core::{Architecture, Branch, Runtime};
use update_server::db::{self, ReleaseStore};
use update_server::di::mocks::{MockArtifactHasher, MockAzureProvider, MockGitHubProvider};
use update_server::di::ServiceContainer;
use update_server::release::{ReleaseCoordinator, SourceKind};

pub const API_KEY: &str = "integration-key";

pub const DEVELOP_FILES: [&str; 4] = [
    "/Lidarr.develop.2.1.0.windows.zip",
    "/Lidarr.develop.2.1.0.windows.exe",
    "/Lidarr.develop.2.1.0.linux.tar.gz",
    "/Lidarr.develop.2.1.0.osx.tar.gz",
];

pub async fn memory_store() -> ReleaseStore {
    let pool = db::create_pool("sqlite::memory:").await.unwrap();
    db::migrate(&pool).await.unwrap();
    ReleaseStore::new(pool)
}

pub fn started(day: u32) -> Option<DateTime<Utc>> {
    Some(Utc.with_ymd_and_hms(2024, 5, day, 9, 0, 0).unwrap())
}

/// Service wired to mock upstreams, serving develop from Azure
pub struct TestServer {
    pub container: ServiceContainer,
    pub coordinator: ReleaseCoordinator,
    pub azure: MockAzureProvider,
    pub app: Router,
}

impl TestServer {
    pub async fn new(azure: MockAzureProvider) -> Self {
        Self::with_store(azure, memory_store().await)
    }

    pub fn with_store(azure: MockAzureProvider, store: ReleaseStore) -> Self {
        let mut develop = BranchConfig::new(Branch::Develop, SourceKind::Azure);
        develop.linux_runtime = Runtime::NetCore;
        develop.linux_arch = Architecture::X64;

        let config = Config {
            api_key: API_KEY.to_string(),
            data_directory: Some("/tmp/update-server-integration".to_string()),
            branches: vec![develop],
            ..Config::default()
        };

        let container = ServiceContainer::with_providers(
            config,
            store,
            Arc::new(azure.clone()),
            Arc::new(MockGitHubProvider::new()),
            Arc::new(MockArtifactHasher::new()),
        );
        let coordinator = container.coordinator().unwrap();
        let app = create_router(container.app_state(coordinator.clone()));

        Self {
            container,
            coordinator,
            azure,
            app,
        }
    }

    /// Server whose develop branch already holds build 2.1.0
    pub async fn with_develop_release() -> Self {
        let azure = MockAzureProvider::new();
        azure.add_build(
            MockAzureProvider::build(12, "2.1.0", started(1)),
            &["New: Artist overview", "Fixed: Crash on import"],
            &DEVELOP_FILES,
        );

        let server = Self::new(azure).await;
        assert!(server.coordinator.run_now(Branch::Develop).await.unwrap());
        server
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        self.send("GET", uri).await
    }

    pub async fn send(&self, method: &str, uri: &str) -> (StatusCode, String) {
        let response = self
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }
}
