//! Service container for dependency injection

use super::traits::{ArtifactHasher, AzureProvider, GitHubProvider, ReleaseSource};
use crate::api::{AppState, SharedState};
use crate::azure::AzureClient;
use crate::config::Config;
use crate::core::path::ensure_dir;
use crate::core::UpdateResult;
use crate::db::{self, ReleaseStore};
use crate::github::GitHubClient;
use crate::release::{
    AzureReleaseSource, BuildIngestor, GitHubReleaseSource, HashVerifier, ReleaseCoordinator,
    SourceKind,
};
use crate::update::VersionResolver;
use std::sync::Arc;

/// Service container for dependency injection
///
/// Holds the store and the upstream-facing services as trait objects so
/// tests can swap any of them for the mocks in [`super::mocks`].
///
/// # Example (Testing)
///
/// ```ignore
/// use update_server::di::{ServiceContainer, mocks::*};
/// use std::sync::Arc;
///
/// # async fn example(config: update_server::config::Config, store: update_server::db::ReleaseStore) {
/// let container = ServiceContainer::with_providers(
///     config,
///     store,
///     Arc::new(MockAzureProvider::new()),
///     Arc::new(MockGitHubProvider::new()),
///     Arc::new(MockArtifactHasher::new()),
/// );
/// let coordinator = container.coordinator().unwrap();
/// # }
/// ```
#[derive(Clone)]
pub struct ServiceContainer {
    pub config: Config,
    pub store: ReleaseStore,
    pub azure: Arc<dyn AzureProvider>,
    pub github: Arc<dyn GitHubProvider>,
    pub hasher: Arc<dyn ArtifactHasher>,
}

impl ServiceContainer {
    /// Create a service container with production implementations
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The data directory cannot be created
    /// - The database cannot be opened or migrated
    /// - An HTTP client cannot be built
    pub async fn new(config: Config) -> UpdateResult<Self> {
        ensure_dir(&config.get_data_dir()?)?;

        let pool = db::create_pool(&config.get_database_url()?).await?;
        db::migrate(&pool).await?;
        tracing::debug!("Database ready");

        Ok(Self {
            azure: Arc::new(AzureClient::new(&config.azure)?),
            github: Arc::new(GitHubClient::new(&config.github)?),
            hasher: Arc::new(HashVerifier::new()?),
            store: ReleaseStore::new(pool),
            config,
        })
    }

    /// Create a service container with custom provider implementations
    ///
    /// This is primarily useful for testing, where you can inject mock
    /// implementations of each service.
    pub fn with_providers(
        config: Config,
        store: ReleaseStore,
        azure: Arc<dyn AzureProvider>,
        github: Arc<dyn GitHubProvider>,
        hasher: Arc<dyn ArtifactHasher>,
    ) -> Self {
        Self {
            config,
            store,
            azure,
            github,
            hasher,
        }
    }

    /// One release source per configured branch
    pub fn build_sources(&self) -> UpdateResult<Vec<Arc<dyn ReleaseSource>>> {
        let data_dir = self.config.get_data_dir()?;

        Ok(self
            .config
            .branches
            .iter()
            .map(|entry| {
                let ingestor = BuildIngestor::new(
                    self.store.clone(),
                    self.hasher.clone(),
                    data_dir.clone(),
                    entry.linux_target(),
                );
                let source: Arc<dyn ReleaseSource> = match entry.source {
                    SourceKind::Azure => Arc::new(AzureReleaseSource::new(
                        entry.branch,
                        self.azure.clone(),
                        ingestor,
                        &self.config.azure,
                    )),
                    SourceKind::GitHub => Arc::new(GitHubReleaseSource::new(
                        entry.branch,
                        self.github.clone(),
                        ingestor,
                        &self.config.github,
                        entry.prerelease,
                    )),
                };
                source
            })
            .collect())
    }

    pub fn coordinator(&self) -> UpdateResult<ReleaseCoordinator> {
        ReleaseCoordinator::new(self.build_sources()?)
    }

    pub fn resolver(&self) -> VersionResolver {
        VersionResolver::new(self.store.clone())
    }

    /// HTTP handler state around an existing coordinator
    pub fn app_state(&self, coordinator: ReleaseCoordinator) -> SharedState {
        Arc::new(AppState::new(
            self.resolver(),
            coordinator,
            self.config.api_key.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BranchConfig;
    use crate::core::Branch;
    use crate::db::test_store;
    use crate::di::mocks::{MockArtifactHasher, MockAzureProvider, MockGitHubProvider};

    async fn container(branches: Vec<BranchConfig>) -> ServiceContainer {
        let config = Config {
            data_directory: Some("/tmp/update-server-test".to_string()),
            branches,
            ..Config::default()
        };
        ServiceContainer::with_providers(
            config,
            test_store().await,
            Arc::new(MockAzureProvider::new()),
            Arc::new(MockGitHubProvider::new()),
            Arc::new(MockArtifactHasher::new()),
        )
    }

    #[tokio::test]
    async fn test_sources_follow_branch_config() {
        let container = container(vec![
            BranchConfig::new(Branch::Develop, SourceKind::Azure),
            BranchConfig::new(Branch::Master, SourceKind::GitHub),
        ])
        .await;

        let sources = container.build_sources().unwrap();
        let wiring: Vec<(Branch, SourceKind)> =
            sources.iter().map(|s| (s.branch(), s.kind())).collect();
        assert_eq!(
            wiring,
            vec![
                (Branch::Develop, SourceKind::Azure),
                (Branch::Master, SourceKind::GitHub)
            ]
        );

        let coordinator = container.coordinator().unwrap();
        assert_eq!(coordinator.branches(), vec![Branch::Master, Branch::Develop]);
    }

    #[tokio::test]
    async fn test_app_state_carries_api_key() {
        let mut container = container(vec![]).await;
        container.config.api_key = "s3cret".to_string();

        let coordinator = container.coordinator().unwrap();
        let state = container.app_state(coordinator);
        assert_eq!(state.api_key, "s3cret");
        assert!(state.coordinator.branches().is_empty());
    }
}
