//! Trait definitions for dependency injection

use crate::azure::types::{AzureArtifact, AzureBuild, AzureChange, AzureFile};
use crate::core::{Branch, UpdateResult};
use crate::github::types::GitHubRelease;
use crate::release::{BuildCursor, SourceKind};
use async_trait::async_trait;
use std::path::Path;

/// Trait for Azure DevOps build API access
///
/// Implementations should be thread-safe (Send + Sync).
#[async_trait]
pub trait AzureProvider: Send + Sync {
    /// Most recent completed, successful CI builds of `upstream_branch`, newest first
    async fn list_builds(&self, upstream_branch: &str, top: u32) -> UpdateResult<Vec<AzureBuild>>;

    /// Commits that went into a build
    async fn get_changes(&self, build_id: u64) -> UpdateResult<Vec<AzureChange>>;

    /// Artifacts a build published
    async fn get_artifacts(&self, build_id: u64) -> UpdateResult<Vec<AzureArtifact>>;

    /// Files listed in an artifact's manifest
    async fn get_manifest(
        &self,
        build_id: u64,
        artifact: &AzureArtifact,
    ) -> UpdateResult<Vec<AzureFile>>;

    /// Direct download URL of one file inside an artifact
    fn file_download_url(&self, build_id: u64, artifact_name: &str, file: &AzureFile) -> String;
}

/// Trait for GitHub API operations
#[async_trait]
pub trait GitHubProvider: Send + Sync {
    /// Most recent releases of a repository, newest first
    async fn get_releases(
        &self,
        owner: &str,
        repo: &str,
        per_page: u32,
    ) -> UpdateResult<Vec<GitHubRelease>>;
}

/// Trait for downloading and hashing release artifacts
#[async_trait]
pub trait ArtifactHasher: Send + Sync {
    /// Download `url` to `staging_path` and return its lowercase hex SHA-256.
    /// The staging file is gone when this returns.
    async fn hash_artifact(&self, url: &str, staging_path: &Path) -> UpdateResult<String>;
}

/// An upstream provider feeding one branch
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    fn branch(&self) -> Branch;

    /// Ingest builds newer than `cursor`, advancing it past every build
    /// persisted. Returns true when at least one release record was created.
    async fn fetch_releases(&self, cursor: &mut BuildCursor) -> UpdateResult<bool>;
}
