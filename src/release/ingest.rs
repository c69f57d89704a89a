//! Persists one upstream build: release upsert plus new per-platform artifacts.

use crate::core::path::staging_path;
use crate::core::{Branch, PlatformDescriptor, UpdateResult};
use crate::db::{ChangeList, NewArtifact, NewRelease, ReleaseStore};
use crate::di::traits::ArtifactHasher;
use crate::release::classifier::{classify, file_name, LinuxTarget};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// A file published by an upstream build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub path: String,
    pub download_url: String,
}

/// An upstream build ready to be persisted
#[derive(Debug, Clone)]
pub struct CandidateBuild {
    pub version: String,
    pub branch: Branch,
    pub released_at: DateTime<Utc>,
    pub status: Option<String>,
    pub changes: ChangeList,
    pub files: Vec<CandidateFile>,
}

/// Shared persistence step of every release source
#[derive(Clone)]
pub struct BuildIngestor {
    store: ReleaseStore,
    hasher: Arc<dyn ArtifactHasher>,
    data_dir: PathBuf,
    linux_target: LinuxTarget,
}

impl BuildIngestor {
    pub fn new(
        store: ReleaseStore,
        hasher: Arc<dyn ArtifactHasher>,
        data_dir: PathBuf,
        linux_target: LinuxTarget,
    ) -> Self {
        Self {
            store,
            hasher,
            data_dir,
            linux_target,
        }
    }

    /// Persist a build; returns true when its release record was created.
    ///
    /// Platforms that already have an artifact are skipped before any
    /// download, so re-walking a build is cheap and never duplicates rows.
    pub async fn ingest(&self, build: CandidateBuild) -> UpdateResult<bool> {
        let mut known: HashSet<PlatformDescriptor> =
            match self.store.find_release(&build.version, build.branch).await? {
                Some(existing) => self
                    .store
                    .artifacts_for_release(existing.id)
                    .await?
                    .into_iter()
                    .map(|a| a.platform)
                    .collect(),
                None => HashSet::new(),
            };

        let mut pending = Vec::new();
        for file in &build.files {
            let Some(platform) = classify(&file.path, self.linux_target) else {
                tracing::trace!("Skipping non-release file {}", file.path);
                continue;
            };

            if !known.insert(platform) {
                tracing::debug!(
                    "{} {} already has a {} artifact, skipping {}",
                    build.branch,
                    build.version,
                    platform,
                    file.path
                );
                continue;
            }

            let filename = file_name(&file.path).to_string();
            let staging = staging_path(&self.data_dir, build.branch, &filename);
            let hash = self
                .hasher
                .hash_artifact(&file.download_url, &staging)
                .await?;

            pending.push(NewArtifact {
                platform,
                filename,
                url: file.download_url.clone(),
                hash: Some(hash),
            });
        }

        let release = NewRelease {
            version: build.version,
            branch: build.branch,
            release_date: build.released_at,
            status: build.status,
            changes: build.changes,
        };
        let saved = self.store.save_build(&release, &pending).await?;

        if saved.created {
            tracing::info!("Added release {} on {}", release.version, release.branch);
        }
        if saved.artifacts_inserted > 0 {
            tracing::info!(
                "Stored {} new artifact(s) for {} on {}",
                saved.artifacts_inserted,
                release.version,
                release.branch
            );
        }

        Ok(saved.created)
    }
}
