//! Release source backed by Azure DevOps CI builds.

use crate::azure::AzureBuild;
use crate::config::AzureConfig;
use crate::core::{Branch, UpdateResult, Version};
use crate::di::traits::{AzureProvider, ReleaseSource};
use crate::release::changes;
use crate::release::ingest::{BuildIngestor, CandidateBuild, CandidateFile};
use crate::release::{BuildCursor, SourceKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct AzureReleaseSource {
    branch: Branch,
    client: Arc<dyn AzureProvider>,
    ingestor: BuildIngestor,
    upstream_branch: String,
    package_artifact: String,
    history_limit: u32,
}

impl AzureReleaseSource {
    pub fn new(
        branch: Branch,
        client: Arc<dyn AzureProvider>,
        ingestor: BuildIngestor,
        config: &AzureConfig,
    ) -> Self {
        Self {
            branch,
            client,
            ingestor,
            upstream_branch: config.upstream_branch.clone(),
            package_artifact: config.package_artifact.clone(),
            history_limit: config.history_limit,
        }
    }

    /// Turn one CI build into a candidate; `None` when it has nothing to offer
    async fn candidate(
        &self,
        build: &AzureBuild,
        version: &Version,
        started: DateTime<Utc>,
    ) -> UpdateResult<Option<CandidateBuild>> {
        let build_id = build.id;
        let messages = self.client.get_changes(build_id).await?;
        let artifacts = self.client.get_artifacts(build_id).await?;

        let Some(artifact) = artifacts.iter().find(|a| a.name == self.package_artifact) else {
            tracing::warn!(
                "Build {} ({}) has no {} artifact, skipping",
                build_id,
                version,
                self.package_artifact
            );
            return Ok(None);
        };

        let files = self
            .client
            .get_manifest(build_id, artifact)
            .await?
            .iter()
            .map(|file| CandidateFile {
                path: file.path.clone(),
                download_url: self.client.file_download_url(build_id, &artifact.name, file),
            })
            .collect();

        Ok(Some(CandidateBuild {
            version: version.to_string(),
            branch: self.branch,
            released_at: started,
            status: build.status.clone(),
            changes: changes::from_messages(messages.iter().map(|c| c.message.as_str())),
            files,
        }))
    }
}

#[async_trait]
impl ReleaseSource for AzureReleaseSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Azure
    }

    fn branch(&self) -> Branch {
        self.branch
    }

    async fn fetch_releases(&self, cursor: &mut BuildCursor) -> UpdateResult<bool> {
        let builds = self
            .client
            .list_builds(&self.upstream_branch, self.history_limit)
            .await?;

        let mut has_new_release = false;
        let mut newest_seen = None;

        for build in &builds {
            if cursor.covers(build.id) {
                break;
            }

            let Some(started) = build.start_time else {
                tracing::debug!("Build {} has not started, stopping", build.id);
                break;
            };

            tracing::info!("Found version: {}", build.build_number);

            match Version::parse(&build.build_number) {
                Ok(version) => {
                    if let Some(candidate) = self.candidate(build, &version, started).await? {
                        has_new_release |= self.ingestor.ingest(candidate).await?;
                    }
                }
                Err(e) => {
                    tracing::warn!("Skipping build {}: {}", build.id, e);
                }
            }

            newest_seen = newest_seen.max(Some(build.id));
        }

        // Only a batch that finished moves the cursor, so a failed build is retried
        if let Some(id) = newest_seen {
            cursor.advance(id);
        }

        Ok(has_new_release)
    }
}
