//! Release source backed by GitHub releases.

use crate::config::GitHubConfig;
use crate::core::{Branch, UpdateResult, Version};
use crate::di::traits::{GitHubProvider, ReleaseSource};
use crate::release::changes;
use crate::release::ingest::{BuildIngestor, CandidateBuild, CandidateFile};
use crate::release::{BuildCursor, SourceKind};
use async_trait::async_trait;
use std::sync::Arc;

pub struct GitHubReleaseSource {
    branch: Branch,
    client: Arc<dyn GitHubProvider>,
    ingestor: BuildIngestor,
    owner: String,
    repo: String,
    history_limit: u32,
    /// Which side of the `prerelease` flag this branch follows
    prerelease: bool,
}

impl GitHubReleaseSource {
    pub fn new(
        branch: Branch,
        client: Arc<dyn GitHubProvider>,
        ingestor: BuildIngestor,
        config: &GitHubConfig,
        prerelease: bool,
    ) -> Self {
        Self {
            branch,
            client,
            ingestor,
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            history_limit: config.history_limit,
            prerelease,
        }
    }
}

#[async_trait]
impl ReleaseSource for GitHubReleaseSource {
    fn kind(&self) -> SourceKind {
        SourceKind::GitHub
    }

    fn branch(&self) -> Branch {
        self.branch
    }

    async fn fetch_releases(&self, cursor: &mut BuildCursor) -> UpdateResult<bool> {
        let releases = self
            .client
            .get_releases(&self.owner, &self.repo, self.history_limit)
            .await?;

        let mut has_new_release = false;
        let mut newest_seen = None;

        for release in &releases {
            if cursor.covers(release.id) {
                break;
            }

            // A draft keeps its id once published, so it must stay unprocessed
            if release.draft {
                tracing::debug!("Skipping draft release {}", release.tag_name);
                continue;
            }

            if release.prerelease != self.prerelease {
                tracing::debug!(
                    "Skipping {} for {}: prerelease={}",
                    release.tag_name,
                    self.branch,
                    release.prerelease
                );
                newest_seen = newest_seen.max(Some(release.id));
                continue;
            }

            let Some(published) = release.published_at else {
                tracing::debug!("Release {} is not published, stopping", release.tag_name);
                break;
            };

            tracing::info!("Found version: {}", release.tag_name);

            match Version::parse(release.version_tag()) {
                Ok(version) => {
                    let candidate = CandidateBuild {
                        version: version.to_string(),
                        branch: self.branch,
                        released_at: published,
                        status: None,
                        changes: changes::from_release_notes(release.body.as_deref().unwrap_or("")),
                        files: release
                            .assets
                            .iter()
                            .map(|asset| CandidateFile {
                                path: asset.name.clone(),
                                download_url: asset.browser_download_url.clone(),
                            })
                            .collect(),
                    };
                    has_new_release |= self.ingestor.ingest(candidate).await?;
                }
                Err(e) => {
                    tracing::warn!("Skipping release {}: {}", release.tag_name, e);
                }
            }

            newest_seen = newest_seen.max(Some(release.id));
        }

        if let Some(id) = newest_seen {
            cursor.advance(id);
        }

        Ok(has_new_release)
    }
}
