//! Mock implementations of service traits for testing

use super::traits::{ArtifactHasher, AzureProvider, GitHubProvider, ReleaseSource};
use crate::azure::types::{ArtifactResource, AzureArtifact, AzureBuild, AzureChange, AzureFile, FileBlob};
use crate::core::{Branch, UpdateError, UpdateResult};
use crate::github::types::{GitHubRelease, ReleaseAsset};
use crate::release::{BuildCursor, SourceKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock Azure DevOps provider backed by in-memory builds
///
/// # Example
///
/// ```
/// use update_server::di::mocks::MockAzureProvider;
///
/// let azure = MockAzureProvider::new();
/// azure.add_build(
///     MockAzureProvider::build(12, "2.1.0", Some(chrono::Utc::now())),
///     &["New: artist index"],
///     &["/Lidarr.develop.2.1.0.windows.zip"],
/// );
/// ```
#[derive(Clone, Default)]
pub struct MockAzureProvider {
    builds: Arc<Mutex<Vec<AzureBuild>>>,
    changes: Arc<Mutex<HashMap<u64, Vec<AzureChange>>>>,
    artifacts: Arc<Mutex<HashMap<u64, Vec<AzureArtifact>>>>,
    manifests: Arc<Mutex<HashMap<u64, Vec<AzureFile>>>>,
    failing_builds: Arc<Mutex<HashSet<u64>>>,
    list_calls: Arc<AtomicUsize>,
}

impl MockAzureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for a completed build
    pub fn build(id: u64, number: &str, started: Option<DateTime<Utc>>) -> AzureBuild {
        AzureBuild {
            id,
            build_number: number.to_string(),
            status: Some("completed".to_string()),
            result: Some("succeeded".to_string()),
            start_time: started,
        }
    }

    /// Register a build publishing `files` in a `Packages` artifact
    pub fn add_build(&self, build: AzureBuild, messages: &[&str], files: &[&str]) {
        self.add_build_with_artifact(build, messages, "Packages", files);
    }

    /// Register a build whose files live in an artifact named `artifact_name`
    pub fn add_build_with_artifact(
        &self,
        build: AzureBuild,
        messages: &[&str],
        artifact_name: &str,
        files: &[&str],
    ) {
        let id = build.id;
        self.builds.lock().unwrap().push(build);
        self.changes.lock().unwrap().insert(
            id,
            messages
                .iter()
                .map(|m| AzureChange {
                    id: None,
                    message: m.to_string(),
                })
                .collect(),
        );
        self.artifacts.lock().unwrap().insert(
            id,
            vec![AzureArtifact {
                name: artifact_name.to_string(),
                resource: ArtifactResource {
                    data: format!("#/{}/{}", id, artifact_name),
                    download_url: None,
                },
            }],
        );
        self.manifests.lock().unwrap().insert(
            id,
            files
                .iter()
                .enumerate()
                .map(|(i, path)| AzureFile {
                    path: path.to_string(),
                    blob: FileBlob {
                        id: format!("blob-{}-{}", id, i),
                        size: None,
                    },
                })
                .collect(),
        );
    }

    /// Make every API call about `build_id` fail
    pub fn fail_build(&self, build_id: u64) {
        self.failing_builds.lock().unwrap().insert(build_id);
    }

    /// Undo [`fail_build`](Self::fail_build)
    pub fn recover_build(&self, build_id: u64) {
        self.failing_builds.lock().unwrap().remove(&build_id);
    }

    /// Number of times the build list was requested
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn check(&self, build_id: u64) -> UpdateResult<()> {
        if self.failing_builds.lock().unwrap().contains(&build_id) {
            return Err(UpdateError::UpstreamApi(format!(
                "Azure DevOps API error: build {} unavailable",
                build_id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AzureProvider for MockAzureProvider {
    async fn list_builds(&self, _upstream_branch: &str, top: u32) -> UpdateResult<Vec<AzureBuild>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let mut builds = self.builds.lock().unwrap().clone();
        builds.sort_by(|a, b| b.id.cmp(&a.id));
        builds.truncate(top as usize);
        Ok(builds)
    }

    async fn get_changes(&self, build_id: u64) -> UpdateResult<Vec<AzureChange>> {
        self.check(build_id)?;
        Ok(self
            .changes
            .lock()
            .unwrap()
            .get(&build_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_artifacts(&self, build_id: u64) -> UpdateResult<Vec<AzureArtifact>> {
        self.check(build_id)?;
        Ok(self
            .artifacts
            .lock()
            .unwrap()
            .get(&build_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_manifest(
        &self,
        build_id: u64,
        _artifact: &AzureArtifact,
    ) -> UpdateResult<Vec<AzureFile>> {
        self.check(build_id)?;
        Ok(self
            .manifests
            .lock()
            .unwrap()
            .get(&build_id)
            .cloned()
            .unwrap_or_default())
    }

    fn file_download_url(&self, build_id: u64, artifact_name: &str, file: &AzureFile) -> String {
        format!(
            "https://azure.test/{}/{}/{}{}",
            build_id, artifact_name, file.blob.id, file.path
        )
    }
}

/// Mock GitHub provider serving a fixed release list
#[derive(Clone, Default)]
pub struct MockGitHubProvider {
    releases: Arc<Mutex<Vec<GitHubRelease>>>,
}

impl MockGitHubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for a published release with one asset per name
    pub fn release(
        id: u64,
        tag: &str,
        published: Option<DateTime<Utc>>,
        body: &str,
        assets: &[&str],
    ) -> GitHubRelease {
        GitHubRelease {
            id,
            tag_name: tag.to_string(),
            name: Some(tag.to_string()),
            draft: false,
            prerelease: false,
            assets: assets
                .iter()
                .map(|name| ReleaseAsset {
                    name: name.to_string(),
                    browser_download_url: format!(
                        "https://github.test/releases/download/{}/{}",
                        tag, name
                    ),
                    size: 0,
                    content_type: "application/octet-stream".to_string(),
                })
                .collect(),
            body: Some(body.to_string()),
            published_at: published,
        }
    }

    pub fn add_release(&self, release: GitHubRelease) {
        self.releases.lock().unwrap().push(release);
    }
}

#[async_trait]
impl GitHubProvider for MockGitHubProvider {
    async fn get_releases(
        &self,
        _owner: &str,
        _repo: &str,
        per_page: u32,
    ) -> UpdateResult<Vec<GitHubRelease>> {
        let mut releases = self.releases.lock().unwrap().clone();
        releases.sort_by(|a, b| b.id.cmp(&a.id));
        releases.truncate(per_page as usize);
        Ok(releases)
    }
}

/// Mock artifact hasher that never touches the network
///
/// The hash of an artifact is the SHA-256 of its URL.
#[derive(Clone, Default)]
pub struct MockArtifactHasher {
    calls: Arc<Mutex<Vec<(String, PathBuf)>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl MockArtifactHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail downloads of `url`
    pub fn fail_on(self, url: &str) -> Self {
        self.failing.lock().unwrap().insert(url.to_string());
        self
    }

    /// Let downloads of `url` succeed again
    pub fn recover(&self, url: &str) {
        self.failing.lock().unwrap().remove(url);
    }

    /// Hash reported for `url`
    pub fn hash_for(url: &str) -> String {
        hex::encode(Sha256::digest(url.as_bytes()))
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    pub fn staged_paths(&self) -> Vec<PathBuf> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, path)| path.clone())
            .collect()
    }
}

#[async_trait]
impl ArtifactHasher for MockArtifactHasher {
    async fn hash_artifact(&self, url: &str, staging_path: &Path) -> UpdateResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), staging_path.to_path_buf()));

        if self.failing.lock().unwrap().contains(url) {
            return Err(UpdateError::Download(format!(
                "Failed to download {}: HTTP 500 Internal Server Error",
                url
            )));
        }
        Ok(Self::hash_for(url))
    }
}

/// Release source that only records how it was driven
///
/// Each pass sleeps for `delay`, advances the cursor to the pass number and
/// tracks how many passes overlapped.
#[derive(Clone)]
pub struct MockReleaseSource {
    kind: SourceKind,
    branch: Branch,
    delay: Duration,
    fail: bool,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
    runs: Arc<AtomicUsize>,
}

impl MockReleaseSource {
    pub fn new(kind: SourceKind, branch: Branch) -> Self {
        Self {
            kind,
            branch,
            delay: Duration::ZERO,
            fail: false,
            active: Arc::new(AtomicUsize::new(0)),
            max_active: Arc::new(AtomicUsize::new(0)),
            runs: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Completed passes
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    /// Highest number of passes that ran at the same time
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReleaseSource for MockReleaseSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn branch(&self) -> Branch {
        self.branch
    }

    async fn fetch_releases(&self, cursor: &mut BuildCursor) -> UpdateResult<bool> {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.active.fetch_sub(1, Ordering::SeqCst);
        let run = self.runs.fetch_add(1, Ordering::SeqCst) + 1;

        if self.fail {
            return Err(UpdateError::UpstreamApi("mock source unavailable".to_string()));
        }
        cursor.advance(run as u64);
        Ok(run == 1)
    }
}
