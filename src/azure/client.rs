//! Azure DevOps build API client

use crate::azure::types::{AzureArtifact, AzureBuild, AzureChange, AzureFile, AzureList, AzureManifest};
use crate::config::AzureConfig;
use crate::core::{UpdateError, UpdateResult};
use crate::di::traits::AzureProvider;
use crate::release::classifier::file_name;
use async_trait::async_trait;
use reqwest::{header, Client as HttpClient};
use std::time::Duration;
use urlencoding::encode;

const API_VERSION: &str = "5.1";

/// Azure DevOps client scoped to one organization and project
pub struct AzureClient {
    http_client: HttpClient,
    /// `{api_url}/{organization}/{project}`
    project_url: String,
}

impl AzureClient {
    /// Create a new Azure DevOps client
    pub fn new(config: &AzureConfig) -> UpdateResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("update-server"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let http_client = HttpClient::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| UpdateError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            project_url: format!(
                "{}/{}/{}",
                config.api_url.trim_end_matches('/'),
                encode(&config.organization),
                encode(&config.project)
            ),
        })
    }

    fn builds_url(&self) -> String {
        format!("{}/_apis/build/builds", self.project_url)
    }

    /// List recent completed, succeeded CI builds on a branch
    pub async fn list_builds(&self, upstream_branch: &str, top: u32) -> UpdateResult<Vec<AzureBuild>> {
        let url = format!(
            "{}?api-version={}&branchName={}&reasonFilter=individualCI&statusFilter=completed\
             &resultFilter=succeeded&queryOrder=startTimeDescending&$top={}",
            self.builds_url(),
            API_VERSION,
            encode(&format!("refs/heads/{}", upstream_branch)),
            top
        );
        let list: AzureList<AzureBuild> = self.api_get(&url).await?;
        Ok(list.value)
    }

    /// Get the commits associated with a build
    pub async fn get_changes(&self, build_id: u64) -> UpdateResult<Vec<AzureChange>> {
        let url = format!(
            "{}/{}/changes?api-version={}",
            self.builds_url(),
            build_id,
            API_VERSION
        );
        let list: AzureList<AzureChange> = self.api_get(&url).await?;
        Ok(list.value)
    }

    /// Get the artifacts published by a build
    pub async fn get_artifacts(&self, build_id: u64) -> UpdateResult<Vec<AzureArtifact>> {
        let url = format!(
            "{}/{}/artifacts?api-version={}",
            self.builds_url(),
            build_id,
            API_VERSION
        );
        let list: AzureList<AzureArtifact> = self.api_get(&url).await?;
        Ok(list.value)
    }

    /// Download and parse the `manifest` file of an artifact
    pub async fn get_manifest(
        &self,
        build_id: u64,
        artifact: &AzureArtifact,
    ) -> UpdateResult<Vec<AzureFile>> {
        let url = self.artifact_file_url(build_id, &artifact.name, &artifact.resource.data, "manifest");
        let manifest: AzureManifest = self.api_get(&url).await?;
        Ok(manifest.files)
    }

    /// URL serving one file of an artifact
    pub fn file_download_url(&self, build_id: u64, artifact_name: &str, file: &AzureFile) -> String {
        self.artifact_file_url(build_id, artifact_name, &file.blob.id, file_name(&file.path))
    }

    fn artifact_file_url(&self, build_id: u64, artifact_name: &str, file_id: &str, name: &str) -> String {
        format!(
            "{}/{}/artifacts?artifactName={}&fileId={}&fileName={}&api-version={}",
            self.builds_url(),
            build_id,
            encode(artifact_name),
            encode(file_id),
            encode(name),
            API_VERSION
        )
    }

    /// Make an API GET request and parse JSON response
    async fn api_get<T: serde::de::DeserializeOwned>(&self, url: &str) -> UpdateResult<T> {
        tracing::trace!("GET {}", url);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| UpdateError::UpstreamApi(format!("Azure DevOps request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(UpdateError::UpstreamApi(format!(
                "Azure DevOps API error: HTTP {} for {}",
                response.status(),
                url
            )));
        }

        response.json().await.map_err(|e| {
            UpdateError::UpstreamApi(format!("Failed to parse Azure DevOps response: {}", e))
        })
    }
}

#[async_trait]
impl AzureProvider for AzureClient {
    async fn list_builds(&self, upstream_branch: &str, top: u32) -> UpdateResult<Vec<AzureBuild>> {
        Self::list_builds(self, upstream_branch, top).await
    }

    async fn get_changes(&self, build_id: u64) -> UpdateResult<Vec<AzureChange>> {
        Self::get_changes(self, build_id).await
    }

    async fn get_artifacts(&self, build_id: u64) -> UpdateResult<Vec<AzureArtifact>> {
        Self::get_artifacts(self, build_id).await
    }

    async fn get_manifest(
        &self,
        build_id: u64,
        artifact: &AzureArtifact,
    ) -> UpdateResult<Vec<AzureFile>> {
        Self::get_manifest(self, build_id, artifact).await
    }

    fn file_download_url(&self, build_id: u64, artifact_name: &str, file: &AzureFile) -> String {
        Self::file_download_url(self, build_id, artifact_name, file)
    }
}
