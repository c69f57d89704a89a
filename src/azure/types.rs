//! Azure DevOps build API type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope the build API wraps every collection in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureList<T> {
    #[serde(default)]
    pub count: Option<u64>,
    pub value: Vec<T>,
}

/// A CI build
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureBuild {
    pub id: u64,
    pub build_number: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    /// Absent for builds that were queued but never started
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
}

/// A commit associated with a build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureChange {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// A published build artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureArtifact {
    pub name: String,
    pub resource: ArtifactResource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactResource {
    /// Container file id of the artifact root, used to fetch its manifest
    pub data: String,
    #[serde(default)]
    pub download_url: Option<String>,
}

/// File listing stored in an artifact's `manifest` file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureManifest {
    #[serde(rename = "items", default)]
    pub files: Vec<AzureFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureFile {
    pub path: String,
    pub blob: FileBlob,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileBlob {
    pub id: String,
    #[serde(default)]
    pub size: Option<u64>,
}
