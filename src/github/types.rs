//! GitHub API type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// GitHub release information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRelease {
    pub id: u64,
    pub tag_name: String,
    pub name: Option<String>,
    pub draft: bool,
    pub prerelease: bool,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
    pub body: Option<String>,
    /// Unset while the release is a draft
    pub published_at: Option<DateTime<Utc>>,
}

impl GitHubRelease {
    /// Tag with a leading `v` removed (`v1.2.0` -> `1.2.0`)
    pub fn version_tag(&self) -> &str {
        self.tag_name
            .strip_prefix('v')
            .or_else(|| self.tag_name.strip_prefix('V'))
            .unwrap_or(&self.tag_name)
    }
}

/// GitHub release asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
    pub size: u64,
    #[serde(default)]
    pub content_type: String,
}
