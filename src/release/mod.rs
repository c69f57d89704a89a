//! Release ingestion: upstream sources, artifact classification and hashing,
//! and the per-branch coordinator that drives them.

pub mod azure_source;
pub mod changes;
pub mod classifier;
pub mod coordinator;
pub mod github_source;
pub mod hasher;
pub mod ingest;

pub use azure_source::AzureReleaseSource;
pub use classifier::LinuxTarget;
pub use coordinator::{IngestEvent, IngestOutcome, RefreshTicket, ReleaseCoordinator};
pub use github_source::GitHubReleaseSource;
pub use hasher::HashVerifier;
pub use ingest::{BuildIngestor, CandidateBuild, CandidateFile};

use crate::core::UpdateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upstream provider a branch ingests from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Azure,
    GitHub,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Azure => "azure",
            SourceKind::GitHub => "github",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [SourceKind::Azure, SourceKind::GitHub]
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UpdateError::UnknownSource(s.to_string()))
    }
}

/// Highest upstream build id processed for a branch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildCursor(Option<u64>);

impl BuildCursor {
    pub fn new() -> Self {
        Self(None)
    }

    pub fn get(&self) -> Option<u64> {
        self.0
    }

    /// Move forward to `id`; never moves backwards.
    pub fn advance(&mut self, id: u64) {
        if self.0.map_or(true, |current| current < id) {
            self.0 = Some(id);
        }
    }

    /// True when `id` was already processed
    pub fn covers(&self, id: u64) -> bool {
        self.0.is_some_and(|current| id <= current)
    }
}
