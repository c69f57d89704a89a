//! Release and artifact records as stored and as returned by the store.

use crate::core::{
    Architecture, Branch, OperatingSystem, PlatformDescriptor, Runtime, UpdateError, UpdateResult,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Change messages attached to a release, split into new features and fixes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeList {
    pub new: Vec<String>,
    pub fixed: Vec<String>,
}

impl ChangeList {
    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.fixed.is_empty()
    }
}

/// A versioned release on a branch
#[derive(Debug, Clone, PartialEq)]
pub struct Release {
    pub id: i64,
    pub version: String,
    pub branch: Branch,
    pub release_date: DateTime<Utc>,
    pub status: Option<String>,
    pub changes: ChangeList,
}

/// One downloadable file of a release for a single platform
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub release_id: i64,
    pub platform: PlatformDescriptor,
    pub filename: String,
    pub url: String,
    pub hash: Option<String>,
}

/// Release data to upsert for an ingested build
#[derive(Debug, Clone)]
pub struct NewRelease {
    pub version: String,
    pub branch: Branch,
    pub release_date: DateTime<Utc>,
    pub status: Option<String>,
    pub changes: ChangeList,
}

/// Artifact data to insert for an ingested build
#[derive(Debug, Clone, PartialEq)]
pub struct NewArtifact {
    pub platform: PlatformDescriptor,
    pub filename: String,
    pub url: String,
    pub hash: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ReleaseRow {
    pub id: i64,
    pub version: String,
    pub branch: String,
    pub release_date: i64,
    pub status: Option<String>,
    pub new_changes: String,
    pub fixed_changes: String,
}

impl TryFrom<ReleaseRow> for Release {
    type Error = UpdateError;

    fn try_from(row: ReleaseRow) -> UpdateResult<Self> {
        let release_date = DateTime::<Utc>::from_timestamp_millis(row.release_date).ok_or_else(|| {
            UpdateError::Constraint(format!(
                "Release {} has an out-of-range release date {}",
                row.id, row.release_date
            ))
        })?;

        Ok(Self {
            id: row.id,
            version: row.version,
            branch: row.branch.parse()?,
            release_date,
            status: row.status,
            changes: ChangeList {
                new: serde_json::from_str(&row.new_changes)?,
                fixed: serde_json::from_str(&row.fixed_changes)?,
            },
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ArtifactRow {
    pub release_id: i64,
    pub os: String,
    pub runtime: String,
    pub arch: String,
    pub filename: String,
    pub url: String,
    pub hash: Option<String>,
}

impl TryFrom<ArtifactRow> for Artifact {
    type Error = UpdateError;

    fn try_from(row: ArtifactRow) -> UpdateResult<Self> {
        let os: OperatingSystem = row.os.parse()?;
        let runtime: Runtime = row.runtime.parse()?;
        let arch: Architecture = row.arch.parse()?;

        Ok(Self {
            release_id: row.release_id,
            platform: PlatformDescriptor { os, runtime, arch },
            filename: row.filename,
            url: row.url,
            hash: row.hash,
        })
    }
}
