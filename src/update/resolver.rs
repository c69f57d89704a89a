//! Answers client update checks from the release store.

use crate::core::{
    Architecture, Branch, OperatingSystem, PlatformDescriptor, Runtime, UpdateError, UpdateResult,
    Version,
};
use crate::db::{Release, ReleaseStore};
use crate::update::types::{UpdateChanges, UpdatePackage, UpdatePackageContainer};

/// Releases listed by the change history endpoint
pub const RECENT_CHANGES_LIMIT: u32 = 5;

#[derive(Clone)]
pub struct VersionResolver {
    store: ReleaseStore,
}

impl VersionResolver {
    pub fn new(store: ReleaseStore) -> Self {
        Self { store }
    }

    /// Decide whether a newer release than `client_version` exists for the
    /// client's platform.
    ///
    /// The version is validated before the store is consulted.
    pub async fn resolve_latest(
        &self,
        branch: Branch,
        client_version: &str,
        os: OperatingSystem,
        runtime: Runtime,
        arch: Architecture,
    ) -> UpdateResult<UpdatePackageContainer> {
        let client_version = Version::parse(client_version)?;
        let request = PlatformDescriptor::normalized(os, runtime, arch);

        let release = self
            .store
            .latest_release_for(branch, &request)
            .await?
            .ok_or(UpdateError::NoUpdateFound)?;

        let artifact = self
            .store
            .artifact_for(release.id, &request)
            .await?
            .ok_or(UpdateError::NoArtifactFound)?;

        if stored_version(&release)? <= client_version {
            return Ok(UpdatePackageContainer::up_to_date());
        }

        tracing::debug!(
            "Offering {} on {} to {} client at {}",
            release.version,
            branch,
            request,
            client_version
        );

        Ok(UpdatePackageContainer::available(UpdatePackage {
            version: release.version,
            release_date: release.release_date,
            filename: artifact.filename,
            url: artifact.url,
            hash: artifact.hash,
            changes: UpdateChanges::from_list(&release.changes),
            status: None,
            branch: release.branch,
            runtime: Some(artifact.platform.runtime),
        }))
    }

    /// Newest releases on a branch that ship for `os`, with their change notes
    pub async fn list_recent_changes(
        &self,
        branch: Branch,
        os: OperatingSystem,
    ) -> UpdateResult<Vec<UpdatePackage>> {
        let releases = self
            .store
            .recent_releases_for_os(branch, os, RECENT_CHANGES_LIMIT)
            .await?;

        let mut packages = Vec::with_capacity(releases.len());
        for release in releases {
            let Some(artifact) = self.store.artifact_for_os(release.id, os).await? else {
                continue;
            };

            packages.push(UpdatePackage {
                changes: UpdateChanges::from_list(&release.changes),
                version: release.version,
                release_date: release.release_date,
                filename: artifact.filename,
                url: artifact.url,
                hash: artifact.hash,
                status: release.status,
                branch: release.branch,
                runtime: None,
            });
        }
        Ok(packages)
    }
}

fn stored_version(release: &Release) -> UpdateResult<Version> {
    Version::parse(&release.version).map_err(|_| {
        UpdateError::Constraint(format!(
            "Release {} on {} has an unparseable version {}",
            release.id, release.branch, release.version
        ))
    })
}
