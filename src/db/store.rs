use crate::core::{Branch, OperatingSystem, PlatformDescriptor, UpdateResult};
use crate::db::models::{
    Artifact, ArtifactRow, NewArtifact, NewRelease, Release, ReleaseRow,
};
use sqlx::SqlitePool;

const RELEASE_COLUMNS: &str =
    "r.id, r.version, r.branch, r.release_date, r.status, r.new_changes, r.fixed_changes";

const ARTIFACT_COLUMNS: &str = "release_id, os, runtime, arch, filename, url, hash";

/// Outcome of persisting one ingested build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedBuild {
    pub release_id: i64,
    /// The release row was created by this call rather than found
    pub created: bool,
    pub artifacts_inserted: usize,
}

/// SQL bindings for a platform request: OS always, runtime/arch only for Linux.
struct PlatformFilter {
    os: &'static str,
    runtime: Option<&'static str>,
    arch: Option<&'static str>,
}

impl PlatformFilter {
    fn for_request(request: &PlatformDescriptor) -> Self {
        if request.os == OperatingSystem::Linux {
            Self {
                os: request.os.as_str(),
                runtime: Some(request.runtime.as_str()),
                arch: Some(request.arch.as_str()),
            }
        } else {
            Self::os_only(request.os)
        }
    }

    fn os_only(os: OperatingSystem) -> Self {
        Self {
            os: os.as_str(),
            runtime: None,
            arch: None,
        }
    }
}

/// Release and artifact persistence.
///
/// `(version, branch)` and `(release, platform)` uniqueness are enforced by
/// the schema; writes use `ON CONFLICT DO NOTHING` so concurrent ingestion
/// of the same build cannot duplicate rows.
#[derive(Clone)]
pub struct ReleaseStore {
    pool: SqlitePool,
}

impl ReleaseStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Find the release for a version on a branch
    pub async fn find_release(&self, version: &str, branch: Branch) -> UpdateResult<Option<Release>> {
        let sql = format!(
            "SELECT {} FROM releases r WHERE r.version = ?1 AND r.branch = ?2",
            RELEASE_COLUMNS
        );
        let row: Option<ReleaseRow> = sqlx::query_as(&sql)
            .bind(version)
            .bind(branch.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Release::try_from).transpose()
    }

    /// All releases on a branch, newest first
    pub async fn list_releases(&self, branch: Branch) -> UpdateResult<Vec<Release>> {
        let sql = format!(
            "SELECT {} FROM releases r WHERE r.branch = ?1 ORDER BY r.release_date DESC, r.id DESC",
            RELEASE_COLUMNS
        );
        let rows: Vec<ReleaseRow> = sqlx::query_as(&sql)
            .bind(branch.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Release::try_from).collect()
    }

    /// All artifacts of a release
    pub async fn artifacts_for_release(&self, release_id: i64) -> UpdateResult<Vec<Artifact>> {
        let sql = format!(
            "SELECT {} FROM artifacts WHERE release_id = ?1 ORDER BY os, runtime, arch",
            ARTIFACT_COLUMNS
        );
        let rows: Vec<ArtifactRow> = sqlx::query_as(&sql)
            .bind(release_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Artifact::try_from).collect()
    }

    /// Upsert a release and insert the build's new artifacts in one transaction
    pub async fn save_build(
        &self,
        release: &NewRelease,
        artifacts: &[NewArtifact],
    ) -> UpdateResult<SavedBuild> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO releases (version, branch, release_date, status, new_changes, fixed_changes) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             ON CONFLICT (version, branch) DO NOTHING",
        )
        .bind(&release.version)
        .bind(release.branch.as_str())
        .bind(release.release_date.timestamp_millis())
        .bind(&release.status)
        .bind(serde_json::to_string(&release.changes.new)?)
        .bind(serde_json::to_string(&release.changes.fixed)?)
        .execute(&mut *tx)
        .await?;

        let created = inserted.rows_affected() == 1;

        let release_id: i64 =
            sqlx::query_scalar("SELECT id FROM releases WHERE version = ?1 AND branch = ?2")
                .bind(&release.version)
                .bind(release.branch.as_str())
                .fetch_one(&mut *tx)
                .await?;

        let mut artifacts_inserted = 0;
        for artifact in artifacts {
            let result = sqlx::query(
                "INSERT INTO artifacts (release_id, os, runtime, arch, filename, url, hash) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
                 ON CONFLICT (release_id, os, runtime, arch) DO NOTHING",
            )
            .bind(release_id)
            .bind(artifact.platform.os.as_str())
            .bind(artifact.platform.runtime.as_str())
            .bind(artifact.platform.arch.as_str())
            .bind(&artifact.filename)
            .bind(&artifact.url)
            .bind(&artifact.hash)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                tracing::warn!(
                    "Artifact {} for {} {} already stored, keeping the existing row",
                    artifact.platform,
                    release.version,
                    release.branch
                );
            } else {
                artifacts_inserted += 1;
            }
        }

        tx.commit().await?;

        Ok(SavedBuild {
            release_id,
            created,
            artifacts_inserted,
        })
    }

    /// Newest release on a branch with an artifact accepted by `request`
    pub async fn latest_release_for(
        &self,
        branch: Branch,
        request: &PlatformDescriptor,
    ) -> UpdateResult<Option<Release>> {
        let mut releases = self
            .releases_with_artifact(branch, PlatformFilter::for_request(request), 1)
            .await?;
        Ok(releases.pop())
    }

    /// Up to `limit` newest releases on a branch with an artifact for `os`
    pub async fn recent_releases_for_os(
        &self,
        branch: Branch,
        os: OperatingSystem,
        limit: u32,
    ) -> UpdateResult<Vec<Release>> {
        self.releases_with_artifact(branch, PlatformFilter::os_only(os), limit)
            .await
    }

    /// The artifact of a release accepted by `request`, if any
    pub async fn artifact_for(
        &self,
        release_id: i64,
        request: &PlatformDescriptor,
    ) -> UpdateResult<Option<Artifact>> {
        self.find_artifact(release_id, PlatformFilter::for_request(request))
            .await
    }

    /// The artifact of a release for `os`, if any
    pub async fn artifact_for_os(
        &self,
        release_id: i64,
        os: OperatingSystem,
    ) -> UpdateResult<Option<Artifact>> {
        self.find_artifact(release_id, PlatformFilter::os_only(os))
            .await
    }

    async fn releases_with_artifact(
        &self,
        branch: Branch,
        filter: PlatformFilter,
        limit: u32,
    ) -> UpdateResult<Vec<Release>> {
        let sql = format!(
            "SELECT {} FROM releases r \
             WHERE r.branch = ?1 AND EXISTS ( \
                 SELECT 1 FROM artifacts a \
                 WHERE a.release_id = r.id AND a.os = ?2 \
                   AND (?3 IS NULL OR (a.runtime = ?3 AND a.arch = ?4))) \
             ORDER BY r.release_date DESC, r.id DESC \
             LIMIT ?5",
            RELEASE_COLUMNS
        );
        let rows: Vec<ReleaseRow> = sqlx::query_as(&sql)
            .bind(branch.as_str())
            .bind(filter.os)
            .bind(filter.runtime)
            .bind(filter.arch)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Release::try_from).collect()
    }

    async fn find_artifact(
        &self,
        release_id: i64,
        filter: PlatformFilter,
    ) -> UpdateResult<Option<Artifact>> {
        let sql = format!(
            "SELECT {} FROM artifacts \
             WHERE release_id = ?1 AND os = ?2 \
               AND (?3 IS NULL OR (runtime = ?3 AND arch = ?4)) \
             ORDER BY runtime, arch \
             LIMIT 1",
            ARTIFACT_COLUMNS
        );
        let row: Option<ArtifactRow> = sqlx::query_as(&sql)
            .bind(release_id)
            .bind(filter.os)
            .bind(filter.runtime)
            .bind(filter.arch)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Artifact::try_from).transpose()
    }
}
