//! Relational store: connection pool, migrations and release queries.

pub mod models;
pub mod store;

pub use models::{Artifact, ChangeList, NewArtifact, NewRelease, Release};
pub use store::{ReleaseStore, SavedBuild};

use crate::core::UpdateResult;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Create a connection pool for the given SQLite URL.
///
/// In-memory databases live only as long as their connection, so they get
/// a single connection that is never recycled.
pub async fn create_pool(database_url: &str) -> UpdateResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .max_connections(5)
            .idle_timeout(Duration::from_secs(600))
    };

    let pool = pool_options
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Apply the embedded schema migrations
pub async fn migrate(pool: &SqlitePool) -> UpdateResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// In-memory store with the schema applied, for tests
#[cfg(test)]
pub(crate) async fn test_store() -> ReleaseStore {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    migrate(&pool).await.unwrap();
    ReleaseStore::new(pool)
}
