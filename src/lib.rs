//! Update server for the Lidarr desktop client
//!
//! Ingests builds from Azure DevOps and GitHub releases, verifies and
//! classifies their artifacts, and answers client update checks over HTTP.
//! Shared vocabulary lives in `update-core` and is re-exported here.

pub use update_core::{UpdateError, UpdateResult};

/// Core module re-exported from update-core.
pub mod core {
    pub use update_core::core::*;
    pub use update_core::*;

    /// Path module re-exported from update-core.
    pub mod path {
        pub use update_core::core::path::*;
    }
}

/// HTTP API.
pub mod api;

/// Azure DevOps build integration.
pub mod azure;

/// Configuration management.
pub mod config;

/// Release and artifact persistence.
pub mod db;

/// Dependency injection infrastructure.
pub mod di;

/// GitHub releases integration.
pub mod github;

/// Release ingestion.
pub mod release;

/// Client update resolution.
pub mod update;
