//! Dependency injection infrastructure
//!
//! Upstream APIs, artifact hashing and release sources sit behind traits so
//! ingestion can be exercised without network access.
//!
//! # Example (Testing)
//! ```
//! use update_server::di::mocks::{MockArtifactHasher, MockAzureProvider};
//! use update_server::di::{ArtifactHasher, AzureProvider};
//! use std::sync::Arc;
//!
//! let azure: Arc<dyn AzureProvider> = Arc::new(MockAzureProvider::new());
//! let hasher: Arc<dyn ArtifactHasher> = Arc::new(MockArtifactHasher::new());
//! ```

pub mod container;
pub mod mocks;
pub mod traits;

// Re-export key types
pub use container::ServiceContainer;
pub use traits::{ArtifactHasher, AzureProvider, GitHubProvider, ReleaseSource};
