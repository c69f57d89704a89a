//! Azure DevOps integration
//!
//! Lists CI builds of a branch and reads the package artifact they publish.

pub mod client;
pub mod types;

pub use client::AzureClient;
pub use types::{AzureArtifact, AzureBuild, AzureChange, AzureFile};
