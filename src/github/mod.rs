//! GitHub integration for release ingestion
//!
//! This module lists repository releases and their assets, tracking the
//! API rate limit so an exhausted quota fails fast instead of hammering
//! the API.

pub mod client;
pub mod types;

pub use client::GitHubClient;
pub use types::{GitHubRelease, ReleaseAsset};
