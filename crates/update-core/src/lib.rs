//! Core types shared by the update server.
//!
//! Holds the error type, the four-component build version and the
//! platform/branch vocabulary used by both ingestion and resolution.

pub mod core;

pub use core::error::{UpdateError, UpdateResult};
pub use core::platform::{Architecture, Branch, OperatingSystem, PlatformDescriptor, Runtime};
pub use core::version::Version;
