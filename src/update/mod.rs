//! Client update checks and change history.

pub mod resolver;
pub mod types;

pub use resolver::{VersionResolver, RECENT_CHANGES_LIMIT};
pub use types::{ErrorResponse, UpdateChanges, UpdatePackage, UpdatePackageContainer};
