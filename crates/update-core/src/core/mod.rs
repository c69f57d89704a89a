pub mod error;
pub mod path;
pub mod platform;
pub mod version;

pub use error::{UpdateError, UpdateResult};
