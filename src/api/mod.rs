//! API module - HTTP handlers and routing.

pub mod error;
pub mod handlers;
pub mod routes;

use crate::release::ReleaseCoordinator;
use crate::update::VersionResolver;
use std::sync::Arc;

pub use error::ApiError;
pub use routes::create_router;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub resolver: VersionResolver,
    pub coordinator: ReleaseCoordinator,
    /// Webhook shared secret; empty rejects every call
    pub api_key: String,
}

impl AppState {
    pub fn new(resolver: VersionResolver, coordinator: ReleaseCoordinator, api_key: String) -> Self {
        Self {
            resolver,
            coordinator,
            api_key,
        }
    }
}

pub type SharedState = Arc<AppState>;
