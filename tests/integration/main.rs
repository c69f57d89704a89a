//! Integration tests driving the HTTP API end to end
//!
//! Builds are ingested through the real coordinator and sources with mock
//! upstream providers, then queried through the axum router.

mod changes;
mod common;
mod update;
mod webhook;
