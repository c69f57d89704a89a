//! Client update check and change history endpoints.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use std::str::FromStr;

use crate::api::{ApiError, SharedState};
use crate::core::{Architecture, Branch, OperatingSystem, Runtime, UpdateError, Version};
use crate::update::{ErrorResponse, UpdatePackage};

const INVALID_VERSION: &str = "Invalid version number specified.";
const UPDATE_NOT_FOUND: &str = "Latest update not found.";
const FILE_NOT_FOUND: &str = "Latest update file not found.";

#[derive(Debug, Default, Deserialize)]
pub struct UpdateQuery {
    pub version: Option<String>,
    pub os: Option<String>,
    pub runtime: Option<String>,
    pub arch: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChangesQuery {
    /// Accepted for compatibility; the listing doesn't depend on it
    pub version: Option<String>,
    pub os: Option<String>,
}

/// Missing or unrecognized values fall back to the type's default
fn param_or_default<T: FromStr + Default>(value: Option<&str>) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or_default()
}

fn error_message(message: &str) -> Response {
    Json(ErrorResponse::new(message)).into_response()
}

/// GET /v1/update/:branch
pub async fn get_update(
    State(state): State<SharedState>,
    Path(branch): Path<String>,
    Query(query): Query<UpdateQuery>,
) -> Result<Response, ApiError> {
    let version = query.version.unwrap_or_default();

    let Ok(branch) = branch.parse::<Branch>() else {
        return Ok(match Version::parse(&version) {
            Ok(_) => error_message(UPDATE_NOT_FOUND),
            Err(_) => error_message(INVALID_VERSION),
        });
    };

    let os: OperatingSystem = param_or_default(query.os.as_deref());
    let runtime: Runtime = param_or_default(query.runtime.as_deref());
    let arch: Architecture = param_or_default(query.arch.as_deref());

    match state
        .resolver
        .resolve_latest(branch, &version, os, runtime, arch)
        .await
    {
        Ok(container) => Ok(Json(container).into_response()),
        Err(UpdateError::InvalidVersion(_)) => Ok(error_message(INVALID_VERSION)),
        Err(UpdateError::NoUpdateFound) => Ok(error_message(UPDATE_NOT_FOUND)),
        Err(UpdateError::NoArtifactFound) => Ok(error_message(FILE_NOT_FOUND)),
        Err(e) => Err(e.into()),
    }
}

/// GET /v1/update/:branch/changes
pub async fn get_changes(
    State(state): State<SharedState>,
    Path(branch): Path<String>,
    Query(query): Query<ChangesQuery>,
) -> Result<Json<Vec<UpdatePackage>>, ApiError> {
    let Ok(branch) = branch.parse::<Branch>() else {
        return Ok(Json(Vec::new()));
    };
    let os: OperatingSystem = param_or_default(query.os.as_deref());

    let packages = state.resolver.list_recent_changes(branch, os).await?;
    Ok(Json(packages))
}
