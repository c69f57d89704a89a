//! Maps published file paths to the platform they run on.

use crate::core::{Architecture, OperatingSystem, PlatformDescriptor, Runtime};
use serde::{Deserialize, Serialize};

/// Runtime and architecture a source declares for its Linux builds.
///
/// Linux file names don't carry the runtime, so the source supplies it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinuxTarget {
    #[serde(default)]
    pub runtime: Runtime,
    #[serde(default)]
    pub arch: Architecture,
}

impl LinuxTarget {
    pub fn new(runtime: Runtime, arch: Architecture) -> Self {
        Self { runtime, arch }
    }
}

/// Detect the target OS of a published file, first match wins.
///
/// Windows requires a `.zip` as well: builds also publish a
/// `*.windows.exe` installer that must not be offered as an update.
pub fn detect_os(path: &str) -> Option<OperatingSystem> {
    if path.contains("windows.") && path.to_lowercase().contains(".zip") {
        Some(OperatingSystem::Windows)
    } else if path.contains("linux.") {
        Some(OperatingSystem::Linux)
    } else if path.contains("osx.") {
        Some(OperatingSystem::Osx)
    } else {
        None
    }
}

/// Classify a published file into the descriptor its artifact is stored under
pub fn classify(path: &str, linux: LinuxTarget) -> Option<PlatformDescriptor> {
    detect_os(path).map(|os| PlatformDescriptor::for_artifact(os, linux.runtime, linux.arch))
}

/// Last path segment of a published file (`/a/b/Lidarr.zip` -> `Lidarr.zip`)
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
