//! Branch and target-platform vocabulary.

use crate::core::error::UpdateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Release channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    Master,
    Develop,
    Nightly,
}

impl Branch {
    pub const ALL: [Branch; 3] = [Branch::Master, Branch::Develop, Branch::Nightly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Branch::Master => "master",
            Branch::Develop => "develop",
            Branch::Nightly => "nightly",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Branch {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Branch::ALL
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UpdateError::Config(format!("Unknown branch: {}", s)))
    }
}

/// Target operating system
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingSystem {
    #[default]
    Windows,
    Linux,
    Osx,
}

impl OperatingSystem {
    pub const ALL: [OperatingSystem; 3] = [
        OperatingSystem::Windows,
        OperatingSystem::Linux,
        OperatingSystem::Osx,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingSystem::Windows => "windows",
            OperatingSystem::Linux => "linux",
            OperatingSystem::Osx => "osx",
        }
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperatingSystem {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperatingSystem::ALL
            .into_iter()
            .find(|os| os.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UpdateError::Config(format!("Unknown operating system: {}", s)))
    }
}

/// Runtime a build targets
///
/// `DotNet` is the managed runtime; `Mono` is an alias for it. `NetCore`
/// builds are native and architecture-specific.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Runtime {
    #[default]
    DotNet,
    NetCore,
    Mono,
}

impl Runtime {
    pub const ALL: [Runtime; 3] = [Runtime::DotNet, Runtime::NetCore, Runtime::Mono];

    pub fn as_str(&self) -> &'static str {
        match self {
            Runtime::DotNet => "dotnet",
            Runtime::NetCore => "netcore",
            Runtime::Mono => "mono",
        }
    }

    /// Collapse the alternate managed runtime onto the managed one
    pub fn canonical(self) -> Self {
        match self {
            Runtime::Mono => Runtime::DotNet,
            other => other,
        }
    }

    pub fn is_managed(self) -> bool {
        self.canonical() == Runtime::DotNet
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Runtime {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Runtime::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UpdateError::Config(format!("Unknown runtime: {}", s)))
    }
}

/// CPU architecture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    X86,
    #[default]
    X64,
    Arm,
    Arm64,
}

impl Architecture {
    pub const ALL: [Architecture; 4] = [
        Architecture::X86,
        Architecture::X64,
        Architecture::Arm,
        Architecture::Arm64,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::X86 => "x86",
            Architecture::X64 => "x64",
            Architecture::Arm => "arm",
            Architecture::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Architecture {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Architecture::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UpdateError::Config(format!("Unknown architecture: {}", s)))
    }
}

/// OS + runtime + architecture a build runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformDescriptor {
    pub os: OperatingSystem,
    pub runtime: Runtime,
    pub arch: Architecture,
}

impl PlatformDescriptor {
    /// Normalize a client-reported platform.
    ///
    /// Mono collapses to DotNet, and the managed runtime is architecture
    /// independent so its architecture is pinned to the default.
    pub fn normalized(os: OperatingSystem, runtime: Runtime, arch: Architecture) -> Self {
        let runtime = runtime.canonical();
        let arch = if runtime == Runtime::DotNet {
            Architecture::default()
        } else {
            arch
        };
        Self { os, runtime, arch }
    }

    /// Descriptor under which an artifact is stored.
    ///
    /// Only Linux artifacts are distinguished by runtime and architecture;
    /// Windows and macOS artifacts are keyed by OS alone.
    pub fn for_artifact(os: OperatingSystem, runtime: Runtime, arch: Architecture) -> Self {
        if os == OperatingSystem::Linux {
            Self::normalized(os, runtime, arch)
        } else {
            Self::managed(os)
        }
    }

    /// Managed-runtime descriptor with the default architecture
    pub fn managed(os: OperatingSystem) -> Self {
        Self {
            os,
            runtime: Runtime::DotNet,
            arch: Architecture::default(),
        }
    }

    /// Whether an artifact stored under `artifact` satisfies this (normalized) request.
    pub fn accepts(&self, artifact: &PlatformDescriptor) -> bool {
        if self.os == OperatingSystem::Linux {
            self == artifact
        } else {
            self.os == artifact.os
        }
    }
}

impl fmt::Display for PlatformDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.os, self.runtime, self.arch)
    }
}
