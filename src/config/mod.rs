use crate::core::path::{config_file, default_data_dir, ensure_dir};
use crate::core::{Architecture, Branch, Runtime, UpdateError, UpdateResult};
use crate::release::{LinuxTarget, SourceKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP API listens on
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Shared secret the refresh webhook must present.
    /// An empty key rejects every webhook call.
    #[serde(default)]
    pub api_key: String,

    /// Root for staging downloads and the default database
    ///
    /// Default locations:
    /// - Windows: %LOCALAPPDATA%\update-server
    /// - Linux: ~/.local/share/update-server
    /// - macOS: ~/Library/Application Support/update-server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_directory: Option<String>,

    /// sqlx connection URL (defaults to `sqlite://<data_directory>/updates.db`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,

    /// Refresh every branch on this interval; unset disables polling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval_secs: Option<u64>,

    #[serde(default)]
    pub azure: AzureConfig,

    #[serde(default)]
    pub github: GitHubConfig,

    /// Branches served, each bound to one upstream source
    #[serde(default = "default_branches")]
    pub branches: Vec<BranchConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    #[serde(default = "default_azure_api_url")]
    pub api_url: String,

    #[serde(default = "default_azure_name")]
    pub organization: String,

    #[serde(default = "default_azure_name")]
    pub project: String,

    /// CI branch whose builds are ingested
    #[serde(default = "default_upstream_branch")]
    pub upstream_branch: String,

    /// Name of the artifact holding the release packages
    #[serde(default = "default_package_artifact")]
    pub package_artifact: String,

    /// How many recent builds one pass looks at
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            api_url: default_azure_api_url(),
            organization: default_azure_name(),
            project: default_azure_name(),
            upstream_branch: default_upstream_branch(),
            package_artifact: default_package_artifact(),
            history_limit: default_history_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(default = "default_github_api_url")]
    pub api_url: String,

    #[serde(default = "default_github_owner")]
    pub owner: String,

    #[serde(default = "default_github_repo")]
    pub repo: String,

    /// Personal access token; `GITHUB_TOKEN` takes precedence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default = "default_history_limit")]
    pub history_limit: u32,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_github_api_url(),
            owner: default_github_owner(),
            repo: default_github_repo(),
            token: None,
            history_limit: default_history_limit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchConfig {
    pub branch: Branch,
    pub source: SourceKind,

    /// GitHub only: ingest prereleases instead of stable releases
    #[serde(default)]
    pub prerelease: bool,

    /// Runtime of the Linux packages this source publishes
    #[serde(default)]
    pub linux_runtime: Runtime,

    #[serde(default)]
    pub linux_arch: Architecture,
}

impl BranchConfig {
    pub fn new(branch: Branch, source: SourceKind) -> Self {
        Self {
            branch,
            source,
            prerelease: false,
            linux_runtime: Runtime::default(),
            linux_arch: Architecture::default(),
        }
    }

    pub fn linux_target(&self) -> LinuxTarget {
        LinuxTarget::new(self.linux_runtime, self.linux_arch)
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_azure_api_url() -> String {
    "https://dev.azure.com".to_string()
}

fn default_azure_name() -> String {
    "Lidarr".to_string()
}

fn default_upstream_branch() -> String {
    "develop".to_string()
}

fn default_package_artifact() -> String {
    "Packages".to_string()
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_github_owner() -> String {
    "lidarr".to_string()
}

fn default_github_repo() -> String {
    "Lidarr".to_string()
}

fn default_history_limit() -> u32 {
    5
}

fn default_branches() -> Vec<BranchConfig> {
    vec![BranchConfig::new(Branch::Develop, SourceKind::Azure)]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            api_key: String::new(),
            data_directory: None,
            database_url: None,
            poll_interval_secs: None,
            azure: AzureConfig::default(),
            github: GitHubConfig::default(),
            branches: default_branches(),
        }
    }
}

impl Config {
    /// Load config from the platform-specific config directory, creating a
    /// default one if it doesn't exist
    ///
    /// Config locations:
    /// - Windows: %APPDATA%\update-server\config.yaml
    /// - Linux: ~/.config/update-server/config.yaml
    /// - macOS: ~/Library/Application Support/update-server/config.yaml
    pub fn load() -> UpdateResult<Self> {
        Self::load_from(&config_file()?)
    }

    /// Load config from an explicit path, then apply environment overrides
    /// and validate
    pub fn load_from(path: &Path) -> UpdateResult<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            serde_yaml::from_str(&content)
                .map_err(|e| UpdateError::Config(format!("Failed to parse config: {}", e)))?
        } else {
            tracing::info!("Creating default config at {}", path.display());
            let config = Self::default();
            config.save_to(path)?;
            config
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Write config as YAML, creating parent directories
    pub fn save_to(&self, path: &Path) -> UpdateResult<()> {
        let config_dir = path
            .parent()
            .ok_or_else(|| UpdateError::Path("Invalid config path".to_string()))?;
        ensure_dir(config_dir)?;

        let content = serde_yaml::to_string(self)
            .map_err(|e| UpdateError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)?;
        Ok(())
    }

    /// Overlay deployment settings from the environment
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("UPDATE_SERVER_API_KEY") {
            self.api_key = key;
        }
        if let Some(dir) = lookup("UPDATE_SERVER_DATA_DIR") {
            self.data_directory = Some(dir);
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Some(addr) = lookup("BIND_ADDRESS") {
            self.bind_address = addr;
        }
    }

    /// Reject settings the service can't run with
    pub fn validate(&self) -> UpdateResult<()> {
        self.bind_address.parse::<SocketAddr>().map_err(|e| {
            UpdateError::Config(format!("Invalid bind_address {}: {}", self.bind_address, e))
        })?;

        if let Some(ref dir) = self.data_directory {
            if !Path::new(dir).is_absolute() {
                return Err(UpdateError::Config(format!(
                    "data_directory must be an absolute path: {}",
                    dir
                )));
            }
        }

        let mut seen = HashSet::new();
        for entry in &self.branches {
            if !seen.insert(entry.branch) {
                return Err(UpdateError::Config(format!(
                    "Branch {} is configured more than once",
                    entry.branch
                )));
            }
        }

        if self.azure.history_limit == 0 || self.github.history_limit == 0 {
            return Err(UpdateError::Config(
                "history_limit must be at least 1".to_string(),
            ));
        }

        if self.poll_interval_secs == Some(0) {
            return Err(UpdateError::Config(
                "poll_interval_secs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the data directory path
    pub fn get_data_dir(&self) -> UpdateResult<PathBuf> {
        if let Some(ref dir) = self.data_directory {
            Ok(PathBuf::from(dir))
        } else {
            default_data_dir()
        }
    }

    /// Get the database URL, defaulting to a file in the data directory
    pub fn get_database_url(&self) -> UpdateResult<String> {
        if let Some(ref url) = self.database_url {
            return Ok(url.clone());
        }
        let db_path = self.get_data_dir()?.join("updates.db");
        Ok(format!("sqlite://{}", db_path.display()))
    }

    pub fn branch(&self, branch: Branch) -> Option<&BranchConfig> {
        self.branches.iter().find(|b| b.branch == branch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.bind_address, "0.0.0.0:5000");
        assert!(config.api_key.is_empty());
        assert_eq!(config.azure.package_artifact, "Packages");
        assert_eq!(config.azure.history_limit, 5);
        assert_eq!(
            config.branches,
            vec![BranchConfig::new(Branch::Develop, SourceKind::Azure)]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialization_defaults() {
        let yaml = r#"
api_key: s3cret
data_directory: /srv/updates
branches:
  - branch: develop
    source: azure
    linux_runtime: netcore
    linux_arch: arm64
  - branch: nightly
    source: github
    prerelease: true
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.api_key, "s3cret");
        assert_eq!(config.bind_address, "0.0.0.0:5000");
        assert_eq!(config.github.owner, "lidarr");
        assert_eq!(config.branches.len(), 2);
        assert_eq!(
            config.branches[0].linux_target(),
            LinuxTarget::new(Runtime::NetCore, Architecture::Arm64)
        );
        assert!(config.branches[1].prerelease);
        assert_eq!(config.branches[1].linux_runtime, Runtime::DotNet);
    }

    #[test]
    fn test_database_url_defaults_to_data_dir() {
        let config = Config {
            data_directory: Some("/srv/updates".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.get_database_url().unwrap(),
            "sqlite:///srv/updates/updates.db"
        );

        let config = Config {
            database_url: Some("sqlite::memory:".to_string()),
            ..config
        };
        assert_eq!(config.get_database_url().unwrap(), "sqlite::memory:");
    }

    #[test]
    fn test_relative_data_dir_rejected() {
        let config = Config {
            data_directory: Some("data".to_string()),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(UpdateError::Config(_))));
    }

    #[test]
    fn test_duplicate_branch_rejected() {
        let config = Config {
            branches: vec![
                BranchConfig::new(Branch::Develop, SourceKind::Azure),
                BranchConfig::new(Branch::Develop, SourceKind::GitHub),
            ],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(UpdateError::Config(_))));
    }

    #[test]
    fn test_invalid_bind_address_rejected() {
        let config = Config {
            bind_address: "localhost".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let env: HashMap<&str, &str> = [
            ("UPDATE_SERVER_API_KEY", "from-env"),
            ("UPDATE_SERVER_DATA_DIR", "/var/lib/updates"),
            ("BIND_ADDRESS", "127.0.0.1:8080"),
        ]
        .into_iter()
        .collect();

        let mut config = Config {
            api_key: "from-file".to_string(),
            ..Default::default()
        };
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api_key, "from-env");
        assert_eq!(config.data_directory.as_deref(), Some("/var/lib/updates"));
        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert!(config.database_url.is_none());
    }

    #[test]
    #[serial]
    fn test_load_from_creates_default_and_reads_env() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.yaml");

        let original = std::env::var("UPDATE_SERVER_API_KEY").ok();
        std::env::set_var("UPDATE_SERVER_API_KEY", "env-key");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.api_key, "env-key");

        // The env value is not written back
        let on_disk: Config =
            serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(on_disk.api_key.is_empty());

        if let Some(key) = original {
            std::env::set_var("UPDATE_SERVER_API_KEY", key);
        } else {
            std::env::remove_var("UPDATE_SERVER_API_KEY");
        }
    }

    #[test]
    #[serial]
    fn test_load_from_rejects_bad_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "branches: [not, a, branch]").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(UpdateError::Config(_))
        ));
    }
}
