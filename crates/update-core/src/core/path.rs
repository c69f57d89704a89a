use crate::core::error::{UpdateError, UpdateResult};
use crate::core::platform::Branch;
use std::path::{Path, PathBuf};

/// Get the update-server home directory
///
/// Platform-specific locations:
/// - Windows: %APPDATA%\update-server
/// - Linux: ~/.config/update-server
/// - macOS: ~/Library/Application Support/update-server
pub fn server_home() -> UpdateResult<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| UpdateError::Path("Could not determine config directory".to_string()))?;
    Ok(config_dir.join("update-server"))
}

/// Get the default config file path
pub fn config_file() -> UpdateResult<PathBuf> {
    Ok(server_home()?.join("config.yaml"))
}

/// Get the default data directory
///
/// Platform-specific locations:
/// - Windows: %LOCALAPPDATA%\update-server
/// - Linux: ~/.local/share/update-server
/// - macOS: ~/Library/Application Support/update-server
pub fn default_data_dir() -> UpdateResult<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| UpdateError::Path("Could not determine data directory".to_string()))?;
    Ok(data_dir.join("update-server"))
}

/// Staging location for an artifact being hashed: `<data>/<branch>/<file>`
pub fn staging_path(data_dir: &Path, branch: Branch, file_name: &str) -> PathBuf {
    data_dir.join(branch.as_str()).join(file_name)
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> UpdateResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_staging_path_layout() {
        let path = staging_path(Path::new("/data"), Branch::Develop, "Lidarr.develop.windows.zip");
        assert_eq!(path, PathBuf::from("/data/develop/Lidarr.develop.windows.zip"));
    }

    #[test]
    fn test_ensure_dir_creates_nested() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // Second call is a no-op
        ensure_dir(&nested).unwrap();
    }

    #[test]
    fn test_config_file_name() {
        if let Ok(path) = config_file() {
            assert!(path.ends_with("update-server/config.yaml"));
        }
    }
}
