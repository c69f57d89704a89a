pub mod refresh;
pub mod releases;
pub mod serve;

use std::path::Path;
use update_server::config::Config;
use update_server::core::UpdateResult;

/// Load the config from an explicit path or the default location
pub fn load_config(path: Option<&Path>) -> UpdateResult<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}
