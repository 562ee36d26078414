use super::schema::Config;
use crate::error::{ConfigError, ConfigResult};
use std::io;
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = "treecp";
const CONFIG_FILE_NAME: &str = "config.toml";

/// `<config_dir>/treecp/config.toml`, or `None` when the platform has no
/// config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Loads the user config file, falling back to defaults when there is none.
pub fn load_config() -> ConfigResult<Config> {
    match default_config_path() {
        Some(path) => load_config_or_default(&path),
        None => Ok(Config::default()),
    }
}

pub fn load_config_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        cause: e,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        cause: e,
    })
}

fn load_config_or_default(path: &Path) -> ConfigResult<Config> {
    match load_config_file(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::Io { cause, .. }) if cause.kind() == io::ErrorKind::NotFound => {
            Ok(Config::default())
        }
        Err(e) => Err(e),
    }
}
