use std::fs;
use std::path::{Path, PathBuf};

use super::core::GroupnestConfig;
use crate::errors::ConfigError;

pub const CONFIG_FILE_NAME: &str = ".groupnest.toml";
const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Parse and validate config from a TOML string.
pub fn parse_config(contents: &str, origin: &Path) -> Result<GroupnestConfig, ConfigError> {
    let config =
        toml::from_str::<GroupnestConfig>(contents).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
    config.validate()?;
    Ok(config)
}

/// Load an explicitly requested config file. Missing files are an error.
pub fn load_config_from(path: &Path) -> Result<GroupnestConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&contents, path)?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// `start` and up to `max_depth - 1` of its ancestors.
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        parent.pop().then_some(parent)
    })
    .take(max_depth)
}

/// Candidate config files, nearest first.
pub fn candidate_paths(start: PathBuf) -> Vec<PathBuf> {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .chain(dirs::config_dir().map(|dir| dir.join("groupnest").join("config.toml")))
        .collect()
}

/// Discover config from the working directory upward, then the user
/// config directory. Unreadable or invalid files are reported and skipped.
pub fn load_config() -> GroupnestConfig {
    let current = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            tracing::warn!("Failed to get current directory: {e}. Using default config.");
            return GroupnestConfig::default();
        }
    };

    candidate_paths(current)
        .into_iter()
        .filter(|path| path.is_file())
        .find_map(|path| match load_config_from(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("{e}. Ignoring this config file.");
                None
            }
        })
        .unwrap_or_else(|| {
            tracing::debug!("No config file found. Using default config.");
            GroupnestConfig::default()
        })
}
