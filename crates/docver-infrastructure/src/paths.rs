//! Location of the docver configuration file.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// The platform has no per-user configuration directory.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find the user configuration directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Path layout for docver.
///
/// ```text
/// ~/.config/docver/     # dirs::config_dir() on Linux
/// └── config.toml       # WorkflowConfig
/// ```
pub struct DocverPaths;

impl DocverPaths {
    pub const APP_DIR: &'static str = "docver";
    pub const CONFIG_FILE: &'static str = "config.toml";

    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(Self::APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the default path of the configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join(Self::CONFIG_FILE))
    }
}
