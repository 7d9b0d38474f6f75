//! Loads [`WorkflowConfig`] from TOML and the environment.
//!
//! Precedence, lowest first: built-in defaults, the config file, `DOCVER_*`
//! environment variables. The merged result is validated before it is
//! returned.

use crate::paths::DocverPaths;
use anyhow::{Context, Result};
use docver_core::config::WorkflowConfig;
use std::path::{Path, PathBuf};

pub const ENV_EXECUTE_API_URL: &str = "DOCVER_EXECUTE_API_URL";
pub const ENV_CHECKIN_API_URL: &str = "DOCVER_CHECKIN_API_URL";
pub const ENV_LOGIN_URL: &str = "DOCVER_LOGIN_URL";
pub const ENV_USER: &str = "DOCVER_USER";
pub const ENV_PASSWORD: &str = "DOCVER_PASSWORD";
pub const ENV_CABINET: &str = "DOCVER_CABINET";
pub const ENV_DOCUMENT_INDEX: &str = "DOCVER_DOCUMENT_INDEX";
pub const ENV_CONTENT_PATH: &str = "DOCVER_CONTENT_PATH";

pub struct ConfigService;

impl ConfigService {
    /// Loads the configuration for a run from the process environment.
    ///
    /// With `explicit` set the file must exist. Without it the default
    /// location is used, and a missing default file means "defaults plus
    /// environment".
    pub fn load(explicit: Option<&Path>) -> Result<WorkflowConfig> {
        Self::load_with_env(explicit, std::env::vars())
    }

    /// Same as [`load`](Self::load) with the environment supplied by the caller.
    pub fn load_with_env<I>(explicit: Option<&Path>, env: I) -> Result<WorkflowConfig>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = match explicit {
            Some(path) => Self::read_file(path)?,
            None => {
                let path = DocverPaths::config_file()?;
                if path.exists() {
                    Self::read_file(&path)?
                } else {
                    tracing::info!(
                        "[Config] No config file at {}, using defaults and environment",
                        path.display()
                    );
                    WorkflowConfig::default()
                }
            }
        };

        let applied = Self::apply_env_overrides(&mut config, env);
        if !applied.is_empty() {
            tracing::info!("[Config] Environment overrides: {}", applied.join(", "));
        }

        config.validate().context("Invalid docver configuration")?;
        Ok(config)
    }

    /// Parses one TOML file without applying overrides or validation.
    pub fn read_file(path: &Path) -> Result<WorkflowConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = WorkflowConfig::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::debug!("[Config] Loaded {}", path.display());
        Ok(config)
    }

    /// Applies every recognized `DOCVER_*` variable and returns the names used.
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides<I>(config: &mut WorkflowConfig, env: I) -> Vec<&'static str>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut applied = Vec::new();

        for (key, value) in env {
            if value.is_empty() {
                continue;
            }
            let name = match key.as_str() {
                ENV_EXECUTE_API_URL => {
                    config.endpoint.execute_api_url = value;
                    ENV_EXECUTE_API_URL
                }
                ENV_CHECKIN_API_URL => {
                    config.endpoint.checkin_api_url = value;
                    ENV_CHECKIN_API_URL
                }
                ENV_LOGIN_URL => {
                    config.endpoint.login_url = value;
                    ENV_LOGIN_URL
                }
                ENV_USER => {
                    config.credentials.user_name = value;
                    ENV_USER
                }
                ENV_PASSWORD => {
                    config.credentials.password = value;
                    ENV_PASSWORD
                }
                ENV_CABINET => {
                    config.target.cabinet = value;
                    ENV_CABINET
                }
                ENV_DOCUMENT_INDEX => {
                    config.target.document_index = value;
                    ENV_DOCUMENT_INDEX
                }
                ENV_CONTENT_PATH => {
                    config.content.path = PathBuf::from(value);
                    ENV_CONTENT_PATH
                }
                _ => continue,
            };
            applied.push(name);
        }

        applied
    }
}
