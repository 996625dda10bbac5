//! Configuration management for crash-analyzer

pub mod schema;

pub use schema::Config;

use crate::error::{CrashError, CrashResult};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Directory name of the cache environment under the home directory
const ENV_DIR_NAME: &str = ".agent-crash-analyzer";

/// Loads and saves the TOML config file
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Manager for the default config location
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Manager for an explicit config file (`--config`)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// `<config dir>/crash-analyzer/config.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("crash-analyzer")
            .join("config.toml")
    }

    /// Default cache environment root
    pub fn default_env_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(ENV_DIR_NAME)
    }

    /// Cache environment root: explicit override, then config, then default
    pub fn env_dir(config: &Config, override_dir: Option<&Path>) -> PathBuf {
        override_dir
            .map(Path::to_path_buf)
            .or_else(|| config.general.env_dir.clone())
            .unwrap_or_else(Self::default_env_dir)
    }

    /// Load the config file; a missing file means defaults
    pub async fn load(&self) -> CrashResult<Config> {
        let path = &self.config_path;
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                return Ok(Config::default());
            }
            Err(e) => return Err(CrashError::io(format!("reading {}", path.display()), e)),
        };

        toml::from_str(&content).map_err(|e| CrashError::ConfigInvalid {
            path: path.clone(),
            reason: e.to_string(),
        })
    }

    /// Write `config`, creating the config directory on first save
    pub async fn save(&self, config: &Config) -> CrashResult<()> {
        let path = &self.config_path;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| CrashError::ConfigDirCreate {
                    path: dir.to_path_buf(),
                    source: e,
                })?;
        }

        fs::write(path, toml::to_string_pretty(config)?)
            .await
            .map_err(|e| CrashError::io(format!("writing {}", path.display()), e))?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
