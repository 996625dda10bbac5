//! Configuration schema for crash-analyzer
//!
//! Configuration is stored at `~/.config/crash-analyzer/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// GitLab connection settings
    pub gitlab: GitlabConfig,

    /// Package job lookup settings
    pub resolve: ResolveConfig,

    /// Public debug-symbol buckets
    pub symbols: SymbolsConfig,

    /// External debugger commands
    pub debuggers: DebuggersConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Cache environment root (defaults to `~/.agent-crash-analyzer`)
    pub env_dir: Option<PathBuf>,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            env_dir: None,
            log_format: "text".to_string(),
        }
    }
}

/// GitLab settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitlabConfig {
    /// Base URL of the GitLab instance
    pub url: String,

    /// Project path or numeric id
    pub project: String,

    /// Environment variable holding the API token
    pub token_env: String,
}

impl Default for GitlabConfig {
    fn default() -> Self {
        Self {
            url: "https://gitlab.ddbuild.io".to_string(),
            project: "DataDog/datadog-agent".to_string(),
            token_env: "GITLAB_TOKEN".to_string(),
        }
    }
}

/// Resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Name of the pipeline job that builds the debug-symbol archive
    pub package_job: String,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            package_job: "windows_msi_and_bosh_zip_x64-a7".to_string(),
        }
    }
}

/// Public symbol bucket settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolsConfig {
    /// URL prefix for release builds
    pub stable_url: String,

    /// URL prefix for release candidates
    pub beta_url: String,
}

impl Default for SymbolsConfig {
    fn default() -> Self {
        Self {
            stable_url: "https://s3.amazonaws.com/ddagent-windows-stable/ddagent-cli-".to_string(),
            beta_url: "https://s3.amazonaws.com/dd-agent-mstesting/builds/beta/ddagent-cli-"
                .to_string(),
        }
    }
}

/// Debugger command lines; the dump (and symbol file) are appended
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebuggersConfig {
    /// Opens the dump in WinDbg, followed by the dump path
    pub windbg: Vec<String>,

    /// Delve core-dump command, followed by symbol and dump paths
    pub delve: Vec<String>,
}

impl Default for DebuggersConfig {
    fn default() -> Self {
        Self {
            windbg: vec![
                "cmd.exe".to_string(),
                "/c".to_string(),
                "start".to_string(),
                String::new(),
            ],
            delve: vec!["dlv.exe".to_string(), "core".to_string()],
        }
    }
}
