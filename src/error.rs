//! Error types for crash-analyzer
//!
//! All modules use `CrashResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for crash-analyzer operations
pub type CrashResult<T> = Result<T, CrashError>;

/// All errors that can occur in crash-analyzer
#[derive(Error, Debug)]
pub enum CrashError {
    // Resolution errors
    #[error("Package job '{name}' not found in pipeline {pipeline}")]
    PackageJobNotFound { name: String, pipeline: String },

    #[error("No .debug.zip archive found in artifacts of job {job}")]
    DebugArchiveNotFound { job: String },

    #[error("No dump files found in artifacts of job {0}")]
    NoDumpFiles(String),

    #[error("No symbol files found in {0}")]
    NoSymbolFiles(PathBuf),

    #[error("Symbol file is not part of this session: {0}")]
    SymbolNotInSession(PathBuf),

    #[error("Invalid cache key: {0:?}")]
    InvalidKey(String),

    #[error("Job {job} has no artifacts")]
    NoArtifacts { job: String },

    // CI provider errors
    #[error("GitLab token not set. Export {0} with a personal access token")]
    TokenMissing(String),

    #[error("Unexpected response from {url}: {reason}")]
    BadResponse { url: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Transport and archive errors pass through untouched
    #[error(transparent)]
    Http(#[from] ureq::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl CrashError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Whether the error means something could not be found, as opposed to
    /// a transport or filesystem failure
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PackageJobNotFound { .. }
                | Self::DebugArchiveNotFound { .. }
                | Self::NoDumpFiles(_)
                | Self::NoSymbolFiles(_)
                | Self::NoArtifacts { .. }
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::PackageJobNotFound { .. } => {
                Some("Check the pipeline finished packaging, or pass --package-job")
            }
            Self::TokenMissing(_) => Some("Create a token with read_api scope in GitLab"),
            Self::DebugArchiveNotFound { .. } => {
                Some("Fetch symbols by release instead: crash-analyzer symbols --release <VERSION>")
            }
            Self::InvalidKey(_) => {
                Some("Job ids and versions cannot contain '.' or '..' path segments")
            }
            _ => None,
        }
    }
}
