//! CLI command implementations

pub mod cache;
pub mod completions;
pub mod config;
pub mod debug;
pub mod dump;
pub mod symbols;

pub use cache::execute as cache;
pub use completions::execute as completions;
pub use config::execute as config;
pub use debug::execute as debug;
pub use dump::execute as dump;
pub use symbols::execute as symbols;

use crate::ci::GitlabClient;
use crate::config::{Config, ConfigManager};
use crate::error::{CrashError, CrashResult};
use crate::session::Session;
use crate::ui::UiContext;
use std::path::PathBuf;

/// Settings shared by every command, resolved from flags and config
pub struct CommandContext {
    pub config: Config,
    pub env_dir: PathBuf,
    pub temp_env: bool,
    pub package_job: String,
    pub ui: UiContext,
}

impl CommandContext {
    pub fn new(
        config: Config,
        env_dir: Option<PathBuf>,
        temp_env: bool,
        package_job: Option<String>,
    ) -> Self {
        let env_dir = ConfigManager::env_dir(&config, env_dir.as_deref());
        let package_job = package_job.unwrap_or_else(|| config.resolve.package_job.clone());
        Self {
            config,
            env_dir,
            temp_env,
            package_job,
            ui: UiContext::detect(),
        }
    }

    /// Session over the cache environment, without a CI project
    pub fn session(&self) -> CrashResult<Session> {
        if self.temp_env {
            Session::temporary()
        } else {
            Ok(Session::new(&self.env_dir))
        }
    }

    /// Session with the configured GitLab project selected
    pub fn session_with_project(&self) -> CrashResult<Session> {
        let client =
            GitlabClient::from_config(&self.config.gitlab)?.with_progress(self.ui.use_fancy_output());
        let mut session = self.session()?;
        session.select_project(Box::new(client));
        Ok(session)
    }
}

/// Run synchronous cache and network work off the async runtime
pub async fn blocking<T, F>(work: F) -> CrashResult<T>
where
    F: FnOnce() -> CrashResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| CrashError::Internal(format!("background task failed: {}", e)))?
}
