//! Debugging session state
//!
//! A session owns the cache environment (artifact and symbol stores), the
//! CI project jobs are resolved against, and the dump and symbol file the
//! operator picked for the debuggers.

use crate::archive::find_symbol_files;
use crate::ci::CiProvider;
use crate::error::{CrashError, CrashResult};
use crate::store::{ArtifactStore, SymbolStore};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// State for one interactive debugging session
pub struct Session {
    env: PathBuf,
    artifact_store: ArtifactStore,
    symbol_store: SymbolStore,
    project: Option<Box<dyn CiProvider>>,
    active_dump: Option<PathBuf>,
    symbol_files: Vec<PathBuf>,
    active_symbol: Option<PathBuf>,
    // Keeps a throwaway environment alive for the session's lifetime
    _scratch: Option<TempDir>,
}

impl Session {
    /// Open a session over the cache environment at `env`
    pub fn new(env: impl Into<PathBuf>) -> Self {
        let env = env.into();
        debug!("Using environment {}", env.display());
        Self {
            artifact_store: ArtifactStore::new(env.join("artifacts")),
            symbol_store: SymbolStore::new(env.join("symbols")),
            env,
            project: None,
            active_dump: None,
            symbol_files: Vec::new(),
            active_symbol: None,
            _scratch: None,
        }
    }

    /// Open a session over a fresh environment deleted when the session ends
    pub fn temporary() -> CrashResult<Self> {
        let scratch = tempfile::Builder::new()
            .prefix("crash-analyzer-")
            .tempdir()
            .map_err(|e| CrashError::io("creating temporary environment", e))?;
        let mut session = Self::new(scratch.path());
        session._scratch = Some(scratch);
        Ok(session)
    }

    /// Root of the cache environment
    pub fn env(&self) -> &Path {
        &self.env
    }

    pub fn artifact_store(&self) -> &ArtifactStore {
        &self.artifact_store
    }

    pub fn symbol_store(&self) -> &SymbolStore {
        &self.symbol_store
    }

    /// Use `project` for all CI lookups in this session
    pub fn select_project(&mut self, project: Box<dyn CiProvider>) {
        debug!("Selected project {}", project.project_id());
        self.project = Some(project);
    }

    /// The selected CI project
    pub fn project(&self) -> CrashResult<&dyn CiProvider> {
        self.project
            .as_deref()
            .ok_or_else(|| CrashError::Internal("no CI project selected".to_string()))
    }

    pub fn select_dump(&mut self, path: impl Into<PathBuf>) {
        self.active_dump = Some(path.into());
    }

    pub fn active_dump(&self) -> Option<&Path> {
        self.active_dump.as_deref()
    }

    /// Scan a symbol directory, making its files selectable
    pub fn load_symbols(&mut self, dir: &Path) -> CrashResult<&[PathBuf]> {
        let files = find_symbol_files(dir);
        if files.is_empty() {
            return Err(CrashError::NoSymbolFiles(dir.to_path_buf()));
        }
        self.symbol_files = files;
        self.active_symbol = None;
        Ok(&self.symbol_files)
    }

    pub fn symbol_files(&self) -> &[PathBuf] {
        &self.symbol_files
    }

    /// Pick one of the loaded symbol files
    pub fn select_symbol(&mut self, path: impl Into<PathBuf>) -> CrashResult<()> {
        let path = path.into();
        if !self.symbol_files.contains(&path) {
            return Err(CrashError::SymbolNotInSession(path));
        }
        self.active_symbol = Some(path);
        Ok(())
    }

    pub fn active_symbol(&self) -> Option<&Path> {
        self.active_symbol.as_deref()
    }
}
