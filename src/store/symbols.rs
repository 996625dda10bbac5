//! Extracted debug symbols, keyed by product version

use crate::error::CrashResult;
use crate::store::path::PathStore;
use std::path::{Path, PathBuf};
use tracing::info;

/// Sub-key holding the symbol files of a version
const SYMBOLS_DIR: &str = "symbols";

/// Path store restricted to `<version>/symbols` subtrees
#[derive(Debug, Clone)]
pub struct SymbolStore {
    store: PathStore,
}

impl SymbolStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            store: PathStore::new(root),
        }
    }

    pub fn root(&self) -> &Path {
        self.store.root()
    }

    fn key(version: &str) -> String {
        format!("{}/{}", version, SYMBOLS_DIR)
    }

    /// Fail early for versions that cannot name a symbol directory
    pub fn check_version(&self, version: &str) -> CrashResult<()> {
        self.store.path(&Self::key(version)).map(|_| ())
    }

    /// Store the contents of `src` as the symbols for `version`
    ///
    /// Re-adding a version merges over the existing tree.
    pub fn add(&self, version: &str, src: &Path) -> CrashResult<PathBuf> {
        let dst = self.store.add_directory(&Self::key(version), src)?;
        info!("Cached symbols for {} in {}", version, dst.display());
        Ok(dst)
    }

    /// Symbol directory for `version`, if it was ever populated
    pub fn get(&self, version: &str) -> Option<PathBuf> {
        self.store.get_directory(&Self::key(version))
    }

    /// All versions that have a symbol tree
    pub fn versions(&self) -> CrashResult<Vec<String>> {
        Ok(self
            .store
            .children("")?
            .into_iter()
            .filter(|version| self.get(version).is_some())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn add_and_get() {
        let temp = TempDir::new().unwrap();
        let store = SymbolStore::new(temp.path().join("symbols"));

        let src = temp.path().join("extracted");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("agent.exe.debug"), "dwarf").unwrap();

        let path = store.add("7.50.0", &src).unwrap();
        assert_eq!(
            path,
            temp.path().join("symbols").join("7.50.0").join("symbols")
        );
        assert_eq!(store.get("7.50.0"), Some(path.clone()));
        assert!(path.join("agent.exe.debug").is_file());
    }

    #[test]
    fn unknown_version_is_absent() {
        let temp = TempDir::new().unwrap();
        let store = SymbolStore::new(temp.path());
        assert!(store.get("7.51.0-rc.1").is_none());
    }

    #[test]
    fn versions_skip_incomplete_entries() {
        let temp = TempDir::new().unwrap();
        let store = SymbolStore::new(temp.path());

        let src = temp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        store.add("7.50.0", &src).unwrap();
        store.add("7.49.1", &src).unwrap();
        fs::create_dir_all(temp.path().join("7.48.0")).unwrap();

        assert_eq!(store.versions().unwrap(), vec!["7.49.1", "7.50.0"]);
    }

    #[test]
    fn version_cannot_escape_root() {
        let temp = TempDir::new().unwrap();
        let store = SymbolStore::new(temp.path().join("env").join("symbols"));

        let src = temp.path().join("extracted");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("agent.exe.debug"), "dwarf").unwrap();

        assert!(store.check_version("../../outside").is_err());
        assert!(store.add("../../outside", &src).is_err());
        assert!(store.get("../../outside").is_none());
        assert!(!temp.path().join("outside").exists());
        assert!(store.check_version("7.51.0-rc.2").is_ok());
    }
}
