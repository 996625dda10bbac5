//! Slash-keyed blob and directory store on the local filesystem

use crate::error::{CrashError, CrashResult};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;
use walkdir::WalkDir;

/// Name prefix of in-progress directory copies
const STAGING_PREFIX: &str = ".staging-";

/// Maps string keys to files or directory subtrees under a root directory
#[derive(Debug, Clone)]
pub struct PathStore {
    root: PathBuf,
}

impl PathStore {
    /// Create a store rooted at `root` (created lazily on first write)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location a key maps to. Does not touch the filesystem.
    ///
    /// Segments that would leave the root (`.`, `..`, anything containing
    /// a backslash) are rejected.
    pub fn path(&self, key: &str) -> CrashResult<PathBuf> {
        let mut path = self.root.clone();
        for part in key.split('/').filter(|part| !part.is_empty()) {
            if part == "." || part == ".." || part.contains('\\') {
                return Err(CrashError::InvalidKey(key.to_string()));
            }
            path.push(part);
        }
        Ok(path)
    }

    /// Store a blob at `key`, replacing any previous blob
    ///
    /// The data is written to a temporary sibling and renamed into place,
    /// so readers see either the old blob or the new one.
    pub fn add(&self, key: &str, data: &[u8]) -> CrashResult<()> {
        let file_path = self.path(key)?;
        let parent = file_path
            .parent()
            .ok_or_else(|| CrashError::Internal(format!("invalid store key: {key:?}")))?;
        fs::create_dir_all(parent)
            .map_err(|e| CrashError::io(format!("creating {}", parent.display()), e))?;

        let mut tmp = NamedTempFile::new_in(parent)
            .map_err(|e| CrashError::io(format!("creating temp file in {}", parent.display()), e))?;
        tmp.write_all(data)
            .map_err(|e| CrashError::io(format!("writing {}", file_path.display()), e))?;
        tmp.persist(&file_path)
            .map_err(|e| CrashError::io(format!("replacing {}", file_path.display()), e.error))?;

        debug!("Stored {} bytes at {}", data.len(), key);
        Ok(())
    }

    /// Read the blob at `key`, or `None` if nothing was stored there
    pub fn get(&self, key: &str) -> CrashResult<Option<Vec<u8>>> {
        let file_path = self.path(key)?;
        match fs::read(&file_path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CrashError::io(format!("reading {}", file_path.display()), e)),
        }
    }

    /// Recursively copy `src` into the subtree at `key`
    ///
    /// The copy is staged in a hidden sibling directory first, so a failed
    /// or interrupted copy never leaves a partial subtree at `key`. A new
    /// subtree is renamed into place whole; an existing one is merged file
    /// by file, overwriting colliding relative paths.
    pub fn add_directory(&self, key: &str, src: &Path) -> CrashResult<PathBuf> {
        let dst = self.path(key)?;
        let parent = dst
            .parent()
            .ok_or_else(|| CrashError::InvalidKey(key.to_string()))?;
        fs::create_dir_all(parent)
            .map_err(|e| CrashError::io(format!("creating {}", parent.display()), e))?;

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(parent)
            .map_err(|e| CrashError::io(format!("creating staging dir in {}", parent.display()), e))?;
        copy_tree(src, staging.path())?;

        if dst.is_dir() {
            merge_tree(staging.path(), &dst)?;
        } else {
            fs::rename(staging.path(), &dst).map_err(|e| {
                CrashError::io(format!("moving staged tree to {}", dst.display()), e)
            })?;
        }
        debug!("Copied {} into {}", src.display(), key);
        Ok(dst)
    }

    /// Root of the subtree at `key`, or `None` if it does not exist
    ///
    /// Invalid keys never name a stored subtree and read as absent.
    pub fn get_directory(&self, key: &str) -> Option<PathBuf> {
        let dir_path = self.path(key).ok()?;
        dir_path.is_dir().then_some(dir_path)
    }

    /// Immediate child directory names of the subtree at `key`, sorted
    pub fn children(&self, key: &str) -> CrashResult<Vec<String>> {
        let Some(dir) = self.get_directory(key) else {
            return Ok(Vec::new());
        };

        let entries =
            fs::read_dir(&dir).map_err(|e| CrashError::io(format!("listing {}", dir.display()), e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CrashError::io(format!("listing {}", dir.display()), e))?;
            let name = entry.file_name();
            if entry.path().is_dir() && !name.to_string_lossy().starts_with(STAGING_PREFIX) {
                names.push(name.to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Copy every file below `src` to the same relative location below `dst`
fn copy_tree(src: &Path, dst: &Path) -> CrashResult<()> {
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(|e| walk_error(src, e))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| CrashError::Internal(e.to_string()))?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .map_err(|e| CrashError::io(format!("creating {}", target.display()), e))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| CrashError::io(format!("creating {}", parent.display()), e))?;
            }
            fs::copy(entry.path(), &target).map_err(|e| {
                CrashError::io(
                    format!("copying {} to {}", entry.path().display(), target.display()),
                    e,
                )
            })?;
        }
    }
    Ok(())
}

/// Move every file below `staged` to the same relative location below `dst`
fn merge_tree(staged: &Path, dst: &Path) -> CrashResult<()> {
    for entry in WalkDir::new(staged).min_depth(1) {
        let entry = entry.map_err(|e| walk_error(staged, e))?;
        let rel = entry
            .path()
            .strip_prefix(staged)
            .map_err(|e| CrashError::Internal(e.to_string()))?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .map_err(|e| CrashError::io(format!("creating {}", target.display()), e))?;
        } else {
            fs::rename(entry.path(), &target)
                .map_err(|e| CrashError::io(format!("replacing {}", target.display()), e))?;
        }
    }
    Ok(())
}

fn walk_error(root: &Path, e: walkdir::Error) -> CrashError {
    let context = format!("walking {}", root.display());
    match e.into_io_error() {
        Some(source) => CrashError::io(context, source),
        None => CrashError::Internal(context),
    }
}
