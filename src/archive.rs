//! Zip extraction and artifact file discovery

use crate::error::{CrashError, CrashResult};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;
use zip::ZipArchive;

/// Suffix of the debug-symbol archive produced by the package job
pub const DEBUG_ZIP_SUFFIX: &str = ".debug.zip";

/// Suffix of executable debug-symbol files inside that archive
pub const SYMBOL_SUFFIX: &str = ".exe.debug";

/// Suffix of Windows crash dumps
pub const DUMP_SUFFIX: &str = ".dmp";

/// Extract every entry of `zip_path` into `dest`, keeping the stored paths
pub fn extract_all(zip_path: &Path, dest: &Path) -> CrashResult<()> {
    let file = File::open(zip_path)
        .map_err(|e| CrashError::io(format!("opening {}", zip_path.display()), e))?;
    let mut archive = ZipArchive::new(file)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(enclosed) = entry.enclosed_name().map(|p| dest.join(p)) else {
            debug!("Skipping unsafe entry {}", entry.name());
            continue;
        };
        if entry.name().ends_with('/') || entry.is_dir() {
            fs::create_dir_all(&enclosed)
                .map_err(|e| CrashError::io(format!("creating {}", enclosed.display()), e))?;
            continue;
        }
        write_entry(&mut entry, &enclosed)?;
    }

    debug!("Extracted {} entries from {}", archive.len(), zip_path.display());
    Ok(())
}

/// Extract the `.exe.debug` files of `zip_path` into `dest`
///
/// Archive directories are dropped: `a/b/agent.exe.debug` lands at
/// `dest/agent.exe.debug`. Returns the extracted paths.
pub fn extract_symbols(zip_path: &Path, dest: &Path) -> CrashResult<Vec<PathBuf>> {
    let file = File::open(zip_path)
        .map_err(|e| CrashError::io(format!("opening {}", zip_path.display()), e))?;
    let mut archive = ZipArchive::new(file)?;
    let mut extracted = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() || !entry.name().ends_with(SYMBOL_SUFFIX) {
            continue;
        }
        let Some(name) = entry
            .enclosed_name()
            .and_then(|p| p.file_name())
            .map(|n| n.to_owned())
        else {
            continue;
        };

        let target = dest.join(name);
        write_entry(&mut entry, &target)?;
        debug!("Extracted {} to {}", entry.name(), target.display());
        extracted.push(target);
    }

    Ok(extracted)
}

fn write_entry(entry: &mut impl io::Read, target: &Path) -> CrashResult<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| CrashError::io(format!("creating {}", parent.display()), e))?;
    }
    let mut outfile = File::create(target)
        .map_err(|e| CrashError::io(format!("creating {}", target.display()), e))?;
    io::copy(entry, &mut outfile)
        .map_err(|e| CrashError::io(format!("writing {}", target.display()), e))?;
    Ok(())
}

/// All files below `dir` whose name ends with `suffix`, sorted
pub fn find_files(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(suffix))
        .map(|entry| entry.into_path())
        .collect();
    found.sort();
    found
}

/// Crash dumps in an artifact tree
pub fn find_dump_files(dir: &Path) -> Vec<PathBuf> {
    find_files(dir, DUMP_SUFFIX)
}

/// Debug-symbol archives in an artifact tree
pub fn find_debug_zips(dir: &Path) -> Vec<PathBuf> {
    find_files(dir, DEBUG_ZIP_SUFFIX)
}

/// Executable debug-symbol files in a symbol tree
pub fn find_symbol_files(dir: &Path) -> Vec<PathBuf> {
    find_files(dir, SYMBOL_SUFFIX)
}

/// Product version encoded in a debug archive name
///
/// `agent-7.50.0.debug.zip` -> `agent-7.50.0`. Returns `None` when the file
/// name does not carry the suffix.
pub fn version_from_debug_zip(path: &Path) -> Option<String> {
    path.file_name()?
        .to_str()?
        .strip_suffix(DEBUG_ZIP_SUFFIX)
        .filter(|version| !version.is_empty())
        .map(str::to_string)
}
