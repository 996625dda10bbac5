//! Public debug-symbol archives published per release

use crate::archive::DEBUG_ZIP_SUFFIX;
use crate::config::schema::SymbolsConfig;
use crate::error::{CrashError, CrashResult};
use std::io;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Marker identifying release-candidate versions
const PRERELEASE_MARKER: &str = "rc";

/// URL of the debug-symbol archive for `version`
///
/// Release candidates live in the beta bucket, everything else in the
/// stable bucket. The version is used verbatim.
pub fn debug_symbol_url(config: &SymbolsConfig, version: &str) -> String {
    let base = if version.contains(PRERELEASE_MARKER) {
        &config.beta_url
    } else {
        &config.stable_url
    };
    format!("{}{}{}", base, version, DEBUG_ZIP_SUFFIX)
}

/// Download `url` into a temporary file that is removed when dropped
pub fn download_to_tempfile(url: &str) -> CrashResult<NamedTempFile> {
    info!("Downloading {}", url);
    let mut response = ureq::get(url).call()?;

    let mut tmp = NamedTempFile::new()
        .map_err(|e| CrashError::io("creating temporary download file", e))?;
    let written = io::copy(&mut response.body_mut().as_reader(), tmp.as_file_mut())
        .map_err(|e| CrashError::io(format!("downloading {}", url), e))?;

    debug!("Downloaded {} bytes to {}", written, tmp.path().display());
    Ok(tmp)
}
