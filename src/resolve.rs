//! Artifact and symbol resolution for CI jobs
//!
//! Maps a job to the debug symbols of the build it tested:
//!
//! 1. If the job's cached artifacts already record a version whose symbols
//!    are cached, use them without talking to the CI provider.
//! 2. Otherwise find the package job of the job's pipeline, fetch (or
//!    reuse) its artifacts and take the version from the name of its
//!    `.debug.zip` archive. The version is recorded on both jobs.
//! 3. Extract the archive's `.exe.debug` files into the symbol store.

use crate::archive::{extract_all, extract_symbols, find_debug_zips, version_from_debug_zip};
use crate::ci::{CiProvider, Job};
use crate::config::schema::SymbolsConfig;
use crate::error::{CrashError, CrashResult};
use crate::remote::{debug_symbol_url, download_to_tempfile};
use crate::session::Session;
use crate::store::Artifacts;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};
use tracing::{debug, info};

/// Debug archive found in a package job's artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugArchive {
    /// Product version taken from the archive name
    pub version: String,
    /// Location of the archive inside the cached artifacts
    pub path: PathBuf,
    /// Package job that produced it
    pub package_job: String,
}

/// Resolves artifacts and symbols against a session's cache
pub struct Resolver<'a> {
    session: &'a Session,
    package_job: &'a str,
}

impl<'a> Resolver<'a> {
    /// `package_job` is the name of the pipeline job building the debug
    /// archive
    pub fn new(session: &'a Session, package_job: &'a str) -> Self {
        Self {
            session,
            package_job,
        }
    }

    fn ci(&self) -> CrashResult<&'a dyn CiProvider> {
        self.session.project()
    }

    /// Cached artifacts of a job, downloading them on first use
    pub fn get_or_fetch_artifacts(&self, job_id: &str) -> CrashResult<Artifacts> {
        let ci = self.ci()?;
        let store = self.session.artifact_store();

        if let Some(artifacts) = store.get(ci.project_id(), job_id) {
            if artifacts.get().is_some() {
                debug!("Reusing cached artifacts of job {}", job_id);
                return Ok(artifacts);
            }
        }

        self.fetch_artifacts(ci, job_id)
    }

    fn fetch_artifacts(&self, ci: &dyn CiProvider, job_id: &str) -> CrashResult<Artifacts> {
        let job = ci.job(job_id)?;

        let mut archive = NamedTempFile::new()
            .map_err(|e| CrashError::io("creating temporary artifact archive", e))?;
        ci.download_artifacts(&job, archive.as_file_mut())?;

        let extracted =
            TempDir::new().map_err(|e| CrashError::io("creating extraction directory", e))?;
        extract_all(archive.path(), extracted.path())?;

        let mut artifacts = self.session.artifact_store().add(
            ci.project_id(),
            job_id,
            Some(extracted.path()),
        )?;
        artifacts.set_pipeline(&job.pipeline.id.to_string())?;
        artifacts.set_project(ci.project_id())?;
        Ok(artifacts)
    }

    /// Package job in the same pipeline as `job_id`
    ///
    /// Picks the first successful job whose name matches exactly.
    pub fn find_package_job(&self, job_id: &str) -> CrashResult<Job> {
        let ci = self.ci()?;
        let job = ci.job(job_id)?;
        let pipeline = ci.pipeline(&job.pipeline.id.to_string())?;

        ci.successful_jobs(&pipeline)?
            .into_iter()
            .find(|candidate| candidate.name == self.package_job)
            .ok_or_else(|| CrashError::PackageJobNotFound {
                name: self.package_job.to_string(),
                pipeline: pipeline.id.to_string(),
            })
    }

    /// Locate the debug archive built for `job_id`'s pipeline and record
    /// its version on the package job and on `job_id`
    pub fn locate_debug_archive(&self, job_id: &str) -> CrashResult<DebugArchive> {
        let ci = self.ci()?;
        let package_job = self.find_package_job(job_id)?;
        let package_job_id = package_job.id.to_string();
        info!("Using package job {} ({})", package_job_id, package_job.name);

        let mut package_artifacts = self.get_or_fetch_artifacts(&package_job_id)?;
        let tree = package_artifacts.get().ok_or_else(|| CrashError::NoArtifacts {
            job: package_job_id.clone(),
        })?;

        let (path, version) = find_debug_zips(&tree)
            .into_iter()
            .find_map(|zip| version_from_debug_zip(&zip).map(|version| (zip, version)))
            .ok_or_else(|| CrashError::DebugArchiveNotFound {
                job: package_job_id.clone(),
            })?;
        debug!("Found debug archive {}", path.display());

        let pipeline = package_job.pipeline.id.to_string();
        package_artifacts.set_version(&version)?;
        package_artifacts.set_pipeline(&pipeline)?;

        let store = self.session.artifact_store();
        let mut artifacts = match store.get(ci.project_id(), job_id) {
            Some(artifacts) => artifacts,
            None => store.add(ci.project_id(), job_id, None)?,
        };
        artifacts.set_version(&version)?;
        artifacts.set_pipeline(&pipeline)?;
        artifacts.set_project(ci.project_id())?;

        Ok(DebugArchive {
            version,
            path,
            package_job: package_job_id,
        })
    }

    /// Symbol directory for the build tested by `job_id`
    pub fn symbols_for_job(&self, job_id: &str) -> CrashResult<PathBuf> {
        let ci = self.ci()?;
        let symbol_store = self.session.symbol_store();

        let cached_version = match self.session.artifact_store().get(ci.project_id(), job_id) {
            Some(mut artifacts) => artifacts.version()?,
            None => None,
        };
        if let Some(version) = cached_version {
            if let Some(symbols) = symbol_store.get(&version) {
                debug!("Job {} maps to cached symbols for {}", job_id, version);
                return Ok(symbols);
            }
            info!("Symbols for {} are not cached, locating the debug archive", version);
        }

        let archive = self.locate_debug_archive(job_id)?;
        if let Some(symbols) = symbol_store.get(&archive.version) {
            return Ok(symbols);
        }
        store_symbols_from_archive(self.session, &archive.version, &archive.path)
    }
}

/// Extract the symbols of a debug archive into the session's symbol store
pub fn store_symbols_from_archive(
    session: &Session,
    version: &str,
    zip_path: &Path,
) -> CrashResult<PathBuf> {
    let extracted =
        TempDir::new().map_err(|e| CrashError::io("creating extraction directory", e))?;
    let files = extract_symbols(zip_path, extracted.path())?;
    info!("Extracted {} symbol files for {}", files.len(), version);
    session.symbol_store().add(version, extracted.path())
}

/// Symbol directory for a released version, downloading the public archive
/// when it is not cached yet
pub fn symbols_for_version(
    session: &Session,
    config: &SymbolsConfig,
    version: &str,
) -> CrashResult<PathBuf> {
    if let Some(symbols) = session.symbol_store().get(version) {
        debug!("Symbols for {} already cached", version);
        return Ok(symbols);
    }

    session.symbol_store().check_version(version)?;
    let url = debug_symbol_url(config, version);
    let archive = download_to_tempfile(&url)?;
    store_symbols_from_archive(session, version, archive.path())
}
