//! Cached CI job artifacts and their text metadata

use crate::error::{CrashError, CrashResult};
use crate::store::path::PathStore;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Sub-key holding the raw artifact tree of a job
const ARTIFACTS_DIR: &str = "artifacts";

/// Small text values stored next to a job's artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    /// Product version the job's symbols belong to
    Version,
    /// Pipeline the job ran in
    Pipeline,
    /// CI project the job belongs to
    Project,
}

impl TextField {
    /// Name of the backing file
    fn file_name(&self) -> &'static str {
        match self {
            Self::Version => "version.txt",
            Self::Pipeline => "pipeline.txt",
            Self::Project => "project.txt",
        }
    }
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Version => "version",
            Self::Pipeline => "pipeline",
            Self::Project => "project",
        };
        write!(f, "{}", name)
    }
}

/// Escape a key component so it cannot introduce a path separator
fn escape_component(s: &str) -> String {
    s.replace('%', "%25").replace('/', "%2F")
}

/// Inverse of [`escape_component`]
fn unescape_component(s: &str) -> String {
    s.replace("%2F", "/").replace("%25", "%")
}

/// View over one job's cached artifacts
///
/// Text fields are read from disk at most once per handle; setters write
/// through before updating the in-memory copy.
#[derive(Debug)]
pub struct Artifacts {
    store: PathStore,
    project: String,
    job: String,
    cached: HashMap<TextField, Option<String>>,
}

impl Artifacts {
    fn new(project: &str, job: &str, store: PathStore) -> Self {
        Self {
            store,
            project: project.to_string(),
            job: job.to_string(),
            cached: HashMap::new(),
        }
    }

    /// Store key for a (project, job) pair
    pub fn make_key(project: &str, job: &str) -> String {
        format!("{}/{}", escape_component(project), escape_component(job))
    }

    pub fn key(&self) -> String {
        Self::make_key(&self.project, &self.job)
    }

    pub fn project_id(&self) -> &str {
        &self.project
    }

    pub fn job_id(&self) -> &str {
        &self.job
    }

    fn artifacts_key(&self) -> String {
        format!("{}/{}", self.key(), ARTIFACTS_DIR)
    }

    /// Raw artifact tree, if it has been downloaded
    pub fn get(&self) -> Option<PathBuf> {
        self.store.get_directory(&self.artifacts_key())
    }

    /// Merge the files under `path` into the raw artifact tree
    pub fn add(&self, path: &Path) -> CrashResult<PathBuf> {
        self.store.add_directory(&self.artifacts_key(), path)
    }

    /// Read a text field, loading it from disk on first access
    pub fn text(&mut self, field: TextField) -> CrashResult<Option<String>> {
        if let Some(value) = self.cached.get(&field) {
            return Ok(value.clone());
        }

        let key = format!("{}/{}", self.key(), field.file_name());
        let value = self
            .store
            .get(&key)?
            .map(|data| String::from_utf8_lossy(&data).trim().to_string())
            .filter(|value| !value.is_empty());

        // Absent values are not cached so a later write through another
        // handle for the same job is still picked up.
        if value.is_some() {
            self.cached.insert(field, value.clone());
        }
        Ok(value)
    }

    /// Write a text field through to disk
    pub fn set_text(&mut self, field: TextField, value: &str) -> CrashResult<()> {
        let key = format!("{}/{}", self.key(), field.file_name());
        self.store.add(&key, value.as_bytes())?;
        debug!("Set {} of {} to {}", field, self.key(), value);
        self.cached.insert(field, Some(value.to_string()));
        Ok(())
    }

    pub fn version(&mut self) -> CrashResult<Option<String>> {
        self.text(TextField::Version)
    }

    pub fn set_version(&mut self, value: &str) -> CrashResult<()> {
        self.set_text(TextField::Version, value)
    }

    pub fn pipeline(&mut self) -> CrashResult<Option<String>> {
        self.text(TextField::Pipeline)
    }

    pub fn set_pipeline(&mut self, value: &str) -> CrashResult<()> {
        self.set_text(TextField::Pipeline, value)
    }

    pub fn project(&mut self) -> CrashResult<Option<String>> {
        self.text(TextField::Project)
    }

    pub fn set_project(&mut self, value: &str) -> CrashResult<()> {
        self.set_text(TextField::Project, value)
    }
}

/// Registry of [`Artifacts`] handles keyed by (project, job)
///
/// There is no index: a job is known when its directory exists.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    store: PathStore,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            store: PathStore::new(root),
        }
    }

    pub fn root(&self) -> &Path {
        self.store.root()
    }

    /// Create (or reopen) the handle for a job, copying in `artifacts_path`
    /// when given
    pub fn add(
        &self,
        project_id: &str,
        job_id: &str,
        artifacts_path: Option<&Path>,
    ) -> CrashResult<Artifacts> {
        let artifacts = Artifacts::new(project_id, job_id, self.store.clone());

        let dir = self.store.path(&artifacts.key())?;
        fs::create_dir_all(&dir)
            .map_err(|e| CrashError::io(format!("creating {}", dir.display()), e))?;

        if let Some(path) = artifacts_path {
            let dst = artifacts.add(path)?;
            info!("Stored artifacts of job {} in {}", job_id, dst.display());
        }
        Ok(artifacts)
    }

    /// Handle for a job that was added before, or `None`
    pub fn get(&self, project_id: &str, job_id: &str) -> Option<Artifacts> {
        let key = Artifacts::make_key(project_id, job_id);
        self.store
            .get_directory(&key)
            .map(|_| Artifacts::new(project_id, job_id, self.store.clone()))
    }

    /// Every (project, job) pair present in the store
    pub fn list(&self) -> CrashResult<Vec<(String, String)>> {
        let mut jobs = Vec::new();
        for project in self.store.children("")? {
            for job in self.store.children(&project)? {
                jobs.push((unescape_component(&project), unescape_component(&job)));
            }
        }
        Ok(jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (ArtifactStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp.path().join("artifacts"));
        (store, temp)
    }

    #[test]
    fn key_format() {
        assert_eq!(Artifacts::make_key("datadog-agent", "123"), "datadog-agent/123");
    }

    #[test]
    fn key_escapes_separator() {
        let namespaced = Artifacts::make_key("DataDog/datadog-agent", "1");
        let nested = Artifacts::make_key("DataDog", "datadog-agent/1");
        assert_eq!(namespaced, "DataDog%2Fdatadog-agent/1");
        assert_ne!(namespaced, nested);
        assert_ne!(
            Artifacts::make_key("a%2Fb", "1"),
            Artifacts::make_key("a/b", "1")
        );
    }

    #[test]
    fn get_absent_until_added() {
        let (store, _temp) = store();
        assert!(store.get("datadog-agent", "1").is_none());

        store.add("datadog-agent", "1", None).unwrap();
        assert!(store.get("datadog-agent", "1").is_some());
        assert!(store.get("datadog-agent", "2").is_none());
    }

    #[test]
    fn add_with_artifacts() {
        let (store, temp) = store();
        let src = temp.path().join("download");
        fs::create_dir_all(src.join("crash")).unwrap();
        fs::write(src.join("crash").join("agent.dmp"), "MDMP").unwrap();

        let artifacts = store.add("datadog-agent", "1", Some(&src)).unwrap();
        let tree = artifacts.get().unwrap();
        assert_eq!(
            tree,
            temp.path()
                .join("artifacts")
                .join("datadog-agent")
                .join("1")
                .join("artifacts")
        );
        assert!(tree.join("crash").join("agent.dmp").is_file());
    }

    #[test]
    fn add_without_artifacts_has_no_tree() {
        let (store, _temp) = store();
        let artifacts = store.add("datadog-agent", "1", None).unwrap();
        assert!(artifacts.get().is_none());
    }

    #[test]
    fn text_fields_persist() {
        let (store, temp) = store();
        let mut artifacts = store.add("datadog-agent", "1", None).unwrap();
        assert!(artifacts.version().unwrap().is_none());

        artifacts.set_version("agent-7.50.0").unwrap();
        artifacts.set_pipeline("9000").unwrap();
        artifacts.set_project("DataDog/datadog-agent").unwrap();
        assert_eq!(artifacts.version().unwrap().as_deref(), Some("agent-7.50.0"));

        let on_disk = temp
            .path()
            .join("artifacts")
            .join("datadog-agent")
            .join("1")
            .join("version.txt");
        assert_eq!(fs::read_to_string(on_disk).unwrap(), "agent-7.50.0");

        let mut reopened = store.get("datadog-agent", "1").unwrap();
        assert_eq!(reopened.version().unwrap().as_deref(), Some("agent-7.50.0"));
        assert_eq!(reopened.pipeline().unwrap().as_deref(), Some("9000"));
        assert_eq!(
            reopened.project().unwrap().as_deref(),
            Some("DataDog/datadog-agent")
        );
    }

    #[test]
    fn text_fields_trimmed() {
        let (store, temp) = store();
        let mut artifacts = store.add("p", "1", None).unwrap();
        fs::write(
            temp.path().join("artifacts").join("p").join("1").join("pipeline.txt"),
            "  42\n",
        )
        .unwrap();
        assert_eq!(artifacts.pipeline().unwrap().as_deref(), Some("42"));
    }

    #[test]
    fn loaded_value_is_cached() {
        let (store, temp) = store();
        let mut artifacts = store.add("p", "1", None).unwrap();
        artifacts.set_version("1.0.0").unwrap();

        let file = temp.path().join("artifacts").join("p").join("1").join("version.txt");
        fs::remove_file(file).unwrap();
        assert_eq!(artifacts.version().unwrap().as_deref(), Some("1.0.0"));
    }

    #[test]
    fn empty_file_reads_as_absent() {
        let (store, temp) = store();
        let mut artifacts = store.add("p", "1", None).unwrap();
        fs::write(
            temp.path().join("artifacts").join("p").join("1").join("version.txt"),
            "\n",
        )
        .unwrap();
        assert!(artifacts.version().unwrap().is_none());
    }

    #[test]
    fn list_unescapes_keys() {
        let (store, _temp) = store();
        store.add("DataDog/datadog-agent", "7", None).unwrap();
        store.add("datadog-agent", "3", None).unwrap();

        let jobs = store.list().unwrap();
        assert_eq!(
            jobs,
            vec![
                ("DataDog/datadog-agent".to_string(), "7".to_string()),
                ("datadog-agent".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn failed_write_keeps_previous_value() {
        let (store, temp) = store();
        let mut artifacts = store.add("p", "1", None).unwrap();
        artifacts.set_version("agent-7.50.0").unwrap();

        // A directory where the text file should be makes the write fail
        let file = temp.path().join("artifacts").join("p").join("1").join("version.txt");
        fs::remove_file(&file).unwrap();
        fs::create_dir_all(file.join("blocker")).unwrap();

        assert!(artifacts.set_version("agent-7.51.0").is_err());
        assert_eq!(artifacts.version().unwrap().as_deref(), Some("agent-7.50.0"));
    }

    #[test]
    fn dot_job_id_is_rejected() {
        let (store, _temp) = store();
        assert!(matches!(
            store.add("datadog-agent", "..", None),
            Err(CrashError::InvalidKey(_))
        ));
        assert!(store.get("datadog-agent", "..").is_none());
        assert!(store.get("datadog-agent", ".").is_none());
    }
}
