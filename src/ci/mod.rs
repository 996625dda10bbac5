//! CI provider abstraction
//!
//! The resolution logic only needs four operations from the CI system:
//! look up a job, stream its artifact archive, look up a pipeline, and
//! list a pipeline's successful jobs. [`GitlabClient`] implements them over the
//! GitLab REST API.

mod gitlab;

pub use gitlab::GitlabClient;

use crate::error::CrashResult;
use serde::Deserialize;
use std::io::Write;

/// Reference to the pipeline a job ran in
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PipelineRef {
    pub id: u64,
}

/// A CI job
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Job {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub status: String,
    pub pipeline: PipelineRef,
}

/// A CI pipeline
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Pipeline {
    pub id: u64,
    #[serde(default)]
    pub status: String,
}

/// Operations the cache needs from a CI system
pub trait CiProvider: Send + Sync {
    /// Identifier of the project jobs are looked up in
    fn project_id(&self) -> &str;

    /// Fetch a job's metadata
    fn job(&self, job_id: &str) -> CrashResult<Job>;

    /// Stream a job's artifact archive into `dest`
    fn download_artifacts(&self, job: &Job, dest: &mut dyn Write) -> CrashResult<u64>;

    /// Fetch a pipeline
    fn pipeline(&self, pipeline_id: &str) -> CrashResult<Pipeline>;

    /// List a pipeline's successful jobs, in the order the provider
    /// returns them
    fn successful_jobs(&self, pipeline: &Pipeline) -> CrashResult<Vec<Job>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_deserializes_from_gitlab_json() {
        let json = r#"{
            "id": 123,
            "name": "windows_msi_and_bosh_zip_x64-a7",
            "status": "success",
            "stage": "package_build",
            "pipeline": {"id": 456, "ref": "main"}
        }"#;
        let job: Job = serde_json::from_str(json).unwrap();
        assert_eq!(job.id, 123);
        assert_eq!(job.pipeline.id, 456);
        assert_eq!(job.status, "success");
    }
}
