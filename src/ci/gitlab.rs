//! GitLab REST API client

use super::{CiProvider, Job, Pipeline};
use crate::config::schema::GitlabConfig;
use crate::error::{CrashError, CrashResult};
use crate::ui::download_bar;
use serde::de::DeserializeOwned;
use std::io::{self, Write};
use std::time::Duration;
use tracing::{debug, info};
use ureq::Agent;

const USER_AGENT: &str = concat!("crash-analyzer/", env!("CARGO_PKG_VERSION"));
const PER_PAGE: u32 = 50;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(120);

/// Blocking GitLab client scoped to one project
pub struct GitlabClient {
    agent: Agent,
    base_url: String,
    project: String,
    token: String,
    progress: bool,
}

impl GitlabClient {
    /// Create a client for `project` on the GitLab instance at `base_url`
    pub fn new(base_url: &str, project: &str, token: &str) -> Self {
        let config = Agent::config_builder()
            .user_agent(USER_AGENT)
            .timeout_connect(Some(CONNECT_TIMEOUT))
            .timeout_recv_response(Some(RESPONSE_TIMEOUT))
            .build();

        Self {
            agent: Agent::new_with_config(config),
            base_url: base_url.trim_end_matches('/').to_string(),
            project: project.to_string(),
            token: token.to_string(),
            progress: false,
        }
    }

    /// Create a client from configuration, reading the token from the
    /// configured environment variable
    pub fn from_config(config: &GitlabConfig) -> CrashResult<Self> {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| CrashError::TokenMissing(config.token_env.clone()))?;
        Ok(Self::new(&config.url, &config.project, token.trim()))
    }

    /// Draw a progress bar while downloading artifacts
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }

    fn project_url(&self, path: &str) -> String {
        format!(
            "{}/api/v4/projects/{}/{}",
            self.base_url,
            encode_segment(&self.project),
            path
        )
    }

    fn get(&self, url: &str) -> CrashResult<ureq::http::Response<ureq::Body>> {
        debug!("GET {}", url);
        Ok(self
            .agent
            .get(url)
            .header("PRIVATE-TOKEN", &self.token)
            .call()?)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> CrashResult<(T, Option<String>)> {
        let mut response = self.get(url)?;
        let next_page = response
            .headers()
            .get("x-next-page")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let body = response.body_mut().read_to_string()?;
        let value = serde_json::from_str(&body).map_err(|e| CrashError::BadResponse {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok((value, next_page))
    }
}

impl CiProvider for GitlabClient {
    fn project_id(&self) -> &str {
        &self.project
    }

    fn job(&self, job_id: &str) -> CrashResult<Job> {
        let url = self.project_url(&format!("jobs/{}", encode_segment(job_id)));
        let (job, _) = self.get_json(&url)?;
        Ok(job)
    }

    fn download_artifacts(&self, job: &Job, dest: &mut dyn Write) -> CrashResult<u64> {
        info!("Downloading artifacts for job {} ({})", job.id, job.name);
        let url = self.project_url(&format!("jobs/{}/artifacts", job.id));
        let mut response = self.get(&url)?;

        let total = response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let mut reader = response.body_mut().as_reader();
        let copied = if self.progress {
            let bar = download_bar(&job.name, total);
            let copied = io::copy(&mut reader, &mut bar.wrap_write(dest));
            bar.finish_and_clear();
            copied
        } else {
            io::copy(&mut reader, dest)
        };
        let written = copied
            .map_err(|e| CrashError::io(format!("downloading artifacts of job {}", job.id), e))?;

        debug!("Downloaded {} bytes for job {}", written, job.id);
        Ok(written)
    }

    fn pipeline(&self, pipeline_id: &str) -> CrashResult<Pipeline> {
        let url = self.project_url(&format!("pipelines/{}", encode_segment(pipeline_id)));
        let (pipeline, _) = self.get_json(&url)?;
        Ok(pipeline)
    }

    fn successful_jobs(&self, pipeline: &Pipeline) -> CrashResult<Vec<Job>> {
        let mut jobs = Vec::new();
        let mut page = "1".to_string();

        loop {
            let url = self.project_url(&format!(
                "pipelines/{}/jobs?scope[]=success&per_page={}&page={}",
                pipeline.id, PER_PAGE, page
            ));

            let (batch, next_page): (Vec<Job>, _) = self.get_json(&url)?;
            jobs.extend(batch);

            match next_page {
                Some(next) => page = next,
                None => break,
            }
        }

        debug!("Pipeline {} has {} successful jobs", pipeline.id, jobs.len());
        Ok(jobs)
    }
}

/// Percent-encode a single URL path segment
fn encode_segment(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}
