//! Asynchronous job polling.

use bpctl_core::{Error, Result, Warnings};
use reqwest::Method;
use serde::Deserialize;
use tokio::time::Instant;
use tracing::{debug, info};
use url::Url;

use crate::ControlPlaneClient;
use crate::client::ApiErrorEntry;

/// An asynchronous operation tracked by the control plane.
#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    pub guid: String,
    #[serde(default)]
    pub operation: String,
    pub state: JobState,
    #[serde(default)]
    pub errors: Vec<ApiErrorEntry>,
    #[serde(default)]
    pub warnings: Vec<JobWarning>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobWarning {
    #[serde(default)]
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Processing,
    Polling,
    Complete,
    Failed,
    /// A state this client does not know yet; polling continues.
    #[serde(other)]
    Unknown,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Complete | JobState::Failed)
    }
}

impl ControlPlaneClient {
    /// Poll `job_url` until the job reaches a terminal state.
    ///
    /// Returns the terminal job; warnings from every poll are collected in
    /// order, including the ones embedded in the job body.
    pub async fn poll_job(&self, job_url: &Url) -> (Result<Job>, Warnings) {
        let mut warnings = Warnings::new();
        let deadline = Instant::now() + self.job_timeout;

        loop {
            let request = self.request(Method::GET, job_url.clone());
            let (job, poll_warnings) = self.send_json::<Job>(request).await;
            warnings.append(poll_warnings);

            let job = match job {
                Ok(job) => job,
                Err(failure) => return (Err(failure.into()), warnings),
            };

            debug!(job = %job.guid, state = ?job.state, "Polled job");

            if job.state.is_terminal() {
                warnings.extend(job.warnings.iter().map(|w| w.detail.clone()));
                info!(job = %job.guid, operation = %job.operation, state = ?job.state, "Job finished");
                return (Ok(job), warnings);
            }

            if Instant::now() >= deadline {
                return (
                    Err(Error::Transfer(format!(
                        "timed out after {}s waiting for job {}",
                        self.job_timeout.as_secs(),
                        job.guid
                    ))),
                    warnings,
                );
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
