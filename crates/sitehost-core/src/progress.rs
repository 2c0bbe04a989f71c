//! Progress tracking and job polling
//!
//! Stack updates and restarts answer with a job id. [`wait_for_job`] fetches
//! the job until it reaches a terminal state, with an optional callback for
//! UI updates (the CLI drives a spinner from it).

use std::time::{Duration, Instant};

use tracing::debug;

use crate::client::Client;
use crate::error::{CoreError, Result};
use crate::job::{Job, JobState, JobType};

/// Default time to wait for a job
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(300);

/// Default time between polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Polling limits for [`wait_for_job`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_POLL_TIMEOUT,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl PollOptions {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }
}

/// Progress events emitted while waiting on a job
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Polling has started
    Started { job_id: String },
    /// One poll came back with a non-terminal state
    Polling {
        job_id: String,
        state: JobState,
        elapsed: Duration,
    },
    /// Job completed
    Completed { job_id: String },
    /// Job failed, or its status could not be read
    Failed { job_id: String, error: String },
}

/// Callback type for progress updates
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Poll a job until it completes or fails
///
/// A request that gets no usable reply derives [`JobState::Failed`], so an
/// unreachable API ends the wait with [`CoreError::JobFailed`] instead of
/// spinning until the timeout. Unknown states keep the loop going.
///
/// # Example
///
/// ```rust,ignore
/// use sitehost_core::{JobType, PollOptions, ProgressEvent, wait_for_job};
///
/// let job = wait_for_job(
///     &client,
///     "54321",
///     JobType::Scheduler,
///     &PollOptions::default(),
///     Some(Box::new(|event| {
///         if let ProgressEvent::Polling { state, elapsed, .. } = event {
///             println!("{} ({}s)", state, elapsed.as_secs());
///         }
///     })),
/// )
/// .await?;
/// ```
pub async fn wait_for_job(
    client: &Client,
    job_id: &str,
    job_type: JobType,
    options: &PollOptions,
    on_progress: Option<ProgressCallback>,
) -> Result<Job> {
    let start = Instant::now();

    emit(
        &on_progress,
        ProgressEvent::Started {
            job_id: job_id.to_string(),
        },
    );

    loop {
        let elapsed = start.elapsed();
        if elapsed > options.timeout {
            return Err(CoreError::JobTimeout(options.timeout));
        }

        let job = client.job_info(job_id, job_type).await;
        debug!(job_id, state = %job.state(), "polled job");

        match job.state() {
            JobState::Completed => {
                emit(
                    &on_progress,
                    ProgressEvent::Completed {
                        job_id: job_id.to_string(),
                    },
                );
                return Ok(job);
            }
            JobState::Failed => {
                let error = failure_message(job_id, &job);
                emit(
                    &on_progress,
                    ProgressEvent::Failed {
                        job_id: job_id.to_string(),
                        error: error.clone(),
                    },
                );
                return Err(CoreError::JobFailed(error));
            }
            state => {
                emit(
                    &on_progress,
                    ProgressEvent::Polling {
                        job_id: job_id.to_string(),
                        state: state.clone(),
                        elapsed,
                    },
                );
                tokio::time::sleep(options.interval).await;
            }
        }
    }
}

fn failure_message(job_id: &str, job: &Job) -> String {
    let message = job.response().message();
    if message.is_empty() {
        format!("Job {} failed", job_id)
    } else {
        message.to_string()
    }
}

/// Helper to emit progress events
fn emit(callback: &Option<ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}
