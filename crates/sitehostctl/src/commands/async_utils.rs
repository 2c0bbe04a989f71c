//! `--wait` handling for commands that queue a job
//!
//! Wraps `sitehost_core::wait_for_job` with a spinner and CLI output.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;
use sitehost_core::{
    Client, Job, JobState, JobType, PollOptions, ProgressCallback, ProgressEvent, Response,
    wait_for_job,
};

use crate::cli::{AsyncOperationArgs, OutputFormat};
use crate::error::{Result as CliResult, SiteHostCtlError};
use crate::output;

/// Print the reply of a job-queuing request, optionally waiting for the job
pub async fn handle_job_response(
    client: &Client,
    response: &Response,
    async_ops: &AsyncOperationArgs,
    output_format: OutputFormat,
    query: Option<&str>,
    success_message: &str,
) -> CliResult<()> {
    if !response.is_valid() {
        return Err(SiteHostCtlError::api(
            response.message(),
            "Request was not accepted",
        ));
    }

    let job_id = super::job_id_of(response);

    if async_ops.wait && job_id.is_none() {
        warn!("--wait given but the reply carries no job_id");
        eprintln!("Note: the reply has no job id, so there is no job to wait on");
    }

    if let Some(job_id) = &job_id
        && async_ops.wait
    {
        wait_for_job_with_progress(
            client,
            job_id,
            JobType::Scheduler,
            async_ops.wait_timeout,
            async_ops.wait_interval,
            output_format,
            query,
        )
        .await?;

        if matches!(output_format, OutputFormat::Auto | OutputFormat::Table) {
            println!("{}", success_message);
        }
        return Ok(());
    }

    match output_format {
        OutputFormat::Auto | OutputFormat::Table => {
            println!("{}", success_message);
            if let Some(job_id) = job_id {
                println!("Job ID: {}", job_id);
                println!(
                    "To wait for completion, run: sitehostctl job wait {}",
                    job_id
                );
            }
        }
        OutputFormat::Json | OutputFormat::Yaml => {
            let fmt = output::OutputFormat::resolve(output_format, output::OutputFormat::Json);
            output::print_output(response.data(), fmt, query)?;
        }
    }

    Ok(())
}

/// Poll a job behind a spinner and print the final job
pub async fn wait_for_job_with_progress(
    client: &Client,
    job_id: &str,
    job_type: JobType,
    timeout_secs: u64,
    interval_secs: u64,
    output_format: OutputFormat,
    query: Option<&str>,
) -> CliResult<Job> {
    let options = PollOptions::new(
        Duration::from_secs(timeout_secs),
        Duration::from_secs(interval_secs),
    );

    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed_precise}]")
    {
        pb.set_style(style);
    }
    pb.set_message(format!("Waiting for job {}", job_id));
    pb.enable_steady_tick(Duration::from_millis(120));

    let pb_clone = pb.clone();
    let progress_callback: ProgressCallback = Box::new(move |event| match &event {
        ProgressEvent::Started { job_id } => {
            pb_clone.set_message(format!("Job {} started", job_id));
        }
        ProgressEvent::Polling { job_id, state, .. } => {
            pb_clone.set_message(format!("Job {}: {}", job_id, format_job_state(state)));
        }
        ProgressEvent::Completed { job_id } => {
            pb_clone.finish_with_message(format!(
                "Job {}: {}",
                job_id,
                format_job_state(&JobState::Completed)
            ));
        }
        ProgressEvent::Failed { job_id, error } => {
            pb_clone.finish_with_message(format!(
                "Job {}: {} ({})",
                job_id,
                format_job_state(&JobState::Failed),
                error
            ));
        }
    });

    match wait_for_job(client, job_id, job_type, &options, Some(progress_callback)).await {
        Ok(job) => {
            if matches!(output_format, OutputFormat::Json | OutputFormat::Yaml) {
                let fmt = output::OutputFormat::resolve(output_format, output::OutputFormat::Json);
                output::print_output(job.response().data(), fmt, query)?;
            }
            Ok(job)
        }
        Err(e) => {
            if !pb.is_finished() {
                pb.finish_with_message(format!("Job {} did not finish", job_id));
            }
            Err(e.into())
        }
    }
}

/// Format job state for display with status icons
pub fn format_job_state(state: &JobState) -> String {
    match state {
        JobState::Completed => format!("\u{2713} {}", state),
        JobState::Failed => format!("\u{2717} {}", state),
        JobState::Running => format!("\u{21bb} {}", state),
        JobState::Pending => format!("\u{2026} {}", state),
        JobState::Other(label) if label.is_empty() => "unknown".to_string(),
        JobState::Other(label) => label.clone(),
    }
}
