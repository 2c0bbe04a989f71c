//! `job` commands

use tracing::{debug, info};

use crate::cli::{JobCommands, OutputFormat};
use crate::connection::ConnectionManager;
use crate::error::{Result as CliResult, SiteHostCtlError};
use crate::output;

use super::async_utils::{format_job_state, wait_for_job_with_progress};

pub async fn handle_job_command(
    job_cmd: &JobCommands,
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    output_format: OutputFormat,
    query: Option<&str>,
) -> CliResult<()> {
    let client = conn_mgr.create_client(profile_name)?;

    match job_cmd {
        JobCommands::Get { job_id, job_type } => {
            debug!("Fetching job {} ({:?})", job_id, job_type);
            let job = client.job_info(job_id, (*job_type).into()).await;

            // A job built from an unusable reply is Failed with no data behind it
            if !job.response().is_valid() {
                return Err(SiteHostCtlError::api(
                    job.response().message(),
                    &format!("Could not read the status of job {}", job_id),
                ));
            }

            match output_format {
                OutputFormat::Auto if query.is_none() => {
                    println!("Job {}: {}", job_id, format_job_state(job.state()));
                }
                _ => {
                    let fmt =
                        output::OutputFormat::resolve(output_format, output::OutputFormat::Json);
                    output::print_output(job.response().data(), fmt, query)?;
                }
            }
            Ok(())
        }
        JobCommands::Wait {
            job_id,
            job_type,
            poll,
        } => {
            let job = wait_for_job_with_progress(
                &client,
                job_id,
                (*job_type).into(),
                poll.wait_timeout,
                poll.wait_interval,
                output_format,
                query,
            )
            .await?;
            info!("Job {} finished: {}", job_id, job.state());
            Ok(())
        }
    }
}
