//! `api` commands

use tracing::debug;

use crate::cli::{ApiCommands, OutputFormat};
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;

pub async fn handle_api_command(
    api_cmd: &ApiCommands,
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    output_format: OutputFormat,
    query: Option<&str>,
) -> CliResult<()> {
    let client = conn_mgr.create_client(profile_name)?;

    match api_cmd {
        ApiCommands::Info => {
            debug!("Fetching API key info");
            let response = client.api_info().await;
            super::print_response(&response, output_format, query, "Could not read API key info")
        }
    }
}
