//! Command implementations

pub mod api;
pub mod async_utils;
pub mod job;
pub mod profile;
pub mod stack;

use serde_json::Value;
use sitehost_core::Response;

use crate::cli::OutputFormat;
use crate::error::{Result as CliResult, SiteHostCtlError};
use crate::output;

/// Print the payload of a valid reply, or fail with the server message
pub fn print_response(
    response: &Response,
    output_format: OutputFormat,
    query: Option<&str>,
    failure: &str,
) -> CliResult<()> {
    if !response.is_valid() {
        return Err(SiteHostCtlError::api(response.message(), failure));
    }

    let fmt = output::OutputFormat::resolve(output_format, output::OutputFormat::Json);
    output::print_output(response.data(), fmt, query)?;
    Ok(())
}

/// Job id carried by an update or restart reply
///
/// The API sends it as a string or a number depending on the endpoint.
pub fn job_id_of(response: &Response) -> Option<String> {
    match response.data_item("job_id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Read `@path` arguments from disk; anything else is used as given
pub fn read_text_arg(value: &str) -> CliResult<String> {
    match value.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).map_err(|e| SiteHostCtlError::FileError {
            path: path.to_string(),
            message: e.to_string(),
        }),
        None => Ok(value.to_string()),
    }
}
