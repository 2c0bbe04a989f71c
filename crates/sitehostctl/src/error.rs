//! Error types for sitehostctl

use colored::Colorize;
use sitehost_core::{ConfigError, CoreError};
use thiserror::Error;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// Produces structured output like:
/// ```text
/// error: Profile 'prod' not found
///
///   tip: List available profiles: sitehostctl profile list
/// ```
pub struct CliDiagnostic {
    message: String,
    tips: Vec<String>,
}

impl CliDiagnostic {
    /// Start a new error diagnostic with the given message.
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            tips: Vec::new(),
        }
    }

    pub fn tip(mut self, description: &str) -> Self {
        self.tips.push(description.to_string());
        self
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        for description in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", description);
        }
    }
}

/// Main error type for the sitehostctl application
#[derive(Error, Debug)]
pub enum SiteHostCtlError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("No profile configured. Use 'sitehostctl profile set' to configure a profile.")]
    NoProfileConfigured,

    /// The API answered with an unusable envelope
    #[error("API error: {message}")]
    ApiError { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("File error for '{path}': {message}")]
    FileError { path: String, message: String },

    #[error("Timeout: {message}")]
    Timeout { message: String },

    #[error("Job failed: {message}")]
    JobFailed { message: String },

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

/// Result type for sitehostctl operations
pub type Result<T> = std::result::Result<T, SiteHostCtlError>;

impl SiteHostCtlError {
    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            SiteHostCtlError::ProfileNotFound { name } => vec![
                "List available profiles: sitehostctl profile list".to_string(),
                format!(
                    "Create profile '{}': sitehostctl profile set {} --api-key <key> --client-id <id>",
                    name, name
                ),
            ],
            SiteHostCtlError::NoProfileConfigured => vec![
                "Create a profile: sitehostctl profile set prod --api-key <key> --client-id <id>"
                    .to_string(),
                "Or set SITEHOST_API_KEY and SITEHOST_CLIENT_ID".to_string(),
            ],
            SiteHostCtlError::ApiError { .. } => vec![
                "Check the API key and client id: sitehostctl api info".to_string(),
                "Verify the server and stack names in the control panel URL".to_string(),
            ],
            SiteHostCtlError::InvalidInput { .. } => {
                vec!["Check the command syntax: sitehostctl <command> --help".to_string()]
            }
            SiteHostCtlError::FileError { path, .. } => vec![
                format!("Check that file exists: {}", path),
                "Verify file permissions are correct".to_string(),
            ],
            SiteHostCtlError::Timeout { .. } => vec![
                "Raise the limit with --wait-timeout".to_string(),
                "Check progress later with: sitehostctl job get <job-id>".to_string(),
            ],
            _ => vec![],
        }
    }

    /// Print a cargo-style diagnostic to stderr using colored formatting.
    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&self.to_string());

        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion);
        }

        diag.print();
    }

    /// Error for an invalid envelope, using the server message when there is one
    pub fn api(message: &str, fallback: &str) -> Self {
        let message = if message.is_empty() { fallback } else { message };
        SiteHostCtlError::ApiError {
            message: message.to_string(),
        }
    }
}

impl From<serde_json::Error> for SiteHostCtlError {
    fn from(err: serde_json::Error) -> Self {
        SiteHostCtlError::OutputError {
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<anyhow::Error> for SiteHostCtlError {
    fn from(err: anyhow::Error) -> Self {
        SiteHostCtlError::OutputError {
            message: format!("{:#}", err),
        }
    }
}

impl From<ConfigError> for SiteHostCtlError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name } => SiteHostCtlError::ProfileNotFound { name },
            ConfigError::NoProfiles { .. } => SiteHostCtlError::NoProfileConfigured,
            other => SiteHostCtlError::Configuration(other.to_string()),
        }
    }
}

impl From<CoreError> for SiteHostCtlError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::JobTimeout(duration) => SiteHostCtlError::Timeout {
                message: format!("Job did not finish within {} seconds", duration.as_secs()),
            },
            CoreError::JobFailed(message) => SiteHostCtlError::JobFailed { message },
            CoreError::Config(config_err) => config_err.into(),
            CoreError::Compose(yaml_err) => SiteHostCtlError::InvalidInput {
                message: format!("Compose file is not valid YAML: {}", yaml_err),
            },
            CoreError::Http(message) => SiteHostCtlError::Configuration(message),
        }
    }
}
