//! Error types for sitehost-core
//!
//! Request failures never show up here: the client folds them into an invalid
//! [`Response`](crate::Response). These errors cover what sits around the
//! requests, such as compose file encoding, client construction, configuration
//! and the job poller.
//!
//! # Example
//!
//! ```rust
//! use sitehost_core::CoreError;
//! use std::time::Duration;
//!
//! let err = CoreError::JobTimeout(Duration::from_secs(60));
//! assert!(err.is_timeout());
//! assert!(err.to_string().contains("timed out"));
//! ```

use std::time::Duration;
use thiserror::Error;

use crate::config::ConfigError;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// The compose file could not be parsed or emitted
    #[error("Compose file error: {0}")]
    Compose(#[from] serde_yaml::Error),

    /// The HTTP transport could not be built
    #[error("HTTP client error: {0}")]
    Http(String),

    /// Job did not reach a terminal state in time
    #[error("Job timed out after {0:?}")]
    JobTimeout(Duration),

    /// Job finished in the failed state
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Returns true if this is a timeout error
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, CoreError::JobTimeout(_))
    }

    /// Returns true if the job itself reported failure
    #[must_use]
    pub fn is_job_failure(&self) -> bool {
        matches!(self, CoreError::JobFailed(_))
    }
}
