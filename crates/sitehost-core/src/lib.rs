//! # sitehost-core
//!
//! Client library for the SiteHost control API.
//!
//! ## Layers
//!
//! - [`Response`] - the `{status, msg, return}` envelope every endpoint
//!   answers with, decoded fail-closed: anything unusable becomes the invalid
//!   envelope instead of an error
//! - [`Job`] - one-shot snapshot of an asynchronous job
//! - [`compose`] - docker-compose vhosts list editing for domain aliases
//! - [`Client`] - one method per endpoint, all infallible
//! - [`progress`] and [`workflows`] - job polling and multi-step operations
//!   built on the client
//! - [`config`] - named profiles stored as TOML
//!
//! ## Example
//!
//! ```rust,ignore
//! use sitehost_core::{Client, JobType, PollOptions, wait_for_job};
//!
//! let client = Client::builder()
//!     .api_key("0123456789abcdef")
//!     .client_id("12345")
//!     .build()?;
//!
//! let reply = client.restart_stack("ch-myserver", "abc123def456ab12", None).await;
//! if let Some(job_id) = reply.data_str("job_id") {
//!     let job = wait_for_job(&client, job_id, JobType::Scheduler, &PollOptions::default(), None).await?;
//!     println!("{}", job.state());
//! }
//! ```

pub mod client;
pub mod compose;
pub mod config;
pub mod error;
pub mod job;
pub mod progress;
pub mod response;
pub mod transport;
pub mod workflows;

pub use client::{Client, ClientBuilder, DEFAULT_API_URL, StackUpdate, endpoints};
pub use compose::{AliasOutcome, add_stack_alias, decode_compose_file, encode_compose_file};
pub use config::{Config, ConfigError, CredentialStore, Profile, ResolvedProfile};
pub use error::{CoreError, Result};
pub use job::{Job, JobState, JobType};
pub use progress::{PollOptions, ProgressCallback, ProgressEvent, wait_for_job};
pub use response::Response;
pub use transport::{ApiRequest, HttpTransport, Method, RawResponse, Transport, TransportError};
pub use workflows::{AliasUpdate, add_alias_to_stack};
