//! Configuration and profile management
//!
//! - Multiple named profiles, one per SiteHost client account
//! - Secure credential storage using the OS keyring (optional)
//! - Environment variable expansion in config files
//! - Platform-specific config file locations

// Allow nested config module - this is intentional for the config subsystem
#![allow(clippy::module_inception)]

pub mod config;
pub mod credential;
pub mod error;

pub use config::{Config, Profile, ResolvedProfile};
pub use credential::{CredentialStorage, CredentialStore};
pub use error::{ConfigError, Result};
