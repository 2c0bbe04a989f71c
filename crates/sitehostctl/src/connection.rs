//! Connection management: turns profiles into API clients

use crate::error::{Result as CliResult, SiteHostCtlError};
use sitehost_core::{Client, Config, CredentialStore, ResolvedProfile};
use std::path::PathBuf;
use tracing::{debug, info, trace};

/// Connection manager for creating authenticated clients
#[derive(Clone)]
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

impl ConnectionManager {
    /// Create a connection manager with an optional custom config path
    pub fn with_config_path(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Path of the config file in use
    pub fn config_file(&self) -> CliResult<PathBuf> {
        match &self.config_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Config::config_path()?),
        }
    }

    /// Save the configuration to the appropriate location
    pub fn save_config(&self) -> CliResult<()> {
        let path = self.config_file()?;
        debug!("Saving configuration to {:?}", path);
        self.config.save_to_path(&path)?;
        Ok(())
    }

    /// Resolve credentials for `profile_name`
    ///
    /// Complete `SITEHOST_API_KEY` / `SITEHOST_CLIENT_ID` environment
    /// credentials win over the profile, unless `--config-file` was given:
    /// an explicit config file is used in isolation.
    pub fn resolve_credentials(&self, profile_name: Option<&str>) -> CliResult<ResolvedProfile> {
        trace!("Profile name: {:?}", profile_name);

        let use_env_vars = self.config_path.is_none();
        if !use_env_vars {
            info!("--config-file specified explicitly, ignoring environment variables");
        } else if profile_name.is_none()
            && let Some(resolved) = ResolvedProfile::from_env()
        {
            info!("Using SiteHost credentials from environment variables");
            return Ok(resolved);
        }

        let (name, profile) = self.config.resolve_profile(profile_name)?;
        info!("Using profile: {}", name);

        Ok(profile.resolve_with(&CredentialStore::new(), use_env_vars)?)
    }

    /// Create an API client from profile credentials
    pub fn create_client(&self, profile_name: Option<&str>) -> CliResult<Client> {
        let resolved = self.resolve_credentials(profile_name)?;

        info!("Connecting to SiteHost API: {}", resolved.api_url);
        debug!("Client ID: {}", resolved.client_id);

        resolved.client_builder().build().map_err(|e| {
            SiteHostCtlError::Configuration(format!("Failed to create API client: {}", e))
        })
    }
}
