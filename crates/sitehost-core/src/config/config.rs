//! Configuration management
//!
//! Configuration is stored in TOML format with support for multiple named
//! profiles, one per SiteHost API key.

#[cfg(target_os = "macos")]
use directories::BaseDirs;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::credential::CredentialStore;
use super::error::{ConfigError, Result};
use crate::client::{ClientBuilder, DEFAULT_API_URL};

/// Environment variable overriding the API key
pub const ENV_API_KEY: &str = "SITEHOST_API_KEY";
/// Environment variable overriding the client id
pub const ENV_CLIENT_ID: &str = "SITEHOST_CLIENT_ID";
/// Environment variable overriding the API URL
pub const ENV_API_URL: &str = "SITEHOST_API_URL";

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Profile used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// Map of profile name -> profile configuration
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// Individual profile configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Profile {
    /// API key; plaintext or a `keyring:` reference
    pub api_key: String,
    /// SiteHost client id the key belongs to
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Profile values after keyring and environment lookups
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedProfile {
    pub api_key: String,
    pub client_id: String,
    pub api_url: String,
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for ResolvedProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedProfile")
            .field("api_key", &"<REDACTED>")
            .field("client_id", &self.client_id)
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ResolvedProfile {
    /// Read credentials from `SITEHOST_*` environment variables only
    ///
    /// Returns `None` unless both the API key and client id are set.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var(ENV_API_KEY).ok()?;
        let client_id = std::env::var(ENV_CLIENT_ID).ok()?;
        let api_url = std::env::var(ENV_API_URL).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Some(Self {
            api_key,
            client_id,
            api_url,
            timeout: None,
        })
    }

    /// Client builder preloaded with these credentials
    pub fn client_builder(&self) -> ClientBuilder {
        let builder = crate::Client::builder()
            .api_key(&self.api_key)
            .client_id(&self.client_id)
            .api_url(&self.api_url);
        match self.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
    }
}

impl Profile {
    pub fn new(api_key: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client_id: client_id.into(),
            api_url: None,
            timeout_secs: None,
        }
    }

    /// The configured API URL, or the SiteHost default
    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    /// Resolve credentials, with keyring and environment variable support
    pub fn resolve_credentials(&self) -> Result<ResolvedProfile> {
        self.resolve_with(&CredentialStore::new(), true)
    }

    /// Resolve credentials through a specific store
    ///
    /// With `use_env` false the `SITEHOST_*` variables are not consulted.
    pub fn resolve_with(&self, store: &CredentialStore, use_env: bool) -> Result<ResolvedProfile> {
        let env = |var: &'static str| use_env.then_some(var);

        let api_key = store
            .get_credential(&self.api_key, env(ENV_API_KEY))
            .map_err(|e| {
                ConfigError::CredentialError(format!("Failed to resolve API key: {}", e))
            })?;
        let client_id = store
            .get_credential(&self.client_id, env(ENV_CLIENT_ID))
            .map_err(|e| {
                ConfigError::CredentialError(format!("Failed to resolve client ID: {}", e))
            })?;
        let api_url = store
            .get_credential(self.api_url(), env(ENV_API_URL))
            .map_err(|e| {
                ConfigError::CredentialError(format!("Failed to resolve API URL: {}", e))
            })?;

        Ok(ResolvedProfile {
            api_key,
            client_id,
            api_url,
            timeout: self.timeout_secs.map(Duration::from_secs),
        })
    }
}

impl Config {
    /// Resolve the profile name to use
    ///
    /// Resolution order: explicit name, `default_profile`, then the
    /// alphabetically first profile.
    pub fn resolve_profile_name(&self, explicit_profile: Option<&str>) -> Result<String> {
        if let Some(profile_name) = explicit_profile {
            return Ok(profile_name.to_string());
        }

        if let Some(ref default) = self.default_profile {
            return Ok(default.clone());
        }

        if let Some((name, _)) = self.list_profiles().first() {
            return Ok((*name).clone());
        }

        Err(ConfigError::NoProfiles {
            suggestion: "Use 'sitehostctl profile set' to create a profile.".to_string(),
        })
    }

    /// Resolve the profile to use, failing if it does not exist
    pub fn resolve_profile(&self, explicit_profile: Option<&str>) -> Result<(String, &Profile)> {
        let name = self.resolve_profile_name(explicit_profile)?;
        let profile = self
            .profiles
            .get(&name)
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.clone() })?;
        Ok((name, profile))
    }

    /// Load configuration from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path; a missing file is an empty config
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        let expanded_content = Self::expand_env_vars(&content);
        let config: Config = toml::from_str(&expanded_content)?;

        Ok(config)
    }

    /// Save configuration to the standard location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::SaveError {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        fs::write(config_path, content).map_err(|e| ConfigError::SaveError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        Ok(())
    }

    /// Set or update a profile
    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Remove a profile by name, clearing the default if it pointed there
    pub fn remove_profile(&mut self, name: &str) -> Option<Profile> {
        if self.default_profile.as_deref() == Some(name) {
            self.default_profile = None;
        }
        self.profiles.remove(name)
    }

    /// List all profiles sorted by name
    pub fn list_profiles(&self) -> Vec<(&String, &Profile)> {
        let mut profiles: Vec<_> = self.profiles.iter().collect();
        profiles.sort_by_key(|(name, _)| *name);
        profiles
    }

    /// Get the path to the configuration file
    ///
    /// On macOS, `~/.config/sitehostctl/config.toml` is used when that file or
    /// its directory exists; otherwise the platform standard location:
    ///
    /// - Linux: `~/.config/sitehostctl/config.toml`
    /// - macOS: `~/Library/Application Support/com.sitehost.sitehostctl/config.toml`
    /// - Windows: `%APPDATA%\sitehost\sitehostctl\config\config.toml`
    pub fn config_path() -> Result<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(base_dirs) = BaseDirs::new() {
                let linux_style_path = base_dirs
                    .home_dir()
                    .join(".config")
                    .join("sitehostctl")
                    .join("config.toml");

                if linux_style_path.exists()
                    || linux_style_path.parent().is_some_and(|p| p.exists())
                {
                    return Ok(linux_style_path);
                }
            }
        }

        let proj_dirs = ProjectDirs::from("com", "sitehost", "sitehostctl")
            .ok_or(ConfigError::ConfigDirError)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Expand `${VAR}` and `${VAR:-default}` references
    ///
    /// Unset variables without a default are left as written, so profiles that
    /// are not in use do not need their variables set.
    fn expand_env_vars(content: &str) -> String {
        shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok()).to_string()
    }
}
