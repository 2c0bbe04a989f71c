//! Profile management command implementations

use crate::cli::{OutputFormat, ProfileCommands};
use crate::connection::ConnectionManager;
use crate::error::{Result as CliResult, SiteHostCtlError};
use crate::output;
use colored::Colorize;
use sitehost_core::{CredentialStore, Profile};
use tracing::{debug, info, trace};

/// Handle profile management commands
pub async fn handle_profile_command(
    profile_cmd: &ProfileCommands,
    conn_mgr: &ConnectionManager,
    output_format: OutputFormat,
) -> CliResult<()> {
    use ProfileCommands::*;

    match profile_cmd {
        List => handle_list(conn_mgr, output_format),
        Path => handle_path(conn_mgr, output_format),
        Show { name } => handle_show(conn_mgr, name, output_format),
        Set {
            name,
            api_key,
            client_id,
            api_url,
            timeout_secs,
            default,
            #[cfg(feature = "secure-storage")]
            use_keyring,
        } => {
            #[cfg(feature = "secure-storage")]
            let store = if *use_keyring {
                CredentialStore::new()
            } else {
                CredentialStore::plaintext()
            };
            #[cfg(not(feature = "secure-storage"))]
            let store = CredentialStore::plaintext();

            let mut profile = Profile::new(store.store_credential(name, api_key)?, client_id);
            profile.api_url = api_url.clone();
            profile.timeout_secs = *timeout_secs;

            handle_set(conn_mgr, name, profile, *default)
        }
        Remove { name } => handle_remove(conn_mgr, name),
        Default { name } => handle_default(conn_mgr, name),
    }
}

fn structured_format(output_format: OutputFormat) -> Option<output::OutputFormat> {
    match output_format {
        OutputFormat::Json => Some(output::OutputFormat::Json),
        OutputFormat::Yaml => Some(output::OutputFormat::Yaml),
        _ => None,
    }
}

/// API keys are shown masked unless they only point into the keyring
fn display_api_key(api_key: &str) -> String {
    if CredentialStore::is_keyring_reference(api_key) {
        return api_key.to_string();
    }
    let visible: String = api_key.chars().take(4).collect();
    if api_key.chars().count() > 4 {
        format!("{}****", visible)
    } else {
        "****".to_string()
    }
}

fn handle_list(conn_mgr: &ConnectionManager, output_format: OutputFormat) -> CliResult<()> {
    debug!("Listing all configured profiles");
    let profiles = conn_mgr.config.list_profiles();
    trace!("Found {} profiles", profiles.len());
    let default_name = conn_mgr.config.default_profile.as_deref();
    let config_path = conn_mgr.config_file().ok();

    if let Some(fmt) = structured_format(output_format) {
        let profile_list: Vec<serde_json::Value> = profiles
            .iter()
            .map(|(name, profile)| {
                serde_json::json!({
                    "name": name,
                    "client_id": profile.client_id,
                    "api_url": profile.api_url(),
                    "is_default": default_name == Some(name.as_str()),
                })
            })
            .collect();

        let output_data = serde_json::json!({
            "config_path": config_path.map(|p| p.to_string_lossy().to_string()),
            "profiles": profile_list,
            "count": profiles.len()
        });
        output::print_output(&output_data, fmt, None)?;
        return Ok(());
    }

    if let Some(path) = config_path {
        println!("Configuration file: {}", path.display());
        println!();
    }

    if profiles.is_empty() {
        info!("No profiles configured");
        println!("No profiles configured.");
        println!("Use 'sitehostctl profile set' to create a profile.");
        return Ok(());
    }

    println!("{}", "Profiles".bold());
    for (name, profile) in profiles {
        let line = format!("{} (client {})", name, profile.client_id);
        if default_name == Some(name.as_str()) {
            println!("  {} {}", line.green(), "*".green().bold());
        } else {
            println!("  {}", line);
        }
    }
    Ok(())
}

fn handle_path(conn_mgr: &ConnectionManager, output_format: OutputFormat) -> CliResult<()> {
    let config_path = conn_mgr.config_file()?;

    match structured_format(output_format) {
        Some(fmt) => {
            let output_data = serde_json::json!({
                "config_path": config_path.to_str()
            });
            output::print_output(&output_data, fmt, None)?;
        }
        None => println!("{}", config_path.display()),
    }
    Ok(())
}

fn handle_show(
    conn_mgr: &ConnectionManager,
    name: &str,
    output_format: OutputFormat,
) -> CliResult<()> {
    debug!("Showing profile: {}", name);
    let profile = conn_mgr
        .config
        .profiles
        .get(name)
        .ok_or_else(|| SiteHostCtlError::ProfileNotFound { name: name.into() })?;
    let is_default = conn_mgr.config.default_profile.as_deref() == Some(name);

    if let Some(fmt) = structured_format(output_format) {
        let output_data = serde_json::json!({
            "name": name,
            "api_key": display_api_key(&profile.api_key),
            "client_id": profile.client_id,
            "api_url": profile.api_url(),
            "timeout_secs": profile.timeout_secs,
            "is_default": is_default,
        });
        output::print_output(&output_data, fmt, None)?;
        return Ok(());
    }

    println!("Profile: {}", name.bold());
    println!("API Key: {}", display_api_key(&profile.api_key));
    println!("Client ID: {}", profile.client_id);
    println!("API URL: {}", profile.api_url());
    if let Some(timeout) = profile.timeout_secs {
        println!("Timeout: {}s", timeout);
    }
    if is_default {
        println!("Default: {}", "yes".green());
    }
    Ok(())
}

fn handle_set(
    conn_mgr: &ConnectionManager,
    name: &str,
    profile: Profile,
    make_default: bool,
) -> CliResult<()> {
    debug!("Setting profile: {}", name);

    let mut config = conn_mgr.config.clone();
    let existed = config.profiles.contains_key(name);
    config.set_profile(name.to_string(), profile);

    // The first profile becomes the default.
    if make_default || config.default_profile.is_none() {
        config.default_profile = Some(name.to_string());
    }

    save(conn_mgr, config)?;

    if existed {
        println!("Profile '{}' updated successfully.", name);
    } else {
        println!("Profile '{}' created successfully.", name);
    }
    if make_default {
        println!("Set as default profile.");
    }
    Ok(())
}

fn handle_remove(conn_mgr: &ConnectionManager, name: &str) -> CliResult<()> {
    debug!("Removing profile: {}", name);

    let mut config = conn_mgr.config.clone();
    let was_default = config.default_profile.as_deref() == Some(name);
    let removed = config
        .remove_profile(name)
        .ok_or_else(|| SiteHostCtlError::ProfileNotFound { name: name.into() })?;

    if let Some(key) = removed.api_key.strip_prefix("keyring:")
        && let Err(e) = CredentialStore::new().delete_credential(key)
    {
        debug!("Could not delete keyring entry for {}: {}", name, e);
    }

    save(conn_mgr, config)?;

    println!("Profile '{}' removed successfully.", name);
    if was_default {
        println!("Default profile cleared.");
    }
    Ok(())
}

fn handle_default(conn_mgr: &ConnectionManager, name: &str) -> CliResult<()> {
    debug!("Setting default profile: {}", name);

    if !conn_mgr.config.profiles.contains_key(name) {
        return Err(SiteHostCtlError::ProfileNotFound { name: name.into() });
    }

    let mut config = conn_mgr.config.clone();
    config.default_profile = Some(name.to_string());
    save(conn_mgr, config)?;

    println!("Default profile set to '{}'.", name);
    Ok(())
}

fn save(conn_mgr: &ConnectionManager, config: sitehost_core::Config) -> CliResult<()> {
    ConnectionManager::with_config_path(config, conn_mgr.config_path.clone()).save_config()
}
