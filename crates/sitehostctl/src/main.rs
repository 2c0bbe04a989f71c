use clap::{CommandFactory, Parser};
use clap_complete::{generate, shells};
use sitehost_core::Config;
use tracing::{debug, error, info, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod connection;
mod error;
mod output;

use cli::{Cli, Commands};
use connection::ConnectionManager;
use error::SiteHostCtlError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level
    init_tracing(cli.verbose);

    let conn_mgr = match load_connection_manager(cli.config_file.as_deref()) {
        Ok(conn_mgr) => conn_mgr,
        Err(e) => {
            e.print_diagnostic();
            std::process::exit(1);
        }
    };

    if let Err(e) = execute_command(&cli, &conn_mgr).await {
        e.print_diagnostic();
        std::process::exit(1);
    }
}

/// Load configuration from the given path or the default location
fn load_connection_manager(config_file: Option<&str>) -> Result<ConnectionManager, SiteHostCtlError> {
    let (config, config_path) = if let Some(config_file) = config_file {
        let path = std::path::PathBuf::from(config_file);
        debug!("Loading config from explicit path: {:?}", path);
        let config = Config::load_from_path(&path)?;
        (config, Some(path))
    } else {
        debug!("Loading config from default location");
        (Config::load()?, None)
    };
    debug!(
        "Creating ConnectionManager with config_path: {:?}",
        config_path
    );
    Ok(ConnectionManager::with_config_path(config, config_path))
}

fn init_tracing(verbose: u8) {
    // RUST_LOG wins over the verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "sitehostctl=warn,sitehost_core=warn",
            1 => "sitehostctl=info,sitehost_core=info",
            2 => "sitehostctl=debug,sitehost_core=debug",
            _ => "sitehostctl=trace,sitehost_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

async fn execute_command(cli: &Cli, conn_mgr: &ConnectionManager) -> Result<(), SiteHostCtlError> {
    trace!("Executing command: {:?}", cli.command);
    info!("Command: {}", format_command(&cli.command));

    let profile = cli.profile.as_deref();
    let query = cli.query.as_deref();

    let start = std::time::Instant::now();
    let result = match &cli.command {
        Commands::Version => {
            debug!("Showing version information");
            match cli.output {
                cli::OutputFormat::Json | cli::OutputFormat::Yaml => {
                    let output_data = serde_json::json!({
                        "version": env!("CARGO_PKG_VERSION"),
                        "name": env!("CARGO_PKG_NAME"),
                    });
                    let fmt =
                        output::OutputFormat::resolve(cli.output, output::OutputFormat::Json);
                    output::print_output(&output_data, fmt, None)?;
                }
                _ => {
                    println!("sitehostctl {}", env!("CARGO_PKG_VERSION"));
                }
            }
            Ok(())
        }
        Commands::Completions { shell } => {
            debug!("Generating completions for {:?}", shell);
            generate_completions(*shell);
            Ok(())
        }
        Commands::Profile(profile_cmd) => {
            debug!("Executing profile command");
            commands::profile::handle_profile_command(profile_cmd, conn_mgr, cli.output).await
        }
        Commands::Api(api_cmd) => {
            commands::api::handle_api_command(api_cmd, conn_mgr, profile, cli.output, query).await
        }
        Commands::Job(job_cmd) => {
            commands::job::handle_job_command(job_cmd, conn_mgr, profile, cli.output, query).await
        }
        Commands::Stack(stack_cmd) => {
            commands::stack::handle_stack_command(stack_cmd, conn_mgr, profile, cli.output, query)
                .await
        }
    };

    let duration = start.elapsed();
    match &result {
        Ok(_) => info!("Command completed successfully in {:?}", duration),
        Err(e) => error!("Command failed after {:?}: {}", duration, e),
    }

    result
}

/// Generate shell completions
fn generate_completions(shell: cli::Shell) {
    let mut cmd = cli::Cli::command();
    let name = cmd.get_name().to_string();

    match shell {
        cli::Shell::Bash => generate(shells::Bash, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Zsh => generate(shells::Zsh, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Fish => generate(shells::Fish, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::PowerShell => {
            generate(shells::PowerShell, &mut cmd, name, &mut std::io::stdout())
        }
        cli::Shell::Elvish => generate(shells::Elvish, &mut cmd, name, &mut std::io::stdout()),
    }
}

/// Format command for human-readable logging (without sensitive data)
fn format_command(command: &Commands) -> String {
    match command {
        Commands::Version => "version".to_string(),
        Commands::Completions { shell } => format!("completions {:?}", shell),
        Commands::Profile(cmd) => {
            use cli::ProfileCommands::*;
            match cmd {
                List => "profile list".to_string(),
                Path => "profile path".to_string(),
                Show { name } => format!("profile show {}", name),
                Set { name, .. } => format!("profile set {} [credentials redacted]", name),
                Remove { name } => format!("profile remove {}", name),
                Default { name } => format!("profile default {}", name),
            }
        }
        Commands::Api(cmd) => format!("api {:?}", cmd),
        Commands::Job(cmd) => format!("job {:?}", cmd),
        Commands::Stack(cmd) => {
            use cli::StackCommands::*;
            match cmd {
                Get { server, stack } => format!("stack get {} {}", server, stack),
                Compose { server, stack } => format!("stack compose {} {}", server, stack),
                Update { server, stack, .. } => format!("stack update {} {}", server, stack),
                Restart { server, stack, .. } => format!("stack restart {} {}", server, stack),
                AddAlias {
                    server,
                    stack,
                    alias,
                    ..
                } => format!("stack add-alias {} {} {}", server, stack, alias),
            }
        }
    }
}
