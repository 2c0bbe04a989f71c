//! CLI structure and command definitions

use clap::{Args, Parser, Subcommand};
use sitehost_core::JobType;

/// SiteHost control API CLI
#[derive(Parser, Debug)]
#[command(name = "sitehostctl")]
#[command(version, about = "Command line client for the SiteHost control API")]
#[command(long_about = "
Command line client for the SiteHost control API

EXAMPLES:
    # Set up a profile
    sitehostctl profile set prod --api-key KEY --client-id 12345

    # Show a stack
    sitehostctl stack get ch-myserver abc123def456ab12

    # Add a domain alias and wait for the stack to redeploy
    sitehostctl stack add-alias ch-myserver abc123def456ab12 www.example.com --wait

    # Filter output with JMESPath
    sitehostctl stack get ch-myserver abc123def456ab12 -q 'containers[].name'

For more help on a specific command, run:
    sitehostctl <command> --help
")]
pub struct Cli {
    /// Profile to use for this command
    #[arg(long, short, global = true, env = "SITEHOSTCTL_PROFILE")]
    pub profile: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, global = true, env = "SITEHOSTCTL_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "auto")]
    pub output: OutputFormat,

    /// JMESPath query to filter output
    #[arg(long, short = 'q', global = true)]
    pub query: Option<String>,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Automatically choose format based on command and context
    Auto,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Human-readable table format
    Table,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// API key information
    #[command(subcommand)]
    Api(ApiCommands),

    /// Asynchronous job status
    #[command(subcommand)]
    #[command(after_help = "EXAMPLES:
    # Show a job
    sitehostctl job get 54321

    # Wait for a daemon job, polling every 2 seconds
    sitehostctl job wait 54321 --type daemon --wait-interval 2
")]
    Job(JobCommands),

    /// Cloud stack operations
    #[command(subcommand)]
    #[command(after_help = "EXAMPLES:
    # Stack details
    sitehostctl stack get ch-myserver abc123def456ab12

    # Print the compose file
    sitehostctl stack compose ch-myserver abc123def456ab12

    # Replace the compose file from disk
    sitehostctl stack update ch-myserver abc123def456ab12 --docker-compose @docker-compose.yml --wait

    # Restart one container
    sitehostctl stack restart ch-myserver abc123def456ab12 --container abc123def456ab12-web
")]
    Stack(StackCommands),

    /// Profile management
    #[command(subcommand, visible_alias = "prof", visible_alias = "pr")]
    #[command(after_help = "EXAMPLES:
    # Create a profile
    sitehostctl profile set prod --api-key KEY --client-id 12345

    # List all profiles
    sitehostctl profile list

    # Set the default profile
    sitehostctl profile default prod
")]
    Profile(ProfileCommands),

    /// Version information
    #[command(visible_alias = "ver", visible_alias = "v")]
    Version,

    /// Generate shell completions
    #[command(visible_alias = "comp")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion generation
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bourne Again Shell
    Bash,
    /// Z Shell
    Zsh,
    /// Friendly Interactive Shell
    Fish,
    /// PowerShell
    #[value(name = "powershell", alias = "power-shell")]
    PowerShell,
    /// Elvish
    Elvish,
}

/// API key commands
#[derive(Subcommand, Debug)]
pub enum ApiCommands {
    /// Show the client id and roles of the configured API key
    Info,
}

/// Job queue selector
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum JobTypeArg {
    #[default]
    Scheduler,
    Daemon,
}

impl From<JobTypeArg> for JobType {
    fn from(arg: JobTypeArg) -> Self {
        match arg {
            JobTypeArg::Scheduler => JobType::Scheduler,
            JobTypeArg::Daemon => JobType::Daemon,
        }
    }
}

/// Polling limits for `job wait`
#[derive(Args, Debug, Clone)]
pub struct PollArgs {
    /// Maximum time to wait in seconds
    #[arg(long, default_value = "300")]
    pub wait_timeout: u64,

    /// Polling interval in seconds
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u64).range(1..))]
    pub wait_interval: u64,
}

/// `--wait` support for commands that queue a job
#[derive(Args, Debug, Clone)]
pub struct AsyncOperationArgs {
    /// Wait for the queued job to finish
    #[arg(long)]
    pub wait: bool,

    /// Maximum time to wait in seconds
    #[arg(long, default_value = "300", requires = "wait")]
    pub wait_timeout: u64,

    /// Polling interval in seconds
    #[arg(
        long,
        default_value = "5",
        requires = "wait",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub wait_interval: u64,
}

/// Job commands
#[derive(Subcommand, Debug)]
pub enum JobCommands {
    /// Show the current state of a job
    Get {
        /// Job id
        job_id: String,

        /// Queue the job lives in
        #[arg(long = "type", value_enum, default_value = "scheduler")]
        job_type: JobTypeArg,
    },

    /// Poll a job until it completes or fails
    Wait {
        /// Job id
        job_id: String,

        /// Queue the job lives in
        #[arg(long = "type", value_enum, default_value = "scheduler")]
        job_type: JobTypeArg,

        #[command(flatten)]
        poll: PollArgs,
    },
}

/// Stack commands
///
/// `server` is the server name (`ch-myserver`), `stack` the stack name
/// (`abc123def456ab12`), as they appear in the control panel URL.
#[derive(Subcommand, Debug)]
pub enum StackCommands {
    /// Show stack details
    Get { server: String, stack: String },

    /// Print the stack's docker-compose file
    Compose { server: String, stack: String },

    /// Update the label, compose file or environment of a stack
    Update {
        server: String,
        stack: String,

        /// New stack label
        #[arg(long)]
        label: Option<String>,

        /// New compose file (text or @file)
        #[arg(long)]
        docker_compose: Option<String>,

        /// New environment (text or @file)
        #[arg(long)]
        environments: Option<String>,

        #[command(flatten)]
        async_ops: AsyncOperationArgs,
    },

    /// Restart a stack, or one of its containers
    Restart {
        server: String,
        stack: String,

        /// Only restart this container
        #[arg(long)]
        container: Option<String>,

        #[command(flatten)]
        async_ops: AsyncOperationArgs,
    },

    /// Add a domain alias to the stack's vhosts and push the compose file
    #[command(name = "add-alias")]
    AddAlias {
        server: String,
        stack: String,

        /// Domain to add
        alias: String,

        #[command(flatten)]
        async_ops: AsyncOperationArgs,
    },
}

/// Profile management commands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List all configured profiles
    #[command(visible_alias = "ls", visible_alias = "l")]
    List,

    /// Show the path to the configuration file
    Path,

    /// Show details of a specific profile
    #[command(visible_alias = "sh", visible_alias = "get")]
    Show {
        /// Profile name to show
        name: String,
    },

    /// Set or create a profile
    #[command(visible_alias = "add", visible_alias = "create")]
    Set {
        /// Profile name
        name: String,

        /// SiteHost API key
        #[arg(long)]
        api_key: String,

        /// SiteHost client id
        #[arg(long)]
        client_id: String,

        /// API URL, if not the SiteHost default
        #[arg(long)]
        api_url: Option<String>,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Make this the default profile
        #[arg(long)]
        default: bool,

        /// Store the API key in the OS keyring instead of the config file
        #[cfg(feature = "secure-storage")]
        #[arg(long)]
        use_keyring: bool,
    },

    /// Remove a profile
    #[command(visible_alias = "rm", visible_alias = "del", visible_alias = "delete")]
    Remove {
        /// Profile name to remove
        name: String,
    },

    /// Set the default profile
    #[command(name = "default", visible_alias = "def")]
    Default {
        /// Profile name to use by default
        name: String,
    },
}
