use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::azure::ExemptionCategory;
use crate::config::SettingsOverrides;

/// azexempt: interactive Azure Policy exemption wizard
#[derive(Parser, Debug)]
#[command(name = "azexempt")]
#[command(version)]
#[command(about = "Create Azure Policy exemptions interactively")]
#[command(
    long_about = "azexempt walks through subscription, policy assignment and scope selection, then creates an Azure Policy exemption through the Azure CLI."
)]
pub struct Cli {
    /// Log level
    #[arg(long, value_enum, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    /// Write logs to this file instead of the default log location
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The selected command, `create` when none was given
    pub fn resolved_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Create(CreateArgs::default()))
    }
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the exemption wizard (default)
    Create(CreateArgs),

    /// Make sure an Azure CLI session exists, running `az login` if needed
    Login(AzArgs),

    /// Print the effective settings as YAML
    Config,
}

impl Commands {
    /// Get the command name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Create(_) => "create",
            Commands::Login(_) => "login",
            Commands::Config => "config",
        }
    }

    /// Commands that take over the terminal
    pub fn is_interactive(&self) -> bool {
        matches!(self, Commands::Create(_))
    }
}

/// Options shared by every command that talks to the Azure CLI
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct AzArgs {
    /// Azure CLI executable
    #[arg(long)]
    pub az_path: Option<String>,

    /// Timeout for each Azure CLI call, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateArgs {
    #[command(flatten)]
    pub az: AzArgs,

    /// Days from today used to pre-fill the expiration date
    #[arg(long, value_name = "DAYS")]
    pub expiration_days: Option<u32>,

    /// Exemption category (waiver or mitigated)
    #[arg(long)]
    pub category: Option<ExemptionCategory>,

    /// Do not check for an Azure CLI session before starting
    #[arg(long)]
    pub skip_login: bool,
}

impl AzArgs {
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            az_path: self.az_path.clone(),
            command_timeout_seconds: self.timeout,
            ..Default::default()
        }
    }
}

impl CreateArgs {
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            default_expiration_days: self.expiration_days,
            exemption_category: self.category,
            ..self.az.overrides()
        }
    }
}
