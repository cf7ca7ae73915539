use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use azexempt::{
    cli::commands::{
        config::ConfigCommand, create::CreateCommand, load_settings, login::LoginCommand,
        CommandHandler, CommandResult,
    },
    cli::{Cli, Commands, LogLevel},
    io::paths::ExemptPaths,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.resolved_command();

    // The wizard owns the terminal, so its logs always go to a file
    let log_file = match (&cli.log_file, command.is_interactive()) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => {
            let paths = ExemptPaths::new()?;
            paths.ensure_state_dir()?;
            Some(paths.log_file())
        }
        (None, false) => None,
    };
    initialize_tracing(cli.log_level, log_file.as_deref())?;
    debug!("Running {} command", command.name());

    let handler: Box<dyn CommandHandler> = match command {
        Commands::Create(args) => {
            let (settings, _) = load_settings(cli.config.as_deref(), &args.overrides())?;
            Box::new(CreateCommand::new(settings, args.skip_login))
        }
        Commands::Login(args) => {
            let (settings, _) = load_settings(cli.config.as_deref(), &args.overrides())?;
            Box::new(LoginCommand { settings })
        }
        Commands::Config => {
            let (settings, loader) = load_settings(cli.config.as_deref(), &Default::default())?;
            Box::new(ConfigCommand {
                settings,
                source: loader.path().to_path_buf(),
            })
        }
    };

    let result = handler
        .execute()
        .with_context(|| format!("{} failed", handler.name()))?;
    match &result {
        CommandResult::Success(Some(msg)) => println!("{}", msg),
        CommandResult::Success(None) => {}
        CommandResult::Warning(msg) | CommandResult::Error(msg) => eprintln!("{}", msg),
    }

    let code = result.exit_code();
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Initialize tracing with CLI flags
///
/// `RUST_LOG` directives are layered on top of `--log-level`. Output goes to
/// `log_file` when given, otherwise to stderr.
fn initialize_tracing(log_level: LogLevel, log_file: Option<&Path>) -> Result<()> {
    let mut filter = EnvFilter::new(log_level.to_filter_directive());
    if let Ok(extra) = std::env::var("RUST_LOG") {
        for directive in extra.split(',').filter(|d| !d.trim().is_empty()) {
            if let Ok(parsed) = directive.parse() {
                filter = filter.add_directive(parsed);
            }
        }
    }

    match log_file {
        Some(path) => {
            let file: File = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}
