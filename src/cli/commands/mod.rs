pub mod config;
pub mod create;
pub mod login;

use std::path::Path;

use crate::config::{loader, Settings, SettingsLoader, SettingsOverrides};
use crate::io::paths::ExemptPaths;
use crate::Result;

/// Common trait for all command handlers
pub trait CommandHandler {
    /// Execute the command
    fn execute(&self) -> Result<CommandResult>;

    /// Get command name for logging
    fn name(&self) -> &'static str;
}

/// Command execution result
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Success with optional message for stdout
    Success(Option<String>),
    /// Error with message
    Error(String),
    /// Warning with message
    Warning(String),
}

impl CommandResult {
    /// Convert to exit code
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandResult::Success(_) => 0,
            CommandResult::Error(_) => 1,
            CommandResult::Warning(_) => 0,
        }
    }

    /// Get message if any
    pub fn message(&self) -> Option<&str> {
        match self {
            CommandResult::Success(msg) => msg.as_deref(),
            CommandResult::Error(msg) => Some(msg),
            CommandResult::Warning(msg) => Some(msg),
        }
    }
}

/// Load settings from `config` (or the default location) and apply overrides
pub fn load_settings(
    config: Option<&Path>,
    overrides: &SettingsOverrides,
) -> Result<(Settings, SettingsLoader)> {
    let settings_loader = match config {
        Some(path) => SettingsLoader::from_path(path),
        None => SettingsLoader::new(&ExemptPaths::new()?),
    };
    let settings = settings_loader.load()?.apply(overrides);
    loader::validate(&settings)?;
    Ok((settings, settings_loader))
}

/// Multi-threaded runtime for commands that call the Azure CLI
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CommandResult::Success(None).exit_code(), 0);
        assert_eq!(CommandResult::Warning("aborted".into()).exit_code(), 0);
        assert_eq!(CommandResult::Error("failed".into()).exit_code(), 1);
        assert_eq!(CommandResult::Success(None).message(), None);
    }

    #[test]
    fn test_load_settings_validates_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "visible_rows: 8\n").unwrap();

        let (settings, loader) = load_settings(Some(&path), &SettingsOverrides::default()).unwrap();
        assert_eq!(settings.visible_rows, 8);
        assert_eq!(loader.path(), path.as_path());

        let zero_timeout = SettingsOverrides {
            command_timeout_seconds: Some(0),
            ..Default::default()
        };
        assert!(load_settings(Some(&path), &zero_timeout).is_err());
    }
}
