use std::path::PathBuf;

use super::{CommandHandler, CommandResult};
use crate::config::Settings;
use crate::Result;

/// Handler for the `config` command
pub struct ConfigCommand {
    pub settings: Settings,
    /// File the settings were read from, if it exists
    pub source: PathBuf,
}

impl CommandHandler for ConfigCommand {
    fn execute(&self) -> Result<CommandResult> {
        Ok(CommandResult::Success(Some(self.render()?)))
    }

    fn name(&self) -> &'static str {
        "config"
    }
}

impl ConfigCommand {
    /// Effective settings as YAML, headed by the settings file location
    pub fn render(&self) -> Result<String> {
        let yaml = serde_yaml_ng::to_string(&self.settings)?;
        let origin = if self.source.exists() {
            format!("# Settings file: {}", self.source.display())
        } else {
            format!("# Settings file: {} (not present, defaults)", self.source.display())
        };
        Ok(format!("{}\n{}", origin, yaml.trim_end()))
    }
}
