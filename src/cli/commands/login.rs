use super::{runtime, CommandHandler, CommandResult};
use crate::azure::AzCliClient;
use crate::config::Settings;
use crate::Result;

/// Handler for the `login` command
pub struct LoginCommand {
    pub settings: Settings,
}

impl CommandHandler for LoginCommand {
    fn execute(&self) -> Result<CommandResult> {
        let client = AzCliClient::new(&self.settings.az_path, self.settings.command_timeout());
        runtime()?.block_on(client.ensure_login())?;
        Ok(CommandResult::Success(Some(
            "Azure CLI session is active.".to_string(),
        )))
    }

    fn name(&self) -> &'static str {
        "login"
    }
}
