use std::sync::Arc;

use tracing::info;

use super::{runtime, CommandHandler, CommandResult};
use crate::azure::AzCliClient;
use crate::cli::tui::{run_exemption_wizard, Outcome};
use crate::config::Settings;
use crate::Result;

/// Handler for the `create` command
pub struct CreateCommand {
    pub settings: Settings,
    pub skip_login: bool,
}

impl CommandHandler for CreateCommand {
    fn execute(&self) -> Result<CommandResult> {
        runtime()?.block_on(self.run())
    }

    fn name(&self) -> &'static str {
        "create"
    }
}

impl CreateCommand {
    pub fn new(settings: Settings, skip_login: bool) -> Self {
        Self {
            settings,
            skip_login,
        }
    }

    async fn run(&self) -> Result<CommandResult> {
        let client = AzCliClient::new(&self.settings.az_path, self.settings.command_timeout());
        if !self.skip_login {
            client.ensure_login().await?;
        }

        let outcome = run_exemption_wizard(&self.settings, Arc::new(client)).await?;
        Ok(outcome_result(outcome))
    }
}

/// Map how the wizard ended to what the process reports once the terminal is restored
pub fn outcome_result(outcome: Outcome) -> CommandResult {
    match outcome {
        Outcome::Created(output) => {
            info!("Exemption created");
            let output = output.trim();
            CommandResult::Success((!output.is_empty()).then(|| output.to_string()))
        }
        Outcome::Aborted => {
            CommandResult::Warning("Aborted; no exemption was created.".to_string())
        }
        Outcome::Detached => CommandResult::Warning(
            "Exited while the exemption was being created; az continues in the background. \
             Check the Azure portal for the result."
                .to_string(),
        ),
        Outcome::Failed(err) => CommandResult::Error(format!("Error: {}", err)),
    }
}
