/// Terminal User Interface module for interactive commands
pub mod wizard;

use std::sync::Arc;

use crate::azure::Backend;
use crate::config::Settings;
use crate::Result;

pub use wizard::Outcome;

/// Run the interactive exemption wizard
pub async fn run_exemption_wizard(
    settings: &Settings,
    backend: Arc<dyn Backend>,
) -> Result<Outcome> {
    wizard::run(settings, backend).await
}
