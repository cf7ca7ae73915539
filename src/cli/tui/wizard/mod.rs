/// Interactive policy exemption wizard
pub mod app;
pub mod events;
pub mod gateway;
pub mod input;
pub mod screens;
pub mod state;
pub mod theme;
mod transition;

use std::sync::Arc;

use crate::azure::Backend;
use crate::config::Settings;
use crate::Result;

pub use app::Outcome;

/// Entry point for the exemption wizard
pub async fn run(settings: &Settings, backend: Arc<dyn Backend>) -> Result<Outcome> {
    let app = app::App::new(settings);
    app.run(backend).await
}
