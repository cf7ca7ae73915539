//! Settings for the exemption wizard: YAML file plus command-line overrides

pub mod loader;
pub mod types;

pub use loader::SettingsLoader;
pub use types::{Settings, SettingsOverrides};
