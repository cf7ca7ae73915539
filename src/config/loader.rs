use super::types::Settings;
use crate::io::paths::ExemptPaths;
use crate::{ExemptError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads [`Settings`] from YAML
pub struct SettingsLoader {
    path: PathBuf,
    /// An explicitly requested file must exist
    required: bool,
}

impl SettingsLoader {
    /// Loader for the platform default location; a missing file yields defaults
    pub fn new(paths: &ExemptPaths) -> Self {
        Self {
            path: paths.config_file(),
            required: false,
        }
    }

    /// Loader for a file named on the command line
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            if self.required {
                return Err(ExemptError::Config(format!(
                    "Settings file not found: {}",
                    self.path.display()
                )));
            }
            debug!("No settings file at {}, using defaults", self.path.display());
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            ExemptError::Config(format!(
                "Failed to read settings file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        // An empty file deserializes to null
        if contents.trim().is_empty() {
            return Ok(Settings::default());
        }

        let settings: Settings = serde_yaml_ng::from_str(&contents).map_err(|e| {
            ExemptError::Config(format!(
                "Failed to parse settings file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        validate(&settings)?;
        debug!("Loaded settings from {}", self.path.display());
        Ok(settings)
    }
}

pub fn validate(settings: &Settings) -> Result<()> {
    if settings.az_path.trim().is_empty() {
        return Err(ExemptError::Config("az_path must not be empty".to_string()));
    }
    if settings.command_timeout_seconds == 0 {
        return Err(ExemptError::Config(
            "command_timeout_seconds must be greater than zero".to_string(),
        ));
    }
    if settings.visible_rows == 0 {
        return Err(ExemptError::Config(
            "visible_rows must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
