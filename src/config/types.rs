use serde::{Deserialize, Serialize};

use crate::azure::ExemptionCategory;

/// Effective settings for a wizard run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Azure CLI executable
    pub az_path: String,
    /// Per `az` invocation timeout
    pub command_timeout_seconds: u64,
    /// Offset from today used to pre-fill the expiration date
    pub default_expiration_days: u32,
    pub exemption_category: ExemptionCategory,
    /// Rows shown per list before it scrolls
    pub visible_rows: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            az_path: "az".to_string(),
            command_timeout_seconds: 120,
            default_expiration_days: 30,
            exemption_category: ExemptionCategory::Waiver,
            visible_rows: 15,
        }
    }
}

/// Values given on the command line; `None` keeps the file value
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub az_path: Option<String>,
    pub command_timeout_seconds: Option<u64>,
    pub default_expiration_days: Option<u32>,
    pub exemption_category: Option<ExemptionCategory>,
}

impl Settings {
    pub fn apply(mut self, overrides: &SettingsOverrides) -> Self {
        if let Some(az_path) = &overrides.az_path {
            self.az_path = az_path.clone();
        }
        if let Some(timeout) = overrides.command_timeout_seconds {
            self.command_timeout_seconds = timeout;
        }
        if let Some(days) = overrides.default_expiration_days {
            self.default_expiration_days = days;
        }
        if let Some(category) = overrides.exemption_category {
            self.exemption_category = category;
        }
        self
    }

    pub fn command_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.command_timeout_seconds)
    }
}
