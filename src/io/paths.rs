use crate::{ExemptError, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Path management for azexempt configuration and log files
#[derive(Debug, Clone)]
pub struct ExemptPaths {
    /// Configuration directory (e.g. ~/.config/azexempt)
    pub config_dir: PathBuf,
    /// State directory used for log files
    pub state_dir: PathBuf,
}

impl ExemptPaths {
    /// Create new paths instance using standard directories
    pub fn new() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "azexempt").ok_or_else(|| {
            ExemptError::Path("Failed to determine project directories".to_string())
        })?;

        let config_dir = dirs.config_dir().to_path_buf();
        let state_dir = dirs
            .state_dir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| dirs.data_local_dir().to_path_buf());
        Ok(Self {
            config_dir,
            state_dir,
        })
    }

    /// Paths rooted at an arbitrary directory
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            config_dir: root.join("config"),
            state_dir: root.join("state"),
        }
    }

    /// Settings file path
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.yaml")
    }

    /// Default log file path when logging to a file
    pub fn log_file(&self) -> PathBuf {
        self.state_dir.join("azexempt.log")
    }

    /// Ensure the log directory exists
    pub fn ensure_state_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.state_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exempt_paths_creation() {
        let paths = ExemptPaths::new();
        assert!(paths.is_ok());

        let paths = paths.unwrap();
        assert!(paths.config_dir.ends_with("azexempt"));
        assert!(paths.config_file().ends_with("config.yaml"));
    }

    #[test]
    fn test_rooted_paths() {
        let root = Path::new("/tmp/azexempt-test");
        let paths = ExemptPaths::rooted_at(root);

        assert_eq!(paths.config_file(), root.join("config/config.yaml"));
        assert_eq!(paths.log_file(), root.join("state/azexempt.log"));
    }
}
