//! Application paths for settings and routing config discovery.

use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Routing config looked up in the working directory when nothing else is set.
pub const DEFAULT_ROUTING_CONFIG: &str = "config.json";

/// Application paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Configuration directory.
    pub config: PathBuf,
}

impl AppPaths {
    /// Create paths for the aidr application.
    #[must_use]
    pub fn new() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("dev", "aidr", "aidr") {
            Self {
                config: proj_dirs.config_dir().to_path_buf(),
            }
        } else {
            // Fallback to home directory
            let home = BaseDirs::new()
                .map_or_else(|| PathBuf::from("."), |b| b.home_dir().to_path_buf());
            Self {
                config: home.join(".config/aidr"),
            }
        }
    }

    /// Path to the settings file.
    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.config.join("config.toml")
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
