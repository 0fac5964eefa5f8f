//! XDG Base Directory support.

use std::path::PathBuf;

/// Application directory name under each XDG base.
pub const APP_DIR: &str = "mcp-ui-bridge";

/// XDG directory paths for the bridge.
pub struct XdgDirs {
    /// Config directory (~/.config/mcp-ui-bridge or XDG_CONFIG_HOME/mcp-ui-bridge)
    pub config: PathBuf,
}

impl XdgDirs {
    /// Get XDG directories, respecting environment variables.
    pub fn new() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve directories with a custom environment lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

        Self {
            config: lookup("XDG_CONFIG_HOME")
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| home.join(".config"))
                .join(APP_DIR),
        }
    }

    /// Path of the JSON config file.
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.json")
    }
}

impl Default for XdgDirs {
    fn default() -> Self {
        Self::new()
    }
}
