//! Configuration system for the Treeline shell.
//!
//! Uses `figment` for layered configuration: built-in defaults, then
//! `.treeline/config.toml` in the workspace directory, then `TREELINE_`
//! environment variables.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Shell configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Prompt shown before each input line.
    pub prompt: String,
    /// Maximum entries kept in the persistent history file.
    pub max_history: usize,
    /// Whether to fold consecutive duplicate history entries.
    pub history_dedup: bool,
    /// Whether to emit ANSI colors.
    pub color: bool,
    /// Whether to print the welcome banner on startup.
    pub banner: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "treeline> ".to_string(),
            max_history: 500,
            history_dedup: true,
            color: true,
            banner: true,
        }
    }
}

impl ShellConfig {
    /// Load configuration for a workspace directory.
    ///
    /// Missing files are fine; the defaults stand in. A malformed file
    /// or environment value is an error.
    pub fn load(workspace: &Path) -> Result<Self, ConfigError> {
        let file = workspace.join(".treeline").join("config.toml");
        let config: ShellConfig = Figment::from(Serialized::defaults(ShellConfig::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed("TREELINE_"))
            .extract()?;
        if config.max_history == 0 {
            return Err(ConfigError::Invalid {
                message: "max_history must be at least 1".to_string(),
            });
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_when_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ShellConfig::load(dir.path()).unwrap();
        assert_eq!(config, ShellConfig::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let conf_dir = dir.path().join(".treeline");
        std::fs::create_dir_all(&conf_dir).unwrap();
        std::fs::write(
            conf_dir.join("config.toml"),
            "prompt = \"svc> \"\nmax_history = 100\n",
        )
        .unwrap();

        let config = ShellConfig::load(dir.path()).unwrap();
        assert_eq!(config.prompt, "svc> ");
        assert_eq!(config.max_history, 100);
        // Untouched keys keep their defaults.
        assert!(config.color);
    }

    #[test]
    fn test_zero_history_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let conf_dir = dir.path().join(".treeline");
        std::fs::create_dir_all(&conf_dir).unwrap();
        std::fs::write(conf_dir.join("config.toml"), "max_history = 0\n").unwrap();

        let err = ShellConfig::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("max_history"));
    }
}
