use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use which::which;

use crate::{DistanceStyle, Result, ZettelError};

/// Environment variable that overrides the clipboard command.
pub const CLIPBOARD_ENV: &str = "ZETTELCLIP_CLIPBOARD";

/// CLI configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Root directory of the vault
    pub vault_dir: PathBuf,

    /// Command that receives text to copy on stdin
    pub clipboard_command: Option<String>,

    /// Phrase style of the note date notice
    pub notice_style: DistanceStyle,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vault_dir: PathBuf::from("."),
            clipboard_command: None,
            notice_style: DistanceStyle::default(),
        }
    }
}

impl Config {
    /// Default location of the config file for this platform.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "zettelclip").map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Reads the config file at `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw).map_err(|e| ZettelError::ConfigError {
            message: format!("Invalid config file {}: {}", path.display(), e),
        })?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    // Configured command, then the environment, then whatever is installed
    pub fn get_clipboard_command(&self) -> Option<String> {
        if let Some(command) = &self.clipboard_command {
            return Some(command.clone());
        }

        if let Ok(command) = std::env::var(CLIPBOARD_ENV) {
            if !command.trim().is_empty() {
                return Some(command);
            }
        }

        let candidates: &[(&str, &str)] = if cfg!(windows) {
            &[("clip", "clip")]
        } else if cfg!(target_os = "macos") {
            &[("pbcopy", "pbcopy")]
        } else {
            &[
                ("wl-copy", "wl-copy"),
                ("xclip", "xclip -selection clipboard"),
                ("xsel", "xsel --clipboard --input"),
            ]
        };

        candidates
            .iter()
            .find(|(program, _)| which(program).is_ok())
            .map(|(_, command)| command.to_string())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_is_merged_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "vault_dir": "/notes", "notice_style": "approximate" }"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.vault_dir, PathBuf::from("/notes"));
        assert_eq!(config.notice_style, DistanceStyle::Approximate);
        assert_eq!(config.clipboard_command, None);
    }

    #[test]
    fn invalid_file_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(ZettelError::ConfigError { .. })
        ));
    }

    #[test]
    fn configured_clipboard_command_wins() {
        let config = Config {
            clipboard_command: Some("my-copy --quiet".to_string()),
            ..Config::default()
        };
        assert_eq!(
            config.get_clipboard_command().as_deref(),
            Some("my-copy --quiet")
        );
    }
}
