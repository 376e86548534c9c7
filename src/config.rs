//! Configuration file handling.
//!
//! Loads configuration from `~/.config/treescope/config.toml` (or a custom
//! path via `--config`). Every field is optional; the CLI merges values as
//! CLI flags > config file > built-in defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraSection,
    #[serde(default)]
    pub ui: UiSection,
}

#[derive(Debug, Deserialize, Default)]
pub struct CameraSection {
    /// Camera device index
    pub device: Option<u32>,
    /// Mirror the preview horizontally
    pub mirror: Option<bool>,
    /// Requested capture width in pixels
    pub width: Option<u32>,
    /// Requested capture height in pixels
    pub height: Option<u32>,
    /// Requested frame rate
    pub fps: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UiSection {
    /// Show the tree information side panel
    pub info_panel: Option<bool>,
}

impl Config {
    /// Load configuration from a file path.
    ///
    /// Returns the default config if the file doesn't exist, and an error
    /// if the file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("treescope").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/treescope/config.toml")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.toml");
        let config = Config::load(Some(&path)).unwrap();
        assert!(config.camera.device.is_none());
        assert!(config.camera.mirror.is_none());
        assert!(config.ui.info_panel.is_none());
    }

    #[test]
    fn full_file_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[camera]\ndevice = 1\nmirror = false\nwidth = 1280\nheight = 720\nfps = 15\n\n[ui]\ninfo_panel = false"
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.camera.device, Some(1));
        assert_eq!(config.camera.mirror, Some(false));
        assert_eq!(config.camera.width, Some(1280));
        assert_eq!(config.camera.height, Some(720));
        assert_eq!(config.camera.fps, Some(15));
        assert_eq!(config.ui.info_panel, Some(false));
    }

    #[test]
    fn partial_file_leaves_rest_unset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[camera]\ndevice = 2\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.camera.device, Some(2));
        assert!(config.camera.mirror.is_none());
        assert!(config.camera.fps.is_none());
        assert!(config.ui.info_panel.is_none());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[camera\ndevice = oops").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        let msg = format!("{}", err);
        assert!(msg.contains("Failed to parse"));
        assert!(msg.contains("config.toml"));
    }
}
