//! User configuration file handling
//!
//! Manages settings from ~/.config/inkfont/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// User configuration from ~/.config/inkfont/settings.json
///
/// These settings override built-in defaults but are overridden by CLI arguments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Policy tables used when `--tables` is not given
    pub tables: Option<PathBuf>,
    /// Where the UFO goes when `--output` is not given
    pub output: Option<PathBuf>,
    /// Log filter directive, e.g. "inkfont=debug"
    pub log_filter: Option<String>,
    /// Always compile the UFO after saving
    pub compile: Option<bool>,
    /// Replaces the family name from the policy tables
    pub family_name: Option<String>,
}

impl ConfigFile {
    /// Get the path to the inkfont config directory
    pub fn config_dir() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")));
        config_dir.join("inkfont")
    }

    /// Get the path to the user config file
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("settings.json")
    }

    /// Get the path to the logs directory
    pub fn logs_dir() -> PathBuf {
        Self::config_dir().join("logs")
    }

    /// Get the path to the compiled font cache
    pub fn cache_dir() -> PathBuf {
        Self::config_dir().join("cache")
    }

    /// Load configuration from the user config file
    pub fn load() -> Option<Self> {
        let path = Self::config_path();

        if !path.exists() {
            return None;
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    debug!("Loaded user settings from {:?}", path);
                    Some(config)
                }
                Err(e) => {
                    warn!("Failed to parse settings.json: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to read settings.json: {}", e);
                None
            }
        }
    }

    /// Save configuration to the user config file
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&path, contents)?;

        debug!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Initialize the user configuration directory
    ///
    /// This creates:
    /// 1. The ~/.config/inkfont directory with a logs/ directory
    /// 2. A settings.json file with default values
    /// 3. tables.json with the built-in policy tables, ready to edit
    pub fn initialize_config_directory() -> anyhow::Result<()> {
        let config_dir = Self::config_dir();
        fs::create_dir_all(&config_dir)?;
        println!("Created config directory: {:?}", config_dir);

        let logs_dir = Self::logs_dir();
        fs::create_dir_all(&logs_dir)?;
        println!("Created logs directory: {:?}", logs_dir);

        let tables_path = config_dir.join("tables.json");
        if !tables_path.exists() {
            crate::config::PipelineConfig::default().save(&tables_path)?;
            println!("Created policy tables: {:?}", tables_path);
        } else {
            println!("Policy tables already exist: {:?}", tables_path);
        }

        let settings_path = Self::config_path();
        if !settings_path.exists() {
            let example = ConfigFile {
                tables: Some(tables_path),
                log_filter: Some("inkfont=info".to_string()),
                ..ConfigFile::default()
            };
            example.save()?;
            println!("Created settings file: {:?}", settings_path);
        } else {
            println!("Settings file already exists: {:?}", settings_path);
        }

        println!("\nConfiguration initialized successfully!");
        println!("  - Edit settings at: {:?}", settings_path);
        println!("  - View run logs in: {:?}", logs_dir);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_setting_is_optional() {
        let config: ConfigFile = serde_json::from_str("{}").expect("empty settings");
        assert_eq!(config, ConfigFile::default());

        let config: ConfigFile =
            serde_json::from_str(r#"{ "compile": true, "family_name": "Notes" }"#)
                .expect("partial settings");
        assert_eq!(config.compile, Some(true));
        assert_eq!(config.family_name.as_deref(), Some("Notes"));
        assert!(config.tables.is_none());
    }

    #[test]
    fn paths_live_under_the_config_dir() {
        let dir = ConfigFile::config_dir();
        assert!(dir.ends_with("inkfont"));
        assert!(ConfigFile::logs_dir().starts_with(&dir));
        assert!(ConfigFile::config_path().ends_with("settings.json"));
    }
}
