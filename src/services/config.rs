use crate::error::ConfigError;
use crate::models::config::{AppConfig, Settings};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Locates, loads and writes the configuration document
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Use an explicit path, or fall back to the default location.
    ///
    /// The default is `./config.json` when it exists, otherwise
    /// `<platform config dir>/craft-monitor/config.json`.
    pub fn new(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        if let Some(config_path) = explicit {
            return Ok(Self { config_path });
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Ok(Self { config_path: local });
        }

        Ok(Self {
            config_path: Self::platform_config_path()?,
        })
    }

    /// Platform-specific default path
    pub fn platform_config_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("craft-monitor");
        Ok(dir.join(CONFIG_FILE_NAME))
    }

    /// Load the raw configuration document. A missing file is an error.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        if !self.config_exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path).map_err(|source| ConfigError::Read {
            path: self.config_path.clone(),
            source,
        })?;

        Ok(serde_json::from_str(&content)?)
    }

    /// Load and validate
    pub fn load_settings(&self) -> Result<Settings, ConfigError> {
        self.load()?.validate()
    }

    /// Save configuration to disk, creating the parent directory
    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: self.config_path.clone(),
            source,
        };

        if let Some(parent) = self.config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.config_path, json).map_err(write_err)?;

        Ok(())
    }

    pub fn config_file_path(&self) -> &Path {
        &self.config_path
    }

    pub fn config_exists(&self) -> bool {
        self.config_path.exists()
    }
}
