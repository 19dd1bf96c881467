//! Config manager for loading and atomically saving settings.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::settings::{ConfigSection, Settings};

/// Errors that can occur during config operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Manages application configuration.
pub struct ConfigManager {
    /// Path to the config file.
    config_path: PathBuf,
    /// Current settings loaded in memory.
    settings: Settings,
}

impl ConfigManager {
    /// Create a new config manager with the given config file path.
    ///
    /// Does not load the config - call `load()` or `load_or_create()` after.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
        }
    }

    /// Get the config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Changes are only in memory until `save()` is called.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Load config from file.
    ///
    /// Returns error if file doesn't exist.
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path)?;
        self.settings = toml::from_str(&content)?;
        Ok(())
    }

    /// Load config from file, creating it with defaults if it doesn't exist.
    ///
    /// An existing file with unknown sections or missing keys is rewritten
    /// in canonical form.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        if self.config_path.exists() {
            let content = fs::read_to_string(&self.config_path)?;
            let (settings, was_modified) = Self::parse_and_clean(&content)?;
            self.settings = settings;

            if was_modified {
                info!("Normalizing config file {}", self.config_path.display());
                self.save()?;
            }
        } else {
            info!("Creating default config at {}", self.config_path.display());
            self.settings = Settings::default();
            self.save()?;
        }
        Ok(())
    }

    /// Create the output and logs folders if they don't exist.
    pub fn ensure_dirs_exist(&self) -> ConfigResult<()> {
        for dir in [self.output_folder(), self.logs_folder()] {
            if !dir.exists() {
                debug!("Creating directory {}", dir.display());
                fs::create_dir_all(&dir)?;
            }
        }
        Ok(())
    }

    pub fn output_folder(&self) -> PathBuf {
        PathBuf::from(&self.settings.paths.output_folder)
    }

    pub fn logs_folder(&self) -> PathBuf {
        PathBuf::from(&self.settings.paths.logs_folder)
    }

    /// Save the entire config atomically.
    pub fn save(&self) -> ConfigResult<()> {
        let content = self.render()?;
        self.atomic_write(&content)?;
        Ok(())
    }

    /// Current settings as commented TOML, as `save()` writes them.
    pub fn render(&self) -> ConfigResult<String> {
        let mut output = String::new();

        output.push_str("# Magnetic Field Analyzer Configuration\n");
        output.push_str("# This file is auto-generated. Unknown sections are removed on load.\n");

        for section in ConfigSection::ALL {
            let body = match section {
                ConfigSection::Service => toml::to_string_pretty(&self.settings.service)?,
                ConfigSection::Defaults => toml::to_string_pretty(&self.settings.defaults)?,
                ConfigSection::Paths => toml::to_string_pretty(&self.settings.paths)?,
                ConfigSection::Logging => toml::to_string_pretty(&self.settings.logging)?,
            };

            output.push('\n');
            output.push_str(&format!("# {}\n", section.description()));
            output.push_str(&format!("[{}]\n", section.table_name()));
            for line in body.lines() {
                output.push_str(line);
                output.push('\n');
            }
        }

        Ok(output)
    }

    /// Parse content and report whether it differs from the canonical form.
    fn parse_and_clean(content: &str) -> ConfigResult<(Settings, bool)> {
        let table: toml::Table = toml::from_str(content)?;
        let settings: Settings = toml::from_str(content)?;

        let known: Vec<&str> = ConfigSection::ALL.iter().map(|s| s.table_name()).collect();
        let mut has_unknown = false;
        for key in table.keys() {
            if !known.contains(&key.as_str()) {
                warn!("Ignoring unknown config section '{}'", key);
                has_unknown = true;
            }
        }

        // Missing keys show up as a difference after re-serializing
        let reparsed: toml::Table = toml::from_str(&toml::to_string_pretty(&settings)?)?;
        let was_modified = has_unknown || reparsed != table;

        Ok((settings, was_modified))
    }

    /// Write to a temp file in the same directory, then rename over the target.
    fn atomic_write(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.config_path.with_extension("toml.tmp");

        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &self.config_path)?;

        Ok(())
    }
}
