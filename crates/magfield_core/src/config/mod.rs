//! Configuration management for the analyzer.
//!
//! Settings live in a TOML file (by default `.config/settings.toml`) with one
//! table per section. Writes are atomic: temp file, then rename.
//!
//! # Example
//!
//! ```no_run
//! use magfield_core::config::ConfigManager;
//!
//! let mut config = ConfigManager::new(".config/settings.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Service: {}", config.settings().service.base_url);
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{ConfigSection, LoggingSettings, PathSettings, ServiceSettings, Settings};
