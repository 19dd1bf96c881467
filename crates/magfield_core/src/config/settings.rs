//! Settings struct with TOML-based sections.
//!
//! Every section and every key has a default, so a partial or empty file
//! loads cleanly.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;
use crate::models::AnalysisParameters;
use crate::request::{EndpointError, ServiceEndpoint};
use crate::workflow::OverlapPolicy;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Where and how to reach the analysis service.
    #[serde(default)]
    pub service: ServiceSettings,

    /// Parameter values a new form starts with.
    #[serde(default)]
    pub defaults: AnalysisParameters,

    /// Output and log folders.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Analysis service connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// Base URL; `/analyze` is appended to it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout in seconds. Unset means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Handling of a submission started while another is outstanding.
    #[serde(default)]
    pub overlap_policy: OverlapPolicy,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
            overlap_policy: OverlapPolicy::default(),
        }
    }
}

impl ServiceSettings {
    pub fn endpoint(&self) -> Result<ServiceEndpoint, EndpointError> {
        ServiceEndpoint::parse(&self.base_url)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

/// Folder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    /// Folder the CLI writes decoded plots into.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_folder: default_output_folder(),
            logs_folder: default_logs_folder(),
        }
    }
}

fn default_output_folder() -> String {
    "analysis_output".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default level; `RUST_LOG` takes precedence.
    #[serde(default)]
    pub level: LogLevel,

    /// Also write a daily log file under `paths.logs_folder`.
    #[serde(default = "default_true")]
    pub file_logging: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            file_logging: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Config sections for rendering and validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Service,
    Defaults,
    Paths,
    Logging,
}

impl ConfigSection {
    /// All sections in file order.
    pub const ALL: [ConfigSection; 4] = [
        ConfigSection::Service,
        ConfigSection::Defaults,
        ConfigSection::Paths,
        ConfigSection::Logging,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Service => "service",
            ConfigSection::Defaults => "defaults",
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
        }
    }

    /// Comment line written above the section.
    pub fn description(&self) -> &'static str {
        match self {
            ConfigSection::Service => "Analysis service connection",
            ConfigSection::Defaults => "Initial analysis parameter values",
            ConfigSection::Paths => "Output and log directories",
            ConfigSection::Logging => "Logging configuration",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[service]"));
        assert!(toml.contains("[defaults]"));
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[logging]"));
        assert!(!toml.contains("request_timeout_secs"));
    }

    #[test]
    fn settings_round_trip() {
        let mut settings = Settings::default();
        settings.service.request_timeout_secs = Some(45);
        settings.service.overlap_policy = OverlapPolicy::LatestRequestWins;
        settings.defaults.target_freq = 512.0;
        settings.logging.level = LogLevel::Debug;

        let text = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn missing_keys_use_defaults() {
        let parsed: Settings = toml::from_str("[defaults]\nbw = 5.0\n").unwrap();
        assert_eq!(parsed.defaults.bw, 5.0);
        assert_eq!(parsed.defaults.target_freq, 1028.0);
        assert_eq!(parsed.service.base_url, "http://127.0.0.1:8000");
        assert_eq!(parsed.service.request_timeout(), None);
        assert!(parsed.logging.file_logging);
    }

    #[test]
    fn endpoint_comes_from_base_url() {
        let mut service = ServiceSettings::default();
        assert!(service.endpoint().is_ok());

        service.base_url = "ftp://example.com".to_string();
        assert!(service.endpoint().is_err());
    }
}
