//! Logging types.

use serde::{Deserialize, Serialize};

/// Log level for filtering messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace-level debugging (very verbose).
    Trace,
    /// Debug information.
    Debug,
    /// General information.
    #[default]
    Info,
    /// Warnings.
    Warn,
    /// Errors.
    Error,
}

impl LogLevel {
    /// One step more verbose, saturating at `Trace`.
    pub fn more_verbose(self) -> Self {
        match self {
            LogLevel::Error => LogLevel::Warn,
            LogLevel::Warn => LogLevel::Info,
            LogLevel::Info => LogLevel::Debug,
            LogLevel::Debug | LogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_serialize_lowercase() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            level: LogLevel,
        }

        let text = toml::to_string(&Wrapper {
            level: LogLevel::Warn,
        })
        .unwrap();
        assert_eq!(text.trim(), r#"level = "warn""#);

        let parsed: Wrapper = toml::from_str(r#"level = "debug""#).unwrap();
        assert_eq!(parsed.level, LogLevel::Debug);
    }

    #[test]
    fn verbosity_steps_saturate() {
        assert_eq!(LogLevel::Info.more_verbose(), LogLevel::Debug);
        assert_eq!(LogLevel::Trace.more_verbose(), LogLevel::Trace);
        assert!(LogLevel::Debug < LogLevel::Info);
    }
}
