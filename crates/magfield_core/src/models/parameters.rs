//! The six numeric analysis parameters sent alongside the archives.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifies one analysis parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterName {
    /// Target frequency in Hz.
    TargetFreq,
    /// Bandwidth around the target in Hz.
    Bandwidth,
    /// Drive current in amperes.
    Current,
    /// Dimensionless scaling factor (e.g. to pT).
    Scaling,
    /// Total measurement duration in seconds.
    TotalDuration,
    /// Segmentation interval in seconds.
    Interval,
}

impl ParameterName {
    /// All parameters in form order.
    pub const ALL: [ParameterName; 6] = [
        ParameterName::TargetFreq,
        ParameterName::Bandwidth,
        ParameterName::Current,
        ParameterName::Scaling,
        ParameterName::TotalDuration,
        ParameterName::Interval,
    ];

    /// Query-string key the analysis service expects.
    pub fn query_key(self) -> &'static str {
        match self {
            ParameterName::TargetFreq => "target_freq",
            ParameterName::Bandwidth => "bw",
            ParameterName::Current => "current",
            ParameterName::Scaling => "scaling",
            ParameterName::TotalDuration => "total_measurement_duration_sec",
            ParameterName::Interval => "interval_sec",
        }
    }

    /// Human-readable label with unit.
    pub fn label(self) -> &'static str {
        match self {
            ParameterName::TargetFreq => "Target Freq (Hz)",
            ParameterName::Bandwidth => "Bandwidth (Hz)",
            ParameterName::Current => "Current (A)",
            ParameterName::Scaling => "Scaling Factor",
            ParameterName::TotalDuration => "Total Duration (s)",
            ParameterName::Interval => "Interval (s)",
        }
    }
}

impl fmt::Display for ParameterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.query_key())
    }
}

/// Returned when a parameter name is not recognised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown analysis parameter: {0}")]
pub struct UnknownParameter(pub String);

impl FromStr for ParameterName {
    type Err = UnknownParameter;

    /// Accepts query keys case-insensitively, with `-` or `_` separators.
    /// `BW` is the alias the service itself declares for `bw`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        match key.as_str() {
            "target_freq" => Ok(ParameterName::TargetFreq),
            "bw" | "bandwidth" => Ok(ParameterName::Bandwidth),
            "current" => Ok(ParameterName::Current),
            "scaling" => Ok(ParameterName::Scaling),
            "total_measurement_duration_sec" | "duration" => Ok(ParameterName::TotalDuration),
            "interval_sec" | "interval" => Ok(ParameterName::Interval),
            _ => Err(UnknownParameter(s.to_string())),
        }
    }
}

/// Current values of the analysis parameters.
///
/// Values are stored exactly as entered. A text entry that does not parse is
/// kept as NaN so the form can hold a half-typed value; the workflow refuses
/// to submit until every field is finite again.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParameters {
    #[serde(default = "default_target_freq")]
    pub target_freq: f64,

    #[serde(default = "default_bw")]
    pub bw: f64,

    #[serde(default = "default_current")]
    pub current: f64,

    #[serde(default = "default_scaling")]
    pub scaling: f64,

    #[serde(default = "default_total_duration")]
    pub total_measurement_duration_sec: f64,

    #[serde(default = "default_interval")]
    pub interval_sec: f64,
}

fn default_target_freq() -> f64 {
    1028.0
}

fn default_bw() -> f64 {
    2.0
}

fn default_current() -> f64 {
    1.0
}

fn default_scaling() -> f64 {
    1000.0
}

fn default_total_duration() -> f64 {
    30.0
}

fn default_interval() -> f64 {
    1.0
}

impl Default for AnalysisParameters {
    fn default() -> Self {
        Self {
            target_freq: default_target_freq(),
            bw: default_bw(),
            current: default_current(),
            scaling: default_scaling(),
            total_measurement_duration_sec: default_total_duration(),
            interval_sec: default_interval(),
        }
    }
}

impl AnalysisParameters {
    /// Read one parameter.
    pub fn get(&self, name: ParameterName) -> f64 {
        match name {
            ParameterName::TargetFreq => self.target_freq,
            ParameterName::Bandwidth => self.bw,
            ParameterName::Current => self.current,
            ParameterName::Scaling => self.scaling,
            ParameterName::TotalDuration => self.total_measurement_duration_sec,
            ParameterName::Interval => self.interval_sec,
        }
    }

    /// Overwrite one parameter. No validation happens here.
    pub fn set(&mut self, name: ParameterName, value: f64) {
        let slot = match name {
            ParameterName::TargetFreq => &mut self.target_freq,
            ParameterName::Bandwidth => &mut self.bw,
            ParameterName::Current => &mut self.current,
            ParameterName::Scaling => &mut self.scaling,
            ParameterName::TotalDuration => &mut self.total_measurement_duration_sec,
            ParameterName::Interval => &mut self.interval_sec,
        };
        *slot = value;
    }

    /// Overwrite one parameter from raw user text.
    pub fn set_text(&mut self, name: ParameterName, text: &str) {
        self.set(name, parse_entry(text));
    }

    /// First parameter (in form order) that is not a finite number.
    pub fn first_invalid(&self) -> Option<ParameterName> {
        ParameterName::ALL
            .into_iter()
            .find(|name| !self.get(*name).is_finite())
    }

    /// Query pairs in form order, values as decimal text.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        ParameterName::ALL
            .into_iter()
            .map(|name| (name.query_key(), self.get(name).to_string()))
            .collect()
    }
}

fn parse_entry(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_defaults() {
        let params = AnalysisParameters::default();
        assert_eq!(params.target_freq, 1028.0);
        assert_eq!(params.bw, 2.0);
        assert_eq!(params.current, 1.0);
        assert_eq!(params.scaling, 1000.0);
        assert_eq!(params.total_measurement_duration_sec, 30.0);
        assert_eq!(params.interval_sec, 1.0);
        assert_eq!(params.first_invalid(), None);
    }

    #[test]
    fn names_parse_from_keys_and_aliases() {
        assert_eq!("target_freq".parse(), Ok(ParameterName::TargetFreq));
        assert_eq!("BW".parse(), Ok(ParameterName::Bandwidth));
        assert_eq!("interval-sec".parse(), Ok(ParameterName::Interval));
        assert_eq!("duration".parse(), Ok(ParameterName::TotalDuration));
        assert!("frequency".parse::<ParameterName>().is_err());

        for name in ParameterName::ALL {
            assert_eq!(name.query_key().parse(), Ok(name));
        }
    }

    #[test]
    fn text_entry_keeps_partial_input_as_invalid() {
        let mut params = AnalysisParameters::default();

        params.set_text(ParameterName::Current, " 2.5 ");
        assert_eq!(params.current, 2.5);

        params.set_text(ParameterName::Scaling, "");
        assert!(params.scaling.is_nan());
        params.set_text(ParameterName::Bandwidth, "1e");
        assert_eq!(params.first_invalid(), Some(ParameterName::Bandwidth));

        params.set_text(ParameterName::Bandwidth, "1e1");
        assert_eq!(params.first_invalid(), Some(ParameterName::Scaling));
    }

    #[test]
    fn infinity_is_not_a_valid_value() {
        let mut params = AnalysisParameters::default();
        params.set(ParameterName::Interval, f64::INFINITY);
        assert_eq!(params.first_invalid(), Some(ParameterName::Interval));
    }

    #[test]
    fn query_pairs_use_plain_decimal_text() {
        let params = AnalysisParameters {
            target_freq: 1028.0,
            bw: 2.0,
            current: 1.0,
            scaling: 1000.0,
            total_measurement_duration_sec: 30.0,
            interval_sec: 0.5,
        };

        let pairs = params.query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("target_freq", "1028".to_string()),
                ("bw", "2".to_string()),
                ("current", "1".to_string()),
                ("scaling", "1000".to_string()),
                ("total_measurement_duration_sec", "30".to_string()),
                ("interval_sec", "0.5".to_string()),
            ]
        );
    }
}
