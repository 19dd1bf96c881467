//! Analysis result as returned by the service.

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display format for analysis timestamps.
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// When the service produced the result. The service decides the encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisTimestamp {
    /// Milliseconds since the Unix epoch, as a browser `Date` reads a number.
    Epoch(f64),
    /// ISO-8601 text, with or without an offset.
    Text(String),
}

impl AnalysisTimestamp {
    /// Render in local time. Text that is not ISO-8601 is returned verbatim.
    pub fn display_local(&self) -> String {
        match self {
            AnalysisTimestamp::Text(text) => {
                if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                    return dt.with_timezone(&Local).format(DISPLAY_FORMAT).to_string();
                }
                // Naive timestamps are already local to the service host
                match NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
                    Ok(naive) => naive.format(DISPLAY_FORMAT).to_string(),
                    Err(_) => text.clone(),
                }
            }
            AnalysisTimestamp::Epoch(millis) => match self.epoch_utc() {
                Some(utc) => utc.with_timezone(&Local).format(DISPLAY_FORMAT).to_string(),
                None => millis.to_string(),
            },
        }
    }

    /// UTC instant of an epoch timestamp. `None` for text or out-of-range values.
    pub fn epoch_utc(&self) -> Option<DateTime<Utc>> {
        let &AnalysisTimestamp::Epoch(millis) = self else {
            return None;
        };
        if !millis.is_finite() {
            return None;
        }

        // Floor so the sub-second part is never negative
        let secs = (millis / 1000.0).floor();
        let nanos = ((millis - secs * 1000.0) * 1e6).round() as u32;
        DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))
    }
}

/// Successful analysis payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub timestamp: AnalysisTimestamp,

    /// Base64 PNG of the full-waveform spectrum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fft_plot_base64: Option<String>,

    /// Base64 PNG of field strength over time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b_vs_t_plot_base64: Option<String>,

    /// Field value per segment, in the scaled unit.
    #[serde(default)]
    pub magnetic_field_time_series: Vec<f64>,

    /// End time of each segment in seconds.
    #[serde(default)]
    pub time_stamps: Vec<f64>,
}

impl AnalysisResult {
    /// Spectrum plot payload, if present and non-empty.
    pub fn fft_plot(&self) -> Option<&str> {
        non_empty(&self.fft_plot_base64)
    }

    /// Field-vs-time plot payload, if present and non-empty.
    pub fn b_vs_t_plot(&self) -> Option<&str> {
        non_empty(&self.b_vs_t_plot_base64)
    }
}

fn non_empty(payload: &Option<String>) -> Option<&str> {
    payload.as_deref().filter(|s| !s.is_empty())
}
