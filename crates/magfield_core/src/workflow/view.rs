//! Read-only view of the workflow for a presentation layer.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::models::{AnalysisParameters, AnalysisResult, ArchiveFile, ArchiveHint, FileRole};

/// Which plot a panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotKind {
    /// Spectrum of the full waveform.
    Spectrum,
    /// Magnetic field per segment over time.
    FieldVsTime,
}

impl PlotKind {
    pub fn title(self) -> &'static str {
        match self {
            PlotKind::Spectrum => "FFT Graph",
            PlotKind::FieldVsTime => "Magnetic Field vs Time",
        }
    }

    /// File stem used when a front end saves the panel.
    pub fn file_stem(self) -> &'static str {
        match self {
            PlotKind::Spectrum => "fft_plot",
            PlotKind::FieldVsTime => "b_vs_t_plot",
        }
    }
}

/// One image panel to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotPanel<'a> {
    pub kind: PlotKind,
    pub payload: &'a str,
}

impl PlotPanel<'_> {
    /// Decode the base64 payload into PNG bytes.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(self.payload.trim())
    }

    /// `data:` URI for direct embedding.
    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.payload)
    }
}

/// A result ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView<'a> {
    pub timestamp: String,
    /// Panels that are present, spectrum first. Absent panels are omitted.
    pub panels: Vec<PlotPanel<'a>>,
    pub result: &'a AnalysisResult,
}

impl<'a> ResultView<'a> {
    pub fn new(result: &'a AnalysisResult) -> Self {
        let panels = [
            (PlotKind::Spectrum, result.fft_plot()),
            (PlotKind::FieldVsTime, result.b_vs_t_plot()),
        ]
        .into_iter()
        .filter_map(|(kind, payload)| payload.map(|payload| PlotPanel { kind, payload }))
        .collect();

        Self {
            timestamp: result.timestamp.display_local(),
            panels,
            result,
        }
    }

    pub fn panel(&self, kind: PlotKind) -> Option<&PlotPanel<'a>> {
        self.panels.iter().find(|p| p.kind == kind)
    }
}

/// A selected archive as shown next to its input.
#[derive(Debug, Clone, Copy)]
pub struct FileView<'a> {
    pub role: FileRole,
    pub file_name: &'a str,
    pub size: usize,
    pub hints: &'a [ArchiveHint],
}

impl<'a> FileView<'a> {
    pub(crate) fn new(role: FileRole, file: &'a ArchiveFile) -> Self {
        Self {
            role,
            file_name: file.file_name(),
            size: file.len(),
            hints: file.hints(),
        }
    }
}

/// Everything a front end needs to draw the form and its outcome.
#[derive(Debug, Clone)]
pub struct WorkflowView<'a> {
    pub parameters: &'a AnalysisParameters,
    pub signal: Option<FileView<'a>>,
    pub noise: Option<FileView<'a>>,
    /// Disable the submit control while true.
    pub submitting: bool,
    pub error: Option<String>,
    pub result: Option<ResultView<'a>>,
}
