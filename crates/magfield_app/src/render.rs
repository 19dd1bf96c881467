//! Terminal rendering of a finished workflow.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use magfield_core::workflow::{FileView, WorkflowView};

/// Print the outcome and write decoded plots into `output_dir`.
///
/// Returns `false` when the workflow ended in an error.
pub fn report<W: Write>(view: &WorkflowView<'_>, output_dir: &Path, out: &mut W) -> Result<bool> {
    for file in [&view.signal, &view.noise].into_iter().flatten() {
        describe_file(file, out)?;
    }

    if let Some(error) = &view.error {
        writeln!(out, "Error: {}", error)?;
    }

    let Some(result) = &view.result else {
        return Ok(view.error.is_none());
    };

    writeln!(out, "Analysis Timestamp: {}", result.timestamp)?;

    let samples = result.result.magnetic_field_time_series.len();
    if samples > 0 {
        writeln!(out, "Field samples: {}", samples)?;
    }

    if !result.panels.is_empty() {
        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create output folder {}", output_dir.display()))?;
    }

    for panel in &result.panels {
        let bytes = match panel.decode() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("{} payload is not valid base64: {}", panel.kind.title(), e);
                writeln!(out, "{}: not decodable ({})", panel.kind.title(), e)?;
                continue;
            }
        };

        let path = plot_path(output_dir, panel.kind.file_stem());
        fs::write(&path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Saved {} ({} bytes) to {}", panel.kind.title(), bytes.len(), path.display());
        writeln!(out, "{}: {}", panel.kind.title(), path.display())?;
    }

    Ok(view.error.is_none())
}

fn describe_file<W: Write>(file: &FileView<'_>, out: &mut W) -> Result<()> {
    writeln!(out, "{}: {} ({} bytes)", file.role, file.file_name, file.size)?;
    for hint in file.hints {
        writeln!(out, "  warning: {}", hint)?;
    }
    Ok(())
}

fn plot_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{}.png", stem))
}
