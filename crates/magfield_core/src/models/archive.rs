//! Archive handles for the signal and noise captures.
//!
//! The workflow treats archives as opaque bytes. The only inspection done
//! here is a non-binding hint computed at selection time: the service reads
//! the `*.csv` members of each zip, so a file that is not a zip, or a zip
//! without CSV members, is worth a warning before the upload.

use std::fmt;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

/// Which capture an archive holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileRole {
    Signal,
    Noise,
}

impl FileRole {
    /// Multipart part name the service expects for this role.
    pub fn part_name(self) -> &'static str {
        match self {
            FileRole::Signal => "signal_zip",
            FileRole::Noise => "noise_zip",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FileRole::Signal => "Signal",
            FileRole::Noise => "Noise",
        }
    }
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors reading an archive from disk.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Failed to read archive {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Non-binding observation about a selected archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveHint {
    /// File name does not end in `.zip`.
    NotZipExtension,
    /// The zip central directory could not be read.
    Unreadable(String),
    /// The zip holds no `.csv` members.
    NoCsvEntries,
}

impl fmt::Display for ArchiveHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveHint::NotZipExtension => write!(f, "file name does not end in .zip"),
            ArchiveHint::Unreadable(e) => write!(f, "not a readable zip archive ({})", e),
            ArchiveHint::NoCsvEntries => write!(f, "archive contains no .csv files"),
        }
    }
}

/// An archive selected for upload.
///
/// Cloning is cheap; the bytes are shared.
#[derive(Debug, Clone)]
pub struct ArchiveFile {
    file_name: String,
    bytes: Arc<[u8]>,
    hints: Vec<ArchiveHint>,
}

impl ArchiveFile {
    /// Wrap in-memory archive bytes.
    pub fn from_bytes(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let file_name = file_name.into();
        let bytes: Vec<u8> = bytes.into();
        let bytes: Arc<[u8]> = Arc::from(bytes);
        let hints = inspect(&file_name, &bytes);

        for hint in &hints {
            warn!("Archive '{}': {}", file_name, hint);
        }

        Self {
            file_name,
            bytes,
            hints,
        }
    }

    /// Read an archive from disk.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ArchiveError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());

        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "archive.zip".to_string());

        Ok(Self::from_bytes(file_name, bytes))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Hints computed when the archive was selected.
    pub fn hints(&self) -> &[ArchiveHint] {
        &self.hints
    }
}

fn inspect(file_name: &str, bytes: &[u8]) -> Vec<ArchiveHint> {
    let mut hints = Vec::new();

    if !file_name.to_ascii_lowercase().ends_with(".zip") {
        hints.push(ArchiveHint::NotZipExtension);
    }

    match zip::ZipArchive::new(Cursor::new(bytes)) {
        Ok(archive) => {
            let has_csv = archive
                .file_names()
                .any(|name| name.to_ascii_lowercase().ends_with(".csv"));
            if !has_csv {
                hints.push(ArchiveHint::NoCsvEntries);
            }
        }
        Err(e) => hints.push(ArchiveHint::Unreadable(e.to_string())),
    }

    hints
}

/// The pair of archive slots on the form.
#[derive(Debug, Clone, Default)]
pub struct FileSelection {
    signal: Option<ArchiveFile>,
    noise: Option<ArchiveFile>,
}

impl FileSelection {
    pub fn get(&self, role: FileRole) -> Option<&ArchiveFile> {
        match role {
            FileRole::Signal => self.signal.as_ref(),
            FileRole::Noise => self.noise.as_ref(),
        }
    }

    /// Assign a slot, replacing any previous selection.
    pub fn set(&mut self, role: FileRole, file: ArchiveFile) {
        *self.slot_mut(role) = Some(file);
    }

    pub fn clear(&mut self, role: FileRole) {
        *self.slot_mut(role) = None;
    }

    /// Both archives, if both are selected.
    pub fn pair(&self) -> Option<(&ArchiveFile, &ArchiveFile)> {
        self.signal.as_ref().zip(self.noise.as_ref())
    }

    pub fn is_complete(&self) -> bool {
        self.pair().is_some()
    }

    fn slot_mut(&mut self, role: FileRole) -> &mut Option<ArchiveFile> {
        match role {
            FileRole::Signal => &mut self.signal,
            FileRole::Noise => &mut self.noise,
        }
    }
}
