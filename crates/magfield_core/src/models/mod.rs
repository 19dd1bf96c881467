//! Data types shared by the workflow, the request layer and front ends.

mod archive;
mod parameters;
mod result;

pub use archive::{ArchiveError, ArchiveFile, ArchiveHint, FileRole, FileSelection};
pub use parameters::{AnalysisParameters, ParameterName, UnknownParameter};
pub use result::{AnalysisResult, AnalysisTimestamp};
