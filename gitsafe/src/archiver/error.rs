//! Archiver error types.

use crate::walk::WalkError;
use thiserror::Error;

/// Errors that can occur while building an archive.
///
/// Any of these leaves the archive at the destination path incomplete.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// No file name could be derived from the repository path.
    #[error("Cannot derive an archive name from '{path}'")]
    InvalidRepositoryName { path: String },

    /// The archive file could not be created.
    #[error("Failed to create archive '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The repository tree could not be traversed.
    #[error(transparent)]
    Walk(#[from] WalkError),

    /// A walked entry was not below the repository root.
    #[error("Entry '{path}' is outside the repository root")]
    OutsideRoot { path: String },

    /// A source entry's metadata could not be read.
    #[error("Failed to read metadata for '{path}': {source}")]
    Metadata {
        path: String,
        #[source]
        source: walkdir::Error,
    },

    /// A source file could not be read into the archive.
    #[error("Failed to read '{path}': {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Buffered archive data could not be flushed to disk.
    #[error("Failed to finish archive '{path}': {source}")]
    Finish {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The zip writer rejected an entry or failed to finish.
    #[error("Failed to write archive '{path}': {source}")]
    Zip {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },
}
