//! Directory walk error types.

use thiserror::Error;

/// Errors that can occur while walking a directory tree.
#[derive(Debug, Error)]
pub enum WalkError {
    /// Failed to read a directory or an entry's metadata.
    #[error("Failed to walk '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: walkdir::Error,
    },
}

impl WalkError {
    /// Returns the underlying I/O error kind, if the failure came from the OS.
    #[must_use]
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            Self::Io { source, .. } => source.io_error().map(std::io::Error::kind),
        }
    }
}
