//! Upload error types.

use thiserror::Error;

/// Errors that can occur while uploading an archive.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The archive path has no file name to upload under.
    #[error("Archive path '{path}' has no file name")]
    MissingFileName { path: String },

    /// The upload destination could not be created.
    #[error("Failed to create upload destination '{path}': {source}")]
    CreateDestination {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The archive could not be copied to the destination.
    #[error("Failed to copy '{from}' to '{to}': {source}")]
    Copy {
        from: String,
        to: String,
        #[source]
        source: std::io::Error,
    },
}
