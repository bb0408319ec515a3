//! Runner error types.

/// Errors that abort a whole run.
///
/// Failures confined to one repository are recorded in the
/// [`RunSummary`](crate::summary::RunSummary) instead.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration loading errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// The scan root could not be traversed.
    #[error(transparent)]
    Scan(#[from] crate::scanner::ScanError),

    /// The archive output directory could not be created.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A history query timeout of zero would skip every repository.
    #[error("History query timeout must be at least one second")]
    ZeroHistoryTimeout,

    /// Uploading was requested without anywhere to upload to.
    #[error("Upload is enabled but no upload destination is configured")]
    MissingUploadDestination,
}
