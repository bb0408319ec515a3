//! Scanner error types.

use crate::walk::WalkError;
use thiserror::Error;

/// Errors that abort a scan.
///
/// Failures classifying a single repository are never reported here; they
/// end up in [`ScanReport::skipped`](super::ScanReport::skipped) instead.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The directory tree could not be traversed.
    #[error(transparent)]
    Walk(#[from] WalkError),

    /// The background traversal task was cancelled or panicked.
    #[error("Repository discovery task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
