//! Processing result types.

use crate::archiver::Archive;
use crate::upload::UploadStatus;
use serde::Serialize;

/// Result of processing a single stale repository.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ProcessingResult {
    /// The repository was archived.
    Archived {
        /// Repository path.
        repository: String,
        /// The archive written.
        archive: Archive,
        /// Upload outcome, when uploading is enabled.
        upload: Option<UploadStatus>,
    },

    /// Archiving failed.
    Failed {
        /// Repository path.
        repository: String,
        /// Error message.
        error: String,
    },
}

impl ProcessingResult {
    /// Returns the repository this result belongs to.
    #[must_use]
    pub fn repository(&self) -> &str {
        match self {
            Self::Archived { repository, .. } | Self::Failed { repository, .. } => repository,
        }
    }
}
