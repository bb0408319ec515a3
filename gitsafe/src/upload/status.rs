//! Upload status types.

use serde::Serialize;

/// Outcome of uploading one archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadStatus {
    /// The archive was uploaded.
    Uploaded {
        /// Where the archive ended up.
        destination: String,
    },

    /// The upload failed; the local archive is kept.
    Failed {
        /// Error message.
        error: String,
    },
}

impl UploadStatus {
    /// Returns the status as a string for display.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploaded { .. } => "uploaded",
            Self::Failed { .. } => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_upload_status_to_string() {
        assert_eq!(
            UploadStatus::Uploaded {
                destination: "/mnt/backup/a.zip".to_string()
            }
            .as_str(),
            "uploaded"
        );
        assert_eq!(
            UploadStatus::Failed {
                error: "disk full".to_string()
            }
            .as_str(),
            "failed"
        );
    }
}
