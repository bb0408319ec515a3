//! Shipping finished archives to a backup location.

mod error;
mod status;

pub use error::UploadError;
pub use status::UploadStatus;

use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, Instrument};

/// Environment variable naming the upload directory when none is configured.
pub const UPLOAD_DIR_ENV: &str = "GITSAFE_UPLOAD_DIR";

/// Resolves the upload directory.
///
/// An explicit value wins; otherwise a non-empty [`UPLOAD_DIR_ENV`] is used.
#[must_use]
pub fn resolve_upload_dir(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(|| {
        std::env::var_os(UPLOAD_DIR_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    })
}

/// A destination that accepts finished archives.
pub trait UploadSink: Send + Sync {
    /// Uploads the archive at `archive`, returning where it was placed.
    fn upload(&self, archive: &Path) -> impl Future<Output = Result<PathBuf, UploadError>> + Send;
}

/// Copies archives into a mirror directory.
///
/// Point it at a network share or a folder synced by a cloud-drive client to
/// get an off-machine copy. Existing files with the same name are replaced.
#[derive(Debug, Clone)]
pub struct DirectoryUpload {
    destination: PathBuf,
}

impl DirectoryUpload {
    /// Creates a sink copying into `destination`, created on first upload.
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
        }
    }

    /// Returns the mirror directory.
    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

impl UploadSink for DirectoryUpload {
    async fn upload(&self, archive: &Path) -> Result<PathBuf, UploadError> {
        let span = info_span!(
            "upload",
            archive = %archive.display(),
            destination = %self.destination.display()
        );

        async {
            let file_name = archive
                .file_name()
                .ok_or_else(|| UploadError::MissingFileName {
                    path: archive.display().to_string(),
                })?;

            tokio::fs::create_dir_all(&self.destination)
                .await
                .map_err(|source| UploadError::CreateDestination {
                    path: self.destination.display().to_string(),
                    source,
                })?;

            let target = self.destination.join(file_name);
            if is_same_location(archive, &target).await {
                // copying a file onto itself would truncate it
                debug!("Archive already in upload destination");
                return Ok(target);
            }

            let bytes = tokio::fs::copy(archive, &target)
                .await
                .map_err(|source| UploadError::Copy {
                    from: archive.display().to_string(),
                    to: target.display().to_string(),
                    source,
                })?;

            info!(bytes, target = %target.display(), "Uploaded archive");
            Ok(target)
        }
        .instrument(span)
        .await
    }
}

async fn is_same_location(a: &Path, b: &Path) -> bool {
    match (
        tokio::fs::canonicalize(a).await,
        tokio::fs::canonicalize(b).await,
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
