//! Completed archive information.

use super::manifest::{EntryKind, ManifestEntry};
use serde::Serialize;
use std::path::PathBuf;

/// An archive written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Archive {
    /// Location of the archive file.
    pub path: PathBuf,

    /// Number of regular files stored.
    pub files: usize,

    /// Number of directory entries stored.
    pub directories: usize,

    /// Number of symlinks and other special entries left out.
    pub skipped: usize,

    /// Uncompressed bytes of file content stored.
    pub bytes: u64,
}

impl Archive {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self {
            path,
            files: 0,
            directories: 0,
            skipped: 0,
            bytes: 0,
        }
    }

    pub(crate) fn record(&mut self, entry: &ManifestEntry, bytes: u64) {
        match entry.kind {
            EntryKind::Directory => self.directories += 1,
            EntryKind::File { .. } => {
                self.files += 1;
                self.bytes += bytes;
            }
        }
    }
}
