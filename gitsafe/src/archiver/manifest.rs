//! Archive manifest entries.

use std::fs::Metadata;
use std::path::{Component, Path};
use std::time::SystemTime;

/// Kind of entry written into an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A directory marker.
    Directory,
    /// A regular file and its size in bytes.
    File { size: u64 },
}

/// One file or directory destined for an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Path relative to the repository root, `/`-separated.
    pub relative_path: String,

    /// Directory or file.
    pub kind: EntryKind,

    /// Unix permission bits, where the platform has them.
    pub mode: Option<u32>,

    /// Last modification time, if the platform reports one.
    pub modified: Option<SystemTime>,
}

impl ManifestEntry {
    /// Builds an entry from a path relative to the root and its metadata.
    ///
    /// Returns `None` for anything that is neither a regular file nor a
    /// directory, such as symlinks, sockets and device nodes. `metadata` must
    /// come from `symlink_metadata` so that links are not followed.
    #[must_use]
    pub fn from_metadata(relative: &Path, metadata: &Metadata) -> Option<Self> {
        let file_type = metadata.file_type();
        let kind = if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File {
                size: metadata.len(),
            }
        } else {
            return None;
        };

        Some(Self {
            relative_path: relative_archive_path(relative),
            kind,
            mode: unix_mode(metadata),
            modified: metadata.modified().ok(),
        })
    }

    /// Returns true for directory entries.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Returns the name stored in the archive; directories end in `/`.
    #[must_use]
    pub fn archive_name(&self) -> String {
        if self.is_dir() {
            format!("{}/", self.relative_path)
        } else {
            self.relative_path.clone()
        }
    }
}

/// Joins the normal components of `relative` with `/`.
///
/// Non-UTF-8 names are converted lossily.
#[must_use]
pub fn relative_archive_path(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(unix)]
fn unix_mode(metadata: &Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(metadata.permissions().mode())
}

#[cfg(not(unix))]
fn unix_mode(_metadata: &Metadata) -> Option<u32> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn relative_paths_use_forward_slashes() {
        let relative: PathBuf = ["src", "nested", "lib.rs"].iter().collect();
        assert_eq!(relative_archive_path(&relative), "src/nested/lib.rs");
    }

    #[test]
    fn directory_names_get_trailing_slash() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("docs")).unwrap();
        fs::write(temp.path().join("README.md"), "hi").unwrap();

        let dir_meta = fs::symlink_metadata(temp.path().join("docs")).unwrap();
        let file_meta = fs::symlink_metadata(temp.path().join("README.md")).unwrap();

        let dir = ManifestEntry::from_metadata(Path::new("docs"), &dir_meta).unwrap();
        let file = ManifestEntry::from_metadata(Path::new("README.md"), &file_meta).unwrap();

        assert_eq!(dir.archive_name(), "docs/");
        assert_eq!(file.archive_name(), "README.md");
        assert_eq!(file.kind, EntryKind::File { size: 2 });
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_have_no_entry() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("target.txt"), "x").unwrap();
        std::os::unix::fs::symlink(temp.path().join("target.txt"), temp.path().join("link"))
            .unwrap();

        let meta = fs::symlink_metadata(temp.path().join("link")).unwrap();

        assert!(ManifestEntry::from_metadata(Path::new("link"), &meta).is_none());
    }
}
