//! Depth-first directory walking with per-entry pruning.
//!
//! Both the scanner and the archiver walk a tree the same way: pre-order,
//! siblings sorted by file name, symlinks never followed. The only thing that
//! differs is what they do with each entry and which subtrees they cut off,
//! so that decision is handed to a visitor closure.

mod error;

pub use error::WalkError;

use std::ffi::OsStr;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Name of the version-control metadata directory that marks a repository.
pub const REPOSITORY_MARKER: &str = ".git";

/// What the walker should do after visiting an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStep {
    /// Keep going, descending into the entry if it is a directory.
    Descend,
    /// Do not descend into the entry. Has no effect on non-directories.
    Prune,
}

/// Walks `root` depth-first in pre-order, calling `visit` for every entry.
///
/// The root itself is visited first (at depth 0). Returning [`WalkStep::Prune`]
/// for a directory skips its contents entirely.
///
/// # Errors
///
/// Stops at the first error, either from reading the tree (converted from
/// [`WalkError`]) or returned by `visit`.
pub fn walk_tree<E, F>(root: &Path, mut visit: F) -> Result<(), E>
where
    E: From<WalkError>,
    F: FnMut(&DirEntry) -> Result<WalkStep, E>,
{
    let mut entries = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = entries.next() {
        let entry = entry.map_err(|source| WalkError::Io {
            path: source.path().unwrap_or(root).display().to_string(),
            source,
        })?;

        // skip_current_dir on a file would skip the rest of its parent
        if visit(&entry)? == WalkStep::Prune && entry.file_type().is_dir() {
            entries.skip_current_dir();
        }
    }

    Ok(())
}

/// Returns true if the entry's own name is the repository marker.
#[must_use]
pub fn is_marker(entry: &DirEntry) -> bool {
    entry.file_name() == OsStr::new(REPOSITORY_MARKER)
}
