//! Zip snapshots of repository working trees.
//!
//! An archive holds every directory and regular file below the repository
//! root, keyed by `/`-separated relative paths, with permission bits and
//! modification times preserved. Anything named `.git` is left out along with
//! everything beneath it. Symlinks and other special files are skipped.
//!
//! Entries are streamed straight into the destination file while the tree is
//! walked, so an error leaves a truncated archive behind. Callers should treat
//! the file as unusable when an error is returned.

mod archive;
mod error;
mod manifest;

pub use archive::Archive;
pub use error::ArchiveError;
pub use manifest::{relative_archive_path, EntryKind, ManifestEntry};

use crate::walk::{is_marker, walk_tree, WalkStep};
use chrono::{DateTime, Datelike, Local, NaiveDate, Timelike};
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, info_span};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// File extension of produced archives.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Entries at least this large are written with zip64 extensions.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Archives `repository` into `destination`, dated with today's local date.
///
/// # Errors
///
/// See [`create_archive_on`].
pub fn create_archive(repository: &Path, destination: &Path) -> Result<Archive, ArchiveError> {
    create_archive_on(repository, destination, Local::now().date_naive())
}

/// Archives `repository` into `destination/{name}_{date}.zip`.
///
/// An existing archive with the same name is overwritten.
///
/// # Errors
///
/// Returns [`ArchiveError`] if the archive can't be created, the tree can't be
/// walked, or a file can't be read. The partially written archive is left in
/// place.
pub fn create_archive_on(
    repository: &Path,
    destination: &Path,
    date: NaiveDate,
) -> Result<Archive, ArchiveError> {
    let archive_path = destination.join(archive_file_name(repository, date)?);
    let span = info_span!(
        "archive",
        repo = %repository.display(),
        archive = %archive_path.display()
    );
    let _guard = span.enter();

    info!("Creating archive");
    let file = File::create(&archive_path).map_err(|source| ArchiveError::CreateFile {
        path: archive_path.display().to_string(),
        source,
    })?;
    // The archive may sit inside the tree being archived.
    let own_file = archive_path.canonicalize().ok();

    let mut zip = ZipWriter::new(BufWriter::new(file));
    let mut archive = Archive::new(archive_path.clone());

    walk_tree::<ArchiveError, _>(repository, |entry| {
        if entry.depth() == 0 {
            return Ok(WalkStep::Descend);
        }
        if is_marker(entry) {
            debug!(path = %entry.path().display(), "Pruning version-control metadata");
            return Ok(WalkStep::Prune);
        }
        if is_same_file(entry.path(), entry.file_name(), own_file.as_deref()) {
            debug!("Skipping the archive being written");
            return Ok(WalkStep::Descend);
        }

        let relative = entry.path().strip_prefix(repository).map_err(|_| {
            ArchiveError::OutsideRoot {
                path: entry.path().display().to_string(),
            }
        })?;
        let metadata = entry.metadata().map_err(|source| ArchiveError::Metadata {
            path: entry.path().display().to_string(),
            source,
        })?;

        match ManifestEntry::from_metadata(relative, &metadata) {
            Some(manifest) => {
                let written = write_entry(&mut zip, &manifest, entry.path(), &archive_path)?;
                archive.record(&manifest, written);
            }
            None => {
                debug!(path = %entry.path().display(), "Skipping non-regular entry");
                archive.skipped += 1;
            }
        }
        Ok(WalkStep::Descend)
    })?;

    let mut inner = zip.finish().map_err(|source| ArchiveError::Zip {
        path: archive_path.display().to_string(),
        source,
    })?;
    inner.flush().map_err(|source| ArchiveError::Finish {
        path: archive_path.display().to_string(),
        source,
    })?;

    info!(
        files = archive.files,
        directories = archive.directories,
        skipped = archive.skipped,
        bytes = archive.bytes,
        "Archive complete"
    );
    Ok(archive)
}

/// Returns the archive file name for `repository` on `date`.
///
/// The name is `{base name}_{YYYY-MM-DD}.zip`. Paths without a final
/// component (such as `..`) are canonicalized to find one.
///
/// # Errors
///
/// Returns [`ArchiveError::InvalidRepositoryName`] for paths like `/`.
pub fn archive_file_name(repository: &Path, date: NaiveDate) -> Result<String, ArchiveError> {
    let base = repository
        .file_name()
        .map(PathBuf::from)
        .or_else(|| {
            repository
                .canonicalize()
                .ok()
                .and_then(|path| path.file_name().map(PathBuf::from))
        })
        .ok_or_else(|| ArchiveError::InvalidRepositoryName {
            path: repository.display().to_string(),
        })?;

    Ok(format!(
        "{}_{}.{ARCHIVE_EXTENSION}",
        base.to_string_lossy(),
        date.format("%Y-%m-%d")
    ))
}

/// Writes one manifest entry, returning the number of content bytes copied.
fn write_entry<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    entry: &ManifestEntry,
    source_path: &Path,
    archive_path: &Path,
) -> Result<u64, ArchiveError> {
    let zip_error = |source| ArchiveError::Zip {
        path: archive_path.display().to_string(),
        source,
    };
    let options = entry_options(entry);

    match entry.kind {
        EntryKind::Directory => {
            zip.add_directory(entry.archive_name(), options)
                .map_err(zip_error)?;
            Ok(0)
        }
        EntryKind::File { .. } => {
            let read_error = |source| ArchiveError::ReadFile {
                path: source_path.display().to_string(),
                source,
            };
            let mut file = File::open(source_path).map_err(read_error)?;
            zip.start_file(entry.archive_name(), options)
                .map_err(zip_error)?;
            std::io::copy(&mut file, zip).map_err(read_error)
        }
    }
}

fn entry_options(entry: &ManifestEntry) -> SimpleFileOptions {
    let mut options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip_timestamp(entry.modified));
    if let Some(mode) = entry.mode {
        options = options.unix_permissions(mode);
    }
    if let EntryKind::File { size } = entry.kind {
        options = options.large_file(size >= ZIP64_THRESHOLD);
    }
    options
}

/// Converts a modification time to a zip (DOS, local time) timestamp.
///
/// Times the format can't represent, including anything before 1980, become
/// 1980-01-01 00:00:00.
fn zip_timestamp(modified: Option<SystemTime>) -> zip::DateTime {
    modified
        .and_then(|time| {
            let local: DateTime<Local> = time.into();
            let year = u16::try_from(local.year()).ok()?;
            zip::DateTime::from_date_and_time(
                year,
                local.month() as u8,
                local.day() as u8,
                local.hour() as u8,
                local.minute() as u8,
                local.second() as u8,
            )
            .ok()
        })
        .unwrap_or_default()
}

fn is_same_file(path: &Path, name: &OsStr, own_file: Option<&Path>) -> bool {
    let Some(own_file) = own_file else {
        return false;
    };
    own_file.file_name() == Some(name) && path.canonicalize().ok().as_deref() == Some(own_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn names_archive_from_base_name_and_date() {
        let name = archive_file_name(Path::new("/home/me/code/widget"), date()).unwrap();
        assert_eq!(name, "widget_2024-06-01.zip");
    }

    #[test]
    fn trailing_dot_components_are_ignored() {
        let name = archive_file_name(Path::new("/home/me/code/widget/."), date()).unwrap();
        assert_eq!(name, "widget_2024-06-01.zip");
    }

    #[test]
    fn root_path_has_no_archive_name() {
        let result = archive_file_name(Path::new("/"), date());
        assert!(matches!(
            result,
            Err(ArchiveError::InvalidRepositoryName { .. })
        ));
    }

    #[test]
    fn timestamp_keeps_local_date_and_time() {
        let local = Local.with_ymd_and_hms(2021, 7, 14, 9, 30, 12).unwrap();
        let stamp = zip_timestamp(Some(local.into()));

        assert_eq!(stamp.year(), 2021);
        assert_eq!(stamp.month(), 7);
        assert_eq!(stamp.day(), 14);
        assert_eq!(stamp.hour(), 9);
        assert_eq!(stamp.minute(), 30);
        // DOS timestamps have two-second resolution
        assert_eq!(stamp.second(), 12);
    }

    #[test]
    fn timestamp_before_1980_falls_back_to_dos_epoch() {
        let stamp = zip_timestamp(Some(SystemTime::UNIX_EPOCH));
        assert_eq!(stamp.year(), 1980);
        assert_eq!(stamp.month(), 1);
        assert_eq!(stamp.day(), 1);
    }

    #[test]
    fn missing_timestamp_falls_back_to_dos_epoch() {
        assert_eq!(zip_timestamp(None).year(), 1980);
    }
}
