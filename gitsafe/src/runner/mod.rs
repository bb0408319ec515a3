//! Orchestrates scanning, archiving and uploading.

mod config;
mod error;

pub use config::{RunnerConfig, DEFAULT_OUTPUT_DIR, DEFAULT_THRESHOLD_DAYS};
pub use error::RunnerError;

use crate::archiver::{archive_file_name, create_archive_on, ArchiveError};
use crate::history::{GitHistory, HistoryLookup};
use crate::scanner::{ScanReport, Scanner};
use crate::summary::{ProcessingResult, RunSummary};
use crate::upload::{DirectoryUpload, UploadSink, UploadStatus};
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Runs a full scan, archive and upload pass.
pub struct Runner<L = GitHistory, U = DirectoryUpload> {
    config: RunnerConfig,
    scanner: Scanner<L>,
    uploader: Option<U>,
}

impl Runner {
    /// Builds a runner using `git` for history and a directory upload sink.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::MissingUploadDestination`] if uploading is
    /// enabled without an upload directory, and
    /// [`RunnerError::ZeroHistoryTimeout`] if the history timeout is zero.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        let timeout = config.history_timeout();
        if timeout.is_zero() {
            return Err(RunnerError::ZeroHistoryTimeout);
        }
        let uploader = if config.upload() {
            let destination = config
                .upload_dir()
                .ok_or(RunnerError::MissingUploadDestination)?;
            Some(DirectoryUpload::new(destination))
        } else {
            None
        };
        let lookup = GitHistory::new(timeout);
        Ok(Self::with_parts(config, lookup, uploader))
    }
}

impl<L: HistoryLookup, U: UploadSink> Runner<L, U> {
    /// Builds a runner from explicit history and upload implementations.
    ///
    /// Archives are uploaded only when `uploader` is present.
    pub fn with_parts(config: RunnerConfig, lookup: L, uploader: Option<U>) -> Self {
        let scanner = Scanner::new(lookup, config.threshold_days())
            .with_concurrency(config.scan_concurrency());
        Self {
            config,
            scanner,
            uploader,
        }
    }

    /// Returns the configuration this runner was built with.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Executes the full flow.
    ///
    /// Per-repository archive and upload failures are logged and recorded in
    /// the summary; they don't stop the run.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if the output directory can't be created or
    /// the scan root can't be traversed.
    pub async fn run(&self) -> Result<RunSummary, RunnerError> {
        let mut summary = RunSummary::new(self.config.dry_run());

        if !self.config.dry_run() {
            let output_dir = self.config.output_dir();
            tokio::fs::create_dir_all(output_dir)
                .await
                .map_err(|source| RunnerError::OutputDir {
                    path: output_dir.display().to_string(),
                    source,
                })?;
        }

        info!(
            root = %self.config.root().display(),
            days = self.config.threshold_days(),
            "Scanning for stale repositories"
        );
        let report = self
            .scanner
            .find_stale_repositories(self.config.root())
            .await?;
        summary.record_scan(&report);

        if report.stale.is_empty() {
            info!("No stale repositories found");
            return Ok(summary);
        }

        info!(count = report.stale.len(), "Found stale repositories");

        if self.config.dry_run() {
            print_dry_run_preview(&report, self.config.output_dir());
            return Ok(summary);
        }

        // One at a time: two repositories sharing a base name map to the
        // same archive, and the later one must win.
        for repository in report.stale_paths() {
            let result = self.process_repository(&repository).await;
            summary.record_result(result);
        }

        Ok(summary)
    }

    async fn process_repository(&self, repository: &Path) -> ProcessingResult {
        info!(repo = %repository.display(), "Archiving repository");

        let date = Local::now().date_naive();
        let source = repository.to_path_buf();
        let output_dir = self.config.output_dir().to_path_buf();
        let outcome =
            tokio::task::spawn_blocking(move || create_archive_on(&source, &output_dir, date))
                .await;

        let archive = match outcome {
            Ok(Ok(archive)) => archive,
            Ok(Err(e)) => {
                error!(
                    repo = %repository.display(),
                    error = %e,
                    "Failed to archive repository"
                );
                if removes_partial_archive(&e) {
                    remove_partial_archive(self.config.output_dir(), repository, date).await;
                }
                return ProcessingResult::Failed {
                    repository: repository.display().to_string(),
                    error: e.to_string(),
                };
            }
            Err(e) => {
                error!(
                    repo = %repository.display(),
                    error = %e,
                    "Archive task failed"
                );
                remove_partial_archive(self.config.output_dir(), repository, date).await;
                return ProcessingResult::Failed {
                    repository: repository.display().to_string(),
                    error: e.to_string(),
                };
            }
        };

        let upload = match &self.uploader {
            Some(uploader) => Some(match uploader.upload(&archive.path).await {
                Ok(destination) => UploadStatus::Uploaded {
                    destination: destination.display().to_string(),
                },
                Err(e) => {
                    warn!(
                        repo = %repository.display(),
                        archive = %archive.path.display(),
                        error = %e,
                        "Failed to upload archive, keeping local copy"
                    );
                    UploadStatus::Failed {
                        error: e.to_string(),
                    }
                }
            }),
            None => None,
        };

        ProcessingResult::Archived {
            repository: repository.display().to_string(),
            archive,
            upload,
        }
    }
}

/// Deletes the archive a failed attempt left in `output_dir`, if any.
async fn remove_partial_archive(output_dir: &Path, repository: &Path, date: NaiveDate) {
    let Some(path) = archive_path_for(output_dir, repository, date) else {
        return;
    };
    match tokio::fs::remove_file(&path).await {
        Ok(()) => debug!(archive = %path.display(), "Removed partial archive"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            archive = %path.display(),
            error = %e,
            "Failed to remove partial archive"
        ),
    }
}

/// Whether a failed archive attempt may have left a partial file behind.
///
/// A failure to create the file at all means any file at that path predates
/// this attempt, so it is left alone.
fn removes_partial_archive(error: &ArchiveError) -> bool {
    !matches!(
        error,
        ArchiveError::InvalidRepositoryName { .. } | ArchiveError::CreateFile { .. }
    )
}

fn archive_path_for(output_dir: &Path, repository: &Path, date: NaiveDate) -> Option<PathBuf> {
    archive_file_name(repository, date)
        .ok()
        .map(|name| output_dir.join(name))
}

fn print_dry_run_preview(report: &ScanReport, output_dir: &Path) {
    let date = Local::now().date_naive();

    println!("\n[DRY RUN] Found {} stale repositories:\n", report.stale.len());
    for (i, repo) in report.stale.iter().enumerate() {
        println!(
            "  [{}/{}] {}",
            i + 1,
            report.stale.len(),
            repo.path.display()
        );
        println!("    Last commit: {}", repo.last_commit);
        if let Some(path) = archive_path_for(output_dir, &repo.path, date) {
            println!("    Would archive to: {}", path.display());
        }
    }

    if !report.skipped.is_empty() {
        println!("\n  Skipped {} repositories:", report.skipped.len());
        for repo in &report.skipped {
            println!("    {} ({})", repo.path.display(), repo.reason.as_str());
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_failures_keep_existing_files() {
        let create = ArchiveError::CreateFile {
            path: "/backups/a.zip".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        let read = ArchiveError::ReadFile {
            path: "/code/a/file".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };

        assert!(!removes_partial_archive(&create));
        assert!(removes_partial_archive(&read));
    }

    #[test]
    fn archive_path_uses_archive_name() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let path = archive_path_for(Path::new("/backups"), Path::new("/code/widget"), date);

        assert_eq!(path, Some(PathBuf::from("/backups/widget_2024-06-01.zip")));
    }

    #[tokio::test]
    async fn removes_archive_left_by_failed_attempt() {
        let temp = tempfile::TempDir::new().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let repository = Path::new("/code/widget");
        let partial = archive_path_for(temp.path(), repository, date).unwrap();
        std::fs::write(&partial, b"PK\x03\x04truncated").unwrap();
        let unrelated = temp.path().join("other_2024-06-01.zip");
        std::fs::write(&unrelated, b"keep").unwrap();

        remove_partial_archive(temp.path(), repository, date).await;

        assert!(!partial.exists());
        assert!(unrelated.exists());
    }

    #[tokio::test]
    async fn removing_missing_archive_is_quiet() {
        let temp = tempfile::TempDir::new().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        remove_partial_archive(temp.path(), Path::new("/code/widget"), date).await;

        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn zero_history_timeout_is_rejected() {
        let config = RunnerConfig::new(PathBuf::from("/code"))
            .with_history_timeout(std::time::Duration::ZERO);

        let result = Runner::new(config);

        assert!(matches!(result, Err(RunnerError::ZeroHistoryTimeout)));
    }
}
