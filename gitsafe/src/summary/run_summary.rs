//! Run summary types.

use super::result::ProcessingResult;
use crate::scanner::ScanReport;
use crate::upload::UploadStatus;
use serde::Serialize;

/// Summary of a complete run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Number of repositories discovered under the root.
    pub repositories_found: usize,

    /// Number of repositories classified as stale.
    pub stale_found: usize,

    /// Number of repositories whose history couldn't be read.
    pub skipped: usize,

    /// Number of archives successfully created.
    pub archived: usize,

    /// Number of archives that failed.
    pub archive_failed: usize,

    /// Number of archives successfully uploaded.
    pub uploaded: usize,

    /// Number of uploads that failed.
    pub upload_failed: usize,

    /// Whether this was a dry run.
    pub dry_run: bool,

    /// Per-repository outcomes, in processing order.
    pub results: Vec<ProcessingResult>,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Records the counts from a finished scan.
    pub fn record_scan(&mut self, report: &ScanReport) {
        self.repositories_found = report.candidates;
        self.stale_found = report.stale.len();
        self.skipped = report.skipped.len();
    }

    /// Updates the summary with a processing result.
    pub fn record_result(&mut self, result: ProcessingResult) {
        match &result {
            ProcessingResult::Archived { upload, .. } => {
                self.archived += 1;
                match upload {
                    Some(UploadStatus::Uploaded { .. }) => self.uploaded += 1,
                    Some(UploadStatus::Failed { .. }) => self.upload_failed += 1,
                    None => {}
                }
            }
            ProcessingResult::Failed { .. } => self.archive_failed += 1,
        }
        self.results.push(result);
    }

    /// Returns true if any archive or upload failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.archive_failed > 0 || self.upload_failed > 0
    }

    /// Returns true if all operations were successful.
    #[must_use]
    pub fn all_success(&self) -> bool {
        !self.has_failures()
    }

    /// Serializes the summary as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archiver::Archive;
    use std::path::PathBuf;

    fn archived(upload: Option<UploadStatus>) -> ProcessingResult {
        ProcessingResult::Archived {
            repository: "/code/widget".to_string(),
            archive: Archive {
                path: PathBuf::from("/backups/widget_2024-06-01.zip"),
                files: 3,
                directories: 1,
                skipped: 0,
                bytes: 42,
            },
            upload,
        }
    }

    #[test]
    fn can_record_result() {
        let mut summary = RunSummary::new(false);

        summary.record_result(archived(Some(UploadStatus::Uploaded {
            destination: "/mnt/drive/widget_2024-06-01.zip".to_string(),
        })));

        assert_eq!(summary.archived, 1);
        assert_eq!(summary.uploaded, 1);
        assert_eq!(summary.results.len(), 1);
        assert!(summary.all_success());
    }

    #[test]
    fn upload_failure_counts_as_failure() {
        let mut summary = RunSummary::new(false);

        summary.record_result(archived(Some(UploadStatus::Failed {
            error: "permission denied".to_string(),
        })));

        assert_eq!(summary.archived, 1);
        assert_eq!(summary.upload_failed, 1);
        assert!(summary.has_failures());
    }

    #[test]
    fn archive_failure_counts_as_failure() {
        let mut summary = RunSummary::new(false);

        summary.record_result(ProcessingResult::Failed {
            repository: "/code/widget".to_string(),
            error: "Failed to read".to_string(),
        });

        assert_eq!(summary.archive_failed, 1);
        assert!(!summary.all_success());
    }

    #[test]
    fn serializes_to_json() {
        let mut summary = RunSummary::new(true);
        summary.record_result(archived(None));

        let json = summary.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["dry_run"], true);
        assert_eq!(value["archived"], 1);
        assert_eq!(value["results"][0]["result"], "archived");
        assert_eq!(value["results"][0]["archive"]["files"], 3);
    }
}
