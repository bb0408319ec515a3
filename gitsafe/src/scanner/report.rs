//! Scan results.

use super::verdict::{SkipReason, StalenessVerdict};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::path::PathBuf;

/// A directory found to contain a repository marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryCandidate {
    /// Repository root (the marker's parent).
    pub path: PathBuf,

    /// The marker directory itself.
    pub marker: PathBuf,
}

/// A repository whose last commit predates the cutoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleRepository {
    /// Repository root.
    pub path: PathBuf,

    /// Timestamp of the most recent commit.
    pub last_commit: DateTime<FixedOffset>,
}

/// A repository that could not be classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRepository {
    /// Repository root.
    pub path: PathBuf,

    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Everything a scan learned, in discovery order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    /// Number of repositories discovered.
    pub candidates: usize,

    /// Stale repositories.
    pub stale: Vec<StaleRepository>,

    /// Repositories whose history could not be determined.
    pub skipped: Vec<SkippedRepository>,

    /// Number of repositories with a recent enough commit.
    pub fresh: usize,
}

impl ScanReport {
    /// Adds a classified candidate to the report.
    pub fn record(&mut self, candidate: RepositoryCandidate, verdict: StalenessVerdict) {
        self.candidates += 1;
        match verdict {
            StalenessVerdict::Stale { last_commit } => self.stale.push(StaleRepository {
                path: candidate.path,
                last_commit,
            }),
            StalenessVerdict::Fresh { .. } => self.fresh += 1,
            StalenessVerdict::Skipped { reason } => self.skipped.push(SkippedRepository {
                path: candidate.path,
                reason,
            }),
        }
    }

    /// Returns the stale repository paths in discovery order.
    #[must_use]
    pub fn stale_paths(&self) -> Vec<PathBuf> {
        self.stale.iter().map(|repo| repo.path.clone()).collect()
    }
}
