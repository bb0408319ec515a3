//! Stale repository discovery.
//!
//! Walks a directory tree for `.git` directories, asks a [`HistoryLookup`]
//! for each repository's last commit and sorts the repositories into stale,
//! fresh and skipped. A repository whose history can't be read is logged and
//! skipped; only a failure to traverse the tree aborts the scan.

mod error;
mod report;
mod verdict;

pub use error::ScanError;
pub use report::{RepositoryCandidate, ScanReport, SkippedRepository, StaleRepository};
pub use verdict::{SkipReason, StalenessVerdict};

use crate::history::{resolve_history_timeout, GitHistory, HistoryLookup};
use crate::walk::{is_marker, walk_tree, WalkStep};
use chrono::{DateTime, Duration, FixedOffset, Utc};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, warn, Instrument};

/// Default number of history queries in flight at once.
pub const DEFAULT_SCAN_CONCURRENCY: usize = 4;

/// Finds stale repositories under `root` using the `git` executable.
///
/// Convenience wrapper around [`Scanner`] with a [`GitHistory`] lookup.
///
/// # Errors
///
/// Returns [`ScanError`] if the tree under `root` can't be traversed.
pub async fn find_stale_repositories(
    root: &Path,
    threshold_days: u32,
) -> Result<ScanReport, ScanError> {
    let lookup = GitHistory::new(resolve_history_timeout(None));
    Scanner::new(lookup, threshold_days)
        .find_stale_repositories(root)
        .await
}

/// Classifies repositories under a root against a staleness threshold.
#[derive(Debug, Clone)]
pub struct Scanner<L> {
    lookup: L,
    threshold_days: u32,
    concurrency: usize,
}

impl<L: HistoryLookup> Scanner<L> {
    /// Creates a scanner that treats repositories idle for more than
    /// `threshold_days` days as stale.
    pub fn new(lookup: L, threshold_days: u32) -> Self {
        Self {
            lookup,
            threshold_days,
            concurrency: DEFAULT_SCAN_CONCURRENCY,
        }
    }

    /// Sets how many history queries may run at once (minimum 1).
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Returns the staleness threshold in days.
    pub fn threshold_days(&self) -> u32 {
        self.threshold_days
    }

    /// Scans `root` relative to the current time.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] if the tree under `root` can't be traversed.
    pub async fn find_stale_repositories(&self, root: &Path) -> Result<ScanReport, ScanError> {
        self.find_stale_repositories_at(root, Utc::now()).await
    }

    /// Scans `root`, treating `now` as the current time.
    ///
    /// Results are reported in discovery order regardless of how many
    /// queries run concurrently.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] if the tree under `root` can't be traversed.
    pub async fn find_stale_repositories_at(
        &self,
        root: &Path,
        now: DateTime<Utc>,
    ) -> Result<ScanReport, ScanError> {
        let span = info_span!(
            "scan",
            root = %root.display(),
            threshold_days = self.threshold_days
        );

        async {
            let cutoff = staleness_cutoff(now, self.threshold_days);
            info!(cutoff = %cutoff, "Scanning for stale repositories");

            let owned_root = root.to_path_buf();
            let candidates =
                tokio::task::spawn_blocking(move || discover_repositories(&owned_root)).await??;
            info!(count = candidates.len(), "Discovered repositories");

            let verdicts: Vec<(RepositoryCandidate, StalenessVerdict)> =
                stream::iter(candidates)
                    .map(|candidate| async move {
                        let verdict = self.classify_candidate(&candidate, cutoff).await;
                        (candidate, verdict)
                    })
                    .buffered(self.concurrency)
                    .collect()
                    .await;

            let mut report = ScanReport::default();
            for (candidate, verdict) in verdicts {
                report.record(candidate, verdict);
            }

            info!(
                stale = report.stale.len(),
                fresh = report.fresh,
                skipped = report.skipped.len(),
                "Scan complete"
            );
            Ok(report)
        }
        .instrument(span)
        .await
    }

    async fn classify_candidate(
        &self,
        candidate: &RepositoryCandidate,
        cutoff: DateTime<Utc>,
    ) -> StalenessVerdict {
        match self.lookup.last_commit(&candidate.path).await {
            Ok(last_commit) => {
                let verdict = classify(last_commit, cutoff);
                debug!(
                    repo = %candidate.path.display(),
                    last_commit = %last_commit,
                    stale = verdict.is_stale(),
                    "Classified repository"
                );
                verdict
            }
            Err(e) => {
                warn!(
                    repo = %candidate.path.display(),
                    error = %e,
                    "Skipping repository, could not determine last commit"
                );
                StalenessVerdict::Skipped {
                    reason: SkipReason::from(&e),
                }
            }
        }
    }
}

/// Walks `root` and returns every directory containing a `.git` directory.
///
/// Marker directories are never descended into, but the working tree around
/// them is, so nested repositories are found too. Candidates are returned in
/// pre-order with siblings sorted by name.
///
/// # Errors
///
/// Returns [`ScanError::Walk`] if any part of the tree can't be read.
pub fn discover_repositories(root: &Path) -> Result<Vec<RepositoryCandidate>, ScanError> {
    let mut candidates = Vec::new();

    walk_tree(root, |entry| {
        if !(entry.file_type().is_dir() && is_marker(entry)) {
            return Ok::<_, ScanError>(WalkStep::Descend);
        }

        if let Some(repository) = entry.path().parent() {
            debug!(repo = %repository.display(), "Found repository");
            candidates.push(RepositoryCandidate {
                path: PathBuf::from(repository),
                marker: entry.path().to_path_buf(),
            });
        }
        Ok(WalkStep::Prune)
    })?;

    Ok(candidates)
}

/// Returns the instant before which a last commit counts as stale.
///
/// Days are 24 hours of absolute time. Thresholds reaching past the earliest
/// representable date clamp to it.
#[must_use]
pub fn staleness_cutoff(now: DateTime<Utc>, threshold_days: u32) -> DateTime<Utc> {
    now.checked_sub_signed(Duration::days(i64::from(threshold_days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Classifies a last-commit timestamp against a cutoff.
///
/// Only commits strictly before the cutoff are stale.
#[must_use]
pub fn classify(last_commit: DateTime<FixedOffset>, cutoff: DateTime<Utc>) -> StalenessVerdict {
    if last_commit.with_timezone(&Utc) < cutoff {
        StalenessVerdict::Stale { last_commit }
    } else {
        StalenessVerdict::Fresh { last_commit }
    }
}
