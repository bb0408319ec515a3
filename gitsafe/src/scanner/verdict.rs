//! Staleness classification results.

use crate::history::HistoryError;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// Outcome of classifying one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum StalenessVerdict {
    /// Last commit is strictly older than the cutoff.
    Stale {
        /// Timestamp of the most recent commit.
        last_commit: DateTime<FixedOffset>,
    },

    /// Last commit is at or after the cutoff.
    Fresh {
        /// Timestamp of the most recent commit.
        last_commit: DateTime<FixedOffset>,
    },

    /// The repository could not be classified.
    Skipped {
        /// Why classification failed.
        reason: SkipReason,
    },
}

impl StalenessVerdict {
    /// Returns true for [`StalenessVerdict::Stale`].
    #[must_use]
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }
}

/// Why a repository was left out of the scan results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The history query could not be started.
    QueryFailed { message: String },

    /// The history query exited with an error status.
    NonZeroExit { status: String, stderr: String },

    /// The history query was killed after running too long.
    TimedOut { timeout_secs: u64 },

    /// The history query printed something that is not a commit date.
    UnparsableTimestamp { output: String },
}

impl SkipReason {
    /// Returns the reason as a short string for display.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QueryFailed { .. } => "query failed",
            Self::NonZeroExit { .. } => "nonzero exit",
            Self::TimedOut { .. } => "timed out",
            Self::UnparsableTimestamp { .. } => "unparsable timestamp",
        }
    }
}

impl From<&HistoryError> for SkipReason {
    fn from(error: &HistoryError) -> Self {
        match error {
            HistoryError::Spawn { source, .. } => Self::QueryFailed {
                message: source.to_string(),
            },
            HistoryError::NonZeroExit { status, stderr, .. } => Self::NonZeroExit {
                status: status.clone(),
                stderr: stderr.clone(),
            },
            HistoryError::Timeout { timeout_secs, .. } => Self::TimedOut {
                timeout_secs: *timeout_secs,
            },
            HistoryError::Parse { output, .. } => Self::UnparsableTimestamp {
                output: output.clone(),
            },
        }
    }
}
