//! Last-commit lookup for discovered repositories.
//!
//! The scanner only needs one fact from version control: when a repository
//! last changed. That fact comes from an external process whose output is not
//! trusted, so the lookup is a trait and every failure mode is an error value
//! the scanner can turn into a skip.

mod error;
mod git;

pub use error::HistoryError;
pub use git::GitHistory;

use chrono::{DateTime, FixedOffset};
use std::ffi::OsString;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding the git executable.
pub const GIT_PROGRAM_ENV: &str = "GITSAFE_GIT";

/// Environment variable overriding the history query timeout, in seconds.
pub const HISTORY_TIMEOUT_ENV: &str = "GITSAFE_HISTORY_TIMEOUT_SECS";

/// Default time a single history query may run before it is killed.
pub const DEFAULT_HISTORY_TIMEOUT: Duration = Duration::from_secs(30);

/// Format of `git log --date=iso` output, e.g. `2024-03-01 14:22:05 +0100`.
pub const COMMIT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Source of a repository's most recent change timestamp.
pub trait HistoryLookup: Send + Sync {
    /// Returns the timestamp of the most recent commit in `repository`.
    fn last_commit(
        &self,
        repository: &Path,
    ) -> impl Future<Output = Result<DateTime<FixedOffset>, HistoryError>> + Send;
}

/// Parses a commit date printed by `git log --date=iso`.
///
/// Surrounding whitespace (including the trailing newline) is ignored.
///
/// # Errors
///
/// Returns a [`chrono::ParseError`] if the text is not in [`COMMIT_DATE_FORMAT`].
pub fn parse_commit_date(output: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_str(output.trim(), COMMIT_DATE_FORMAT)
}

/// Resolves the git program from the environment, falling back to `git`.
pub(crate) fn resolve_git_program() -> OsString {
    std::env::var_os(GIT_PROGRAM_ENV)
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| OsString::from("git"))
}

/// Resolves the history query timeout.
///
/// An explicit value wins. Otherwise [`HISTORY_TIMEOUT_ENV`] is consulted,
/// and invalid or zero values there are ignored with a warning.
#[must_use]
pub fn resolve_history_timeout(explicit: Option<Duration>) -> Duration {
    if let Some(timeout) = explicit {
        return timeout;
    }
    if let Ok(value) = std::env::var(HISTORY_TIMEOUT_ENV) {
        match value.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => return Duration::from_secs(secs),
            _ => tracing::warn!(
                "Invalid {HISTORY_TIMEOUT_ENV} value '{value}': must be a positive number of seconds"
            ),
        }
    }
    DEFAULT_HISTORY_TIMEOUT
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_iso_commit_date_with_offset() {
        let parsed = parse_commit_date("2024-03-01 14:22:05 +0100\n").unwrap();

        assert_eq!(parsed.year(), 2024);
        assert_eq!(parsed.month(), 3);
        assert_eq!(parsed.day(), 1);
        assert_eq!(parsed.hour(), 14);
        assert_eq!(parsed.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn parses_negative_offset() {
        let parsed = parse_commit_date("2023-12-31 23:59:59 -0530").unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), -(5 * 3600 + 30 * 60));
    }

    #[test]
    fn rejects_default_git_date_format() {
        assert!(parse_commit_date("Fri Mar 1 14:22:05 2024 +0100").is_err());
    }

    #[test]
    fn rejects_garbage_and_empty_output() {
        assert!(parse_commit_date("This is not a valid date").is_err());
        assert!(parse_commit_date("").is_err());
        assert!(parse_commit_date("2024-03-01").is_err());
    }

    #[test]
    fn resolve_git_program_defaults_to_git() {
        temp_env::with_var_unset(GIT_PROGRAM_ENV, || {
            assert_eq!(resolve_git_program(), OsString::from("git"));
        });
    }

    #[test]
    fn resolve_git_program_uses_env() {
        temp_env::with_var(GIT_PROGRAM_ENV, Some("/opt/git/bin/git"), || {
            assert_eq!(resolve_git_program(), OsString::from("/opt/git/bin/git"));
        });
    }

    #[test]
    fn resolve_history_timeout_prefers_explicit_value() {
        temp_env::with_var(HISTORY_TIMEOUT_ENV, Some("5"), || {
            assert_eq!(
                resolve_history_timeout(Some(Duration::from_secs(9))),
                Duration::from_secs(9)
            );
        });
    }

    #[test]
    fn resolve_history_timeout_uses_env() {
        temp_env::with_var(HISTORY_TIMEOUT_ENV, Some("5"), || {
            assert_eq!(resolve_history_timeout(None), Duration::from_secs(5));
        });
    }

    #[test]
    fn resolve_history_timeout_ignores_invalid_env() {
        temp_env::with_var(HISTORY_TIMEOUT_ENV, Some("0"), || {
            assert_eq!(resolve_history_timeout(None), DEFAULT_HISTORY_TIMEOUT);
        });
        temp_env::with_var(HISTORY_TIMEOUT_ENV, Some("soon"), || {
            assert_eq!(resolve_history_timeout(None), DEFAULT_HISTORY_TIMEOUT);
        });
    }
}
