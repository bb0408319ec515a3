//! History query error types.

use thiserror::Error;

/// Errors that can occur while looking up a repository's last commit.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The query process could not be started.
    #[error("Failed to run history query in '{path}': {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The query process exited unsuccessfully.
    #[error("History query in '{path}' failed ({status}): {stderr}")]
    NonZeroExit {
        path: String,
        status: String,
        stderr: String,
    },

    /// The query process did not finish in time and was killed.
    #[error("History query in '{path}' timed out after {timeout_secs} seconds")]
    Timeout { path: String, timeout_secs: u64 },

    /// The query output was not a timestamp in the expected format.
    #[error("Unparsable commit date '{output}' from '{path}': {source}")]
    Parse {
        path: String,
        output: String,
        #[source]
        source: chrono::ParseError,
    },
}
