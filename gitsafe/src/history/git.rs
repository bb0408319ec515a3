//! History lookup backed by the `git` executable.

use super::{parse_commit_date, resolve_git_program, HistoryError, HistoryLookup};
use crate::walk::REPOSITORY_MARKER;
use chrono::{DateTime, FixedOffset};
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Asks `git log` for the committer date of `HEAD`.
///
/// Runs `git --git-dir=<repo>/.git log -1 --format=%cd --date=iso` inside the
/// repository. The child is killed if it outlives the configured timeout.
#[derive(Debug, Clone)]
pub struct GitHistory {
    program: OsString,
    timeout: Duration,
}

impl GitHistory {
    /// Creates a lookup using the `git` program from `GITSAFE_GIT` or `PATH`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: resolve_git_program(),
            timeout,
        }
    }

    /// Uses a specific program instead of the resolved `git`.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Returns the program that will be executed.
    pub fn program(&self) -> &OsString {
        &self.program
    }

    /// Returns the per-query timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the `git log` invocation for one repository.
    ///
    /// The git directory is passed explicitly and inherited repository
    /// variables are cleared, so git never answers for a different or an
    /// enclosing repository.
    fn query_command(&self, repository: &Path) -> Command {
        let mut git_dir = OsString::from("--git-dir=");
        git_dir.push(repository.join(REPOSITORY_MARKER));

        let mut command = Command::new(&self.program);
        command
            .arg(git_dir)
            .args(["log", "-1", "--format=%cd", "--date=iso"])
            .current_dir(repository)
            .env_remove("GIT_WORK_TREE")
            .env_remove("GIT_INDEX_FILE")
            .env_remove("GIT_OBJECT_DIRECTORY")
            .env_remove("GIT_ALTERNATE_OBJECT_DIRECTORIES")
            .env_remove("GIT_COMMON_DIR")
            .env_remove("GIT_DIR")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

impl HistoryLookup for GitHistory {
    async fn last_commit(&self, repository: &Path) -> Result<DateTime<FixedOffset>, HistoryError> {
        let path = repository.display().to_string();
        debug!(repo = %path, "Querying last commit date");

        let mut command = self.query_command(repository);
        let query = command.output();

        let output = tokio::time::timeout(self.timeout, query)
            .await
            .map_err(|_| HistoryError::Timeout {
                path: path.clone(),
                timeout_secs: self.timeout.as_secs(),
            })?
            .map_err(|source| HistoryError::Spawn {
                path: path.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HistoryError::NonZeroExit {
                path,
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_commit_date(&stdout).map_err(|source| HistoryError::Parse {
            path,
            output: stdout.trim().to_string(),
            source,
        })
    }
}
