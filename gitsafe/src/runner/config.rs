//! Runner configuration.

use crate::config::FileConfig;
use crate::history::resolve_history_timeout;
use crate::scanner::DEFAULT_SCAN_CONCURRENCY;
use crate::upload::resolve_upload_dir;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Days without a commit before a repository is considered stale.
pub const DEFAULT_THRESHOLD_DAYS: u32 = 60;

/// Directory archives are written to when none is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "./backups";

/// Configuration for a scan-and-archive run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Directory tree to search for repositories.
    root: PathBuf,
    /// Staleness threshold in days.
    threshold_days: u32,
    /// Directory archives are written to.
    output_dir: PathBuf,
    /// Whether archives are uploaded after creation.
    upload: bool,
    /// Directory uploads are copied into.
    upload_dir: Option<PathBuf>,
    /// Maximum concurrent history queries.
    scan_concurrency: usize,
    /// Explicit history query timeout.
    history_timeout: Option<Duration>,
    /// Whether to only report what would be archived.
    dry_run: bool,
}

impl RunnerConfig {
    /// Creates a configuration scanning `root` with default settings.
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            threshold_days: DEFAULT_THRESHOLD_DAYS,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            upload: false,
            upload_dir: None,
            scan_concurrency: DEFAULT_SCAN_CONCURRENCY,
            history_timeout: None,
            dry_run: false,
        }
    }

    /// Applies every setting present in a config file.
    #[must_use]
    pub fn with_file_config(mut self, file: &FileConfig) -> Self {
        if let Some(days) = file.scan.days {
            self.threshold_days = days;
        }
        if let Some(concurrency) = file.scan.concurrency {
            self.scan_concurrency = concurrency;
        }
        if let Some(secs) = file.scan.history_timeout_secs {
            self.history_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(out) = &file.archive.out {
            self.output_dir = out.clone();
        }
        if let Some(enabled) = file.upload.enabled {
            self.upload = enabled;
        }
        if let Some(destination) = &file.upload.destination {
            self.upload_dir = Some(destination.clone());
        }
        self
    }

    /// Sets the staleness threshold in days.
    #[must_use]
    pub fn with_threshold_days(mut self, threshold_days: u32) -> Self {
        self.threshold_days = threshold_days;
        self
    }

    /// Sets the archive output directory.
    #[must_use]
    pub fn with_output_dir(mut self, output_dir: PathBuf) -> Self {
        self.output_dir = output_dir;
        self
    }

    /// Enables or disables uploading.
    #[must_use]
    pub fn with_upload(mut self, upload: bool) -> Self {
        self.upload = upload;
        self
    }

    /// Sets the upload destination directory.
    #[must_use]
    pub fn with_upload_dir(mut self, upload_dir: PathBuf) -> Self {
        self.upload_dir = Some(upload_dir);
        self
    }

    /// Sets the maximum number of concurrent history queries.
    #[must_use]
    pub fn with_scan_concurrency(mut self, scan_concurrency: usize) -> Self {
        self.scan_concurrency = scan_concurrency;
        self
    }

    /// Sets the history query timeout.
    #[must_use]
    pub fn with_history_timeout(mut self, history_timeout: Duration) -> Self {
        self.history_timeout = Some(history_timeout);
        self
    }

    /// Enables or disables dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Returns the scan root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the staleness threshold in days.
    pub fn threshold_days(&self) -> u32 {
        self.threshold_days
    }

    /// Returns the archive output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Returns whether uploading is enabled.
    pub fn upload(&self) -> bool {
        self.upload
    }

    /// Returns the upload destination, falling back to the environment.
    pub fn upload_dir(&self) -> Option<PathBuf> {
        resolve_upload_dir(self.upload_dir.as_deref())
    }

    /// Returns the maximum number of concurrent history queries.
    pub fn scan_concurrency(&self) -> usize {
        self.scan_concurrency
    }

    /// Returns the history query timeout, falling back to the environment
    /// and then the built-in default.
    pub fn history_timeout(&self) -> Duration {
        resolve_history_timeout(self.history_timeout)
    }

    /// Returns whether dry-run mode is enabled.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}
