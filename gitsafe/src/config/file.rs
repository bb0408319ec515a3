//! `gitsafe.toml` deserialization.

use super::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Parsed contents of a `gitsafe.toml` file.
///
/// Every setting is optional; anything left out falls back to the command
/// line or the built-in default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// `[scan]` section.
    pub scan: ScanSection,

    /// `[archive]` section.
    pub archive: ArchiveSection,

    /// `[upload]` section.
    pub upload: UploadSection,
}

/// Settings for repository discovery and classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ScanSection {
    /// Days since the last commit before a repository counts as stale.
    pub days: Option<u32>,

    /// Maximum history queries in flight.
    pub concurrency: Option<usize>,

    /// Seconds a history query may run before it is killed.
    pub history_timeout_secs: Option<u64>,
}

/// Settings for archive output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ArchiveSection {
    /// Directory archives are written to.
    pub out: Option<PathBuf>,
}

/// Settings for mirroring archives elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct UploadSection {
    /// Whether to upload archives after creating them.
    pub enabled: Option<bool>,

    /// Directory archives are copied into.
    pub destination: Option<PathBuf>,
}

impl FileConfig {
    /// Checks values that parse but make no sense.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first bad setting.
    pub fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::Validation {
            path: path.display().to_string(),
            message: message.to_string(),
        };

        if self.scan.concurrency == Some(0) {
            return Err(invalid("scan.concurrency must be at least 1"));
        }
        if self.scan.history_timeout_secs == Some(0) {
            return Err(invalid("scan.history-timeout-secs must be at least 1"));
        }
        Ok(())
    }

    /// Resolves relative paths against `base`, the config file's directory.
    pub(crate) fn resolve_paths(&mut self, base: &Path) {
        for path in [&mut self.archive.out, &mut self.upload.destination]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}
