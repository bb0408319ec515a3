//! Configuration file loading.
//!
//! Settings can come from an optional `gitsafe.toml`:
//!
//! ```toml
//! [scan]
//! days = 90
//! concurrency = 8
//! history-timeout-secs = 10
//!
//! [archive]
//! out = "/srv/cold/repos"
//!
//! [upload]
//! enabled = true
//! destination = "/mnt/drive/gitsafe"
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

mod error;
mod file;

pub use error::ConfigError;
pub use file::{ArchiveSection, FileConfig, ScanSection, UploadSection};

use std::path::Path;
use tracing::debug;

/// Default config file name looked up by the CLI.
pub const DEFAULT_CONFIG_FILE: &str = "gitsafe.toml";

/// Loads a config file if it exists.
///
/// # Returns
///
/// `None` when there is no file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file can't be read, isn't valid TOML, or
/// holds out-of-range values.
pub fn load_config(path: &Path) -> Result<Option<FileConfig>, ConfigError> {
    if !path.exists() {
        debug!(path = %path.display(), "No config file");
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut config: FileConfig = toml::from_str(&contents).map_err(|source| ConfigError::Toml {
        path: path.display().to_string(),
        source,
    })?;
    config.validate(path)?;

    if let Some(base) = path.parent() {
        config.resolve_paths(base);
    }

    debug!(path = %path.display(), "Loaded config file");
    Ok(Some(config))
}
