#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod archiver;
pub mod config;
pub mod history;
pub mod runner;
pub mod scanner;
pub mod summary;
pub mod upload;
pub mod walk;

pub use archiver::{
    archive_file_name, create_archive, create_archive_on, Archive, ArchiveError, EntryKind,
    ManifestEntry,
};
pub use config::{load_config, ConfigError, FileConfig};
pub use history::{parse_commit_date, GitHistory, HistoryError, HistoryLookup};
pub use runner::{Runner, RunnerConfig, RunnerError};
pub use scanner::{
    discover_repositories, find_stale_repositories, RepositoryCandidate, ScanError, ScanReport,
    Scanner, SkipReason, SkippedRepository, StaleRepository, StalenessVerdict,
};
pub use summary::{ProcessingResult, RunSummary};
pub use upload::{DirectoryUpload, UploadError, UploadSink, UploadStatus};
pub use walk::{walk_tree, WalkError, WalkStep, REPOSITORY_MARKER};
