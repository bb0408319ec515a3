use chrono::{DateTime, FixedOffset};
use gitsafe::{
    parse_commit_date, DirectoryUpload, HistoryError, HistoryLookup, ProcessingResult, Runner,
    RunnerConfig, RunnerError, UploadStatus,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Every repository whose name starts with `old` last changed in 2001;
/// everything else was committed to just now.
struct AgeByName;

impl HistoryLookup for AgeByName {
    async fn last_commit(&self, repository: &Path) -> Result<DateTime<FixedOffset>, HistoryError> {
        let name = repository
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if name.starts_with("broken") {
            return Err(HistoryError::NonZeroExit {
                path: repository.display().to_string(),
                status: "exit status: 128".to_string(),
                stderr: "fatal: not a git repository".to_string(),
            });
        }
        if name.starts_with("old") {
            Ok(parse_commit_date("2001-09-09 01:46:40 +0000").unwrap())
        } else {
            Ok(chrono::Utc::now().fixed_offset())
        }
    }
}

fn make_repo(root: &Path, name: &str) {
    let repo = root.join(name);
    fs::create_dir_all(repo.join(".git")).unwrap();
    fs::write(repo.join("README.md"), name).unwrap();
}

struct Fixture {
    _dir: TempDir,
    root: PathBuf,
    out: PathBuf,
    upload: PathBuf,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("code");
    make_repo(&root, "old-api");
    make_repo(&root, "fresh-site");
    make_repo(&root, "broken-tool");
    make_repo(&root, "old-cli");
    Fixture {
        out: dir.path().join("backups"),
        upload: dir.path().join("drive"),
        root,
        _dir: dir,
    }
}

fn archive_paths(results: &[ProcessingResult]) -> Vec<PathBuf> {
    results
        .iter()
        .filter_map(|result| match result {
            ProcessingResult::Archived { archive, .. } => Some(archive.path.clone()),
            ProcessingResult::Failed { .. } => None,
        })
        .collect()
}

#[tokio::test]
async fn archives_and_uploads_stale_repositories() {
    let fx = fixture();
    let config = RunnerConfig::new(fx.root.clone())
        .with_output_dir(fx.out.clone())
        .with_upload(true)
        .with_upload_dir(fx.upload.clone());
    let runner = Runner::with_parts(config, AgeByName, Some(DirectoryUpload::new(&fx.upload)));

    let summary = runner.run().await.unwrap();

    assert_eq!(summary.repositories_found, 4);
    assert_eq!(summary.stale_found, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.archived, 2);
    assert_eq!(summary.uploaded, 2);
    assert!(summary.all_success());

    let archives = archive_paths(&summary.results);
    assert_eq!(archives.len(), 2);
    for archive in &archives {
        assert!(archive.starts_with(&fx.out));
        assert!(archive.is_file());
        let uploaded = fx.upload.join(archive.file_name().unwrap());
        assert!(uploaded.is_file());
    }
    let first = archives[0].file_name().unwrap().to_string_lossy();
    assert!(first.starts_with("old-api_"));
}

#[tokio::test]
async fn dry_run_writes_nothing() {
    let fx = fixture();
    let config = RunnerConfig::new(fx.root.clone())
        .with_output_dir(fx.out.clone())
        .with_dry_run(true);
    let runner = Runner::with_parts(config, AgeByName, None::<DirectoryUpload>);

    let summary = runner.run().await.unwrap();

    assert!(summary.dry_run);
    assert_eq!(summary.stale_found, 2);
    assert_eq!(summary.archived, 0);
    assert!(summary.results.is_empty());
    assert!(!fx.out.exists());
}

#[tokio::test]
async fn failed_upload_keeps_local_archive() {
    let fx = fixture();
    // A regular file where the upload directory should be.
    fs::write(&fx.upload, "not a directory").unwrap();
    let config = RunnerConfig::new(fx.root.clone()).with_output_dir(fx.out.clone());
    let runner = Runner::with_parts(
        config,
        AgeByName,
        Some(DirectoryUpload::new(fx.upload.join("nested"))),
    );

    let summary = runner.run().await.unwrap();

    assert_eq!(summary.archived, 2);
    assert_eq!(summary.upload_failed, 2);
    assert!(summary.has_failures());
    for result in &summary.results {
        match result {
            ProcessingResult::Archived {
                archive,
                upload: Some(UploadStatus::Failed { .. }),
                ..
            } => assert!(archive.path.is_file()),
            other => panic!("unexpected result {other:?}"),
        }
    }
}

#[tokio::test]
async fn no_stale_repositories_is_success() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("code");
    make_repo(&root, "fresh-only");
    let config = RunnerConfig::new(root).with_output_dir(dir.path().join("backups"));
    let runner = Runner::with_parts(config, AgeByName, None::<DirectoryUpload>);

    let summary = runner.run().await.unwrap();

    assert_eq!(summary.repositories_found, 1);
    assert_eq!(summary.stale_found, 0);
    assert!(summary.all_success());
    assert!(dir.path().join("backups").is_dir());
}

#[tokio::test]
async fn missing_root_aborts_run() {
    let dir = TempDir::new().unwrap();
    let config = RunnerConfig::new(dir.path().join("nope"))
        .with_output_dir(dir.path().join("backups"));
    let runner = Runner::with_parts(config, AgeByName, None::<DirectoryUpload>);

    let result = runner.run().await;

    assert!(matches!(result, Err(RunnerError::Scan(_))));
}

#[test]
fn upload_without_destination_is_rejected() {
    temp_env::with_var_unset("GITSAFE_UPLOAD_DIR", || {
        let config = RunnerConfig::new(PathBuf::from("/code")).with_upload(true);

        let result = Runner::new(config);

        assert!(matches!(result, Err(RunnerError::MissingUploadDestination)));
    });
}

#[tokio::test]
async fn summary_serializes_to_json() {
    let fx = fixture();
    let config = RunnerConfig::new(fx.root.clone()).with_output_dir(fx.out.clone());
    let runner = Runner::with_parts(config, AgeByName, None::<DirectoryUpload>);

    let summary = runner.run().await.unwrap();
    let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();

    assert_eq!(json["archived"], 2);
    assert_eq!(json["results"].as_array().unwrap().len(), 2);
}
