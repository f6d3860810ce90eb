use mediadupe::coordinator::{CoordinatorConfig, ProcessingCoordinator};
use mediadupe::resolver::{resolve, Resolution, ResolveConfig, SizeIndex};
use mediadupe::scanner::{FileMeta, Origin};
use mediadupe::signal::ShutdownHandler;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::time::SystemTime;
use tempfile::tempdir;

fn touch(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
}

fn meta(path: &Path) -> FileMeta {
    let size = fs::metadata(path).unwrap().len();
    FileMeta::new(
        path.to_path_buf(),
        size,
        SystemTime::now(),
        SystemTime::now(),
    )
}

#[test]
fn test_pre_set_flag_skips_all_buckets() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("a.jpg"), &[1u8; 400]);
    touch(&dir.path().join("b.jpg"), &[1u8; 400]);
    touch(&dir.path().join("c.jpg"), &[2u8; 500]);
    touch(&dir.path().join("d.jpg"), &[2u8; 500]);

    let handler = ShutdownHandler::new();
    handler.request_shutdown();

    let mut index = SizeIndex::new();
    for name in ["a.jpg", "b.jpg", "c.jpg", "d.jpg"] {
        index.insert(meta(&dir.path().join(name)), Origin::Source);
    }

    let config = ResolveConfig::default().with_shutdown_flag(handler.get_flag());
    let stats = resolve(&mut index, &config);

    assert!(stats.interrupted);
    assert_eq!(stats.buckets_resolved, 0);
    assert_eq!(stats.chunk_hashes, 0);
    assert!(index
        .records()
        .all(|r| r.resolution() == Resolution::Unresolved));
}

#[test]
fn test_settled_buckets_survive_cancellation_and_resume() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("a.jpg"), &[1u8; 400]);
    touch(&dir.path().join("b.jpg"), &[1u8; 400]);

    let handler = ShutdownHandler::new();
    let mut index = SizeIndex::new();
    index.insert(meta(&dir.path().join("a.jpg")), Origin::Source);
    index.insert(meta(&dir.path().join("b.jpg")), Origin::Source);

    // First run completes normally.
    let config = ResolveConfig::default().with_shutdown_flag(handler.get_flag());
    let first = resolve(&mut index, &config);
    assert!(!first.interrupted);
    assert!(index
        .records()
        .all(|r| r.resolution() == Resolution::Duplicate));

    // A later cancelled run must not disturb settled results.
    handler.request_shutdown();
    let second = resolve(&mut index, &config);
    assert!(second.interrupted);
    assert_eq!(second.chunk_hashes, 0);
    assert!(index
        .records()
        .all(|r| r.resolution() == Resolution::Duplicate));
}

#[test]
fn test_resume_after_cancellation_finishes_the_job() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("a.jpg"), &[7u8; 900]);
    touch(&dir.path().join("b.jpg"), &[7u8; 900]);

    let handler = ShutdownHandler::new();
    handler.request_shutdown();

    let mut index = SizeIndex::new();
    index.insert(meta(&dir.path().join("a.jpg")), Origin::Source);
    index.insert(meta(&dir.path().join("b.jpg")), Origin::Source);

    let config = ResolveConfig::default().with_shutdown_flag(handler.get_flag());
    let cancelled = resolve(&mut index, &config);
    assert!(cancelled.interrupted);
    assert!(index
        .records()
        .all(|r| r.resolution() == Resolution::Unresolved));

    // Clearing the flag and re-running picks the bucket back up.
    handler.reset();
    let finished = resolve(&mut index, &config);
    assert!(!finished.interrupted);
    assert_eq!(finished.duplicate_files, 2);
    assert!(index
        .records()
        .all(|r| r.resolution() == Resolution::Duplicate));
}

#[test]
fn test_interrupted_report_flag_propagates() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("tree");
    touch(&root.join("a.jpg"), &[1u8; 300]);
    touch(&root.join("b.jpg"), &[1u8; 300]);

    let handler = ShutdownHandler::new();
    handler.request_shutdown();

    let resolve_config = ResolveConfig::default().with_shutdown_flag(handler.get_flag());
    let coordinator = ProcessingCoordinator::new(CoordinatorConfig {
        walker: Default::default(),
        resolve: resolve_config,
    });

    // Walker stops immediately too, so the report is empty but valid.
    let report = coordinator.analyze(&root).unwrap();
    assert_eq!(report.scan.files_scanned, 0);
    assert!(!report.has_duplicates());
}
