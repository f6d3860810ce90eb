use mediadupe::coordinator::ProcessingCoordinator;
use mediadupe::resolver::Resolution;
use mediadupe::scanner::{Origin, Walker, WalkerConfig};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn touch(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let coordinator = ProcessingCoordinator::with_defaults();

    let report = coordinator.analyze(dir.path()).unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(report.scan.files_scanned, 0);
    assert_eq!(report.grouping.groups, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("a.jpg"), b"content a");
    touch(&dir.path().join("b.jpg"), b"content bb");
    touch(&dir.path().join("c.jpg"), b"content ccc");

    let coordinator = ProcessingCoordinator::with_defaults();
    let report = coordinator.analyze(dir.path()).unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(report.scan.files_scanned, 3);
    assert_eq!(report.resolve.unique_files, 3);
    // Distinct sizes settle without reading a single byte.
    assert_eq!(report.resolve.chunk_hashes, 0);
}

#[test]
fn test_scan_duplicate_files() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("a.jpg"), b"duplicate");
    touch(&dir.path().join("b.jpg"), b"duplicate");
    touch(&dir.path().join("c.jpg"), b"something else");

    let coordinator = ProcessingCoordinator::with_defaults();
    let report = coordinator.analyze(dir.path()).unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].len(), 2);
    assert_eq!(report.scan.files_scanned, 3);
    assert_eq!(report.grouping.groups, 1);
    assert_eq!(report.grouping.wasted_bytes, 9);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("a.jpg"), b"dup");
    touch(&dir.path().join("2024/06/b.jpg"), b"dup");

    let coordinator = ProcessingCoordinator::with_defaults();
    let report = coordinator.analyze(dir.path()).unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].len(), 2);
    assert_eq!(report.scan.files_scanned, 2);
}

#[test]
fn test_scan_multiple_groups_largest_first() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("small1.jpg"), &[1u8; 100]);
    touch(&dir.path().join("small2.jpg"), &[1u8; 100]);
    touch(&dir.path().join("big1.mp4"), &[2u8; 50_000]);
    touch(&dir.path().join("big2.mp4"), &[2u8; 50_000]);
    touch(&dir.path().join("big3.mp4"), &[2u8; 50_000]);

    let coordinator = ProcessingCoordinator::with_defaults();
    let report = coordinator.analyze(dir.path()).unwrap();

    assert_eq!(report.groups.len(), 2);
    // Sorted by size descending: largest reclaimable space first.
    assert_eq!(report.groups[0].size, 50_000);
    assert_eq!(report.groups[0].len(), 3);
    assert_eq!(report.groups[0].wasted_space(), 100_000);
    assert_eq!(report.groups[1].size, 100);
}

#[test]
fn test_scan_media_classification_reported() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("photo.cr3"), b"raw photo data");
    touch(&dir.path().join("clip.braw"), b"raw video data!");
    touch(&dir.path().join("notes.txt"), b"plain text here");

    let coordinator = ProcessingCoordinator::with_defaults();
    let report = coordinator.analyze(dir.path()).unwrap();

    assert_eq!(report.scan.files_scanned, 3);
    assert_eq!(report.scan.media_files, 2);
}

#[test]
fn test_walker_created_uses_min_of_timestamps() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("old.jpg");
    touch(&path, b"payload");

    // Simulate a copied file: push the modification time into the past,
    // leaving the (newer) creation time in place.
    let past = filetime::FileTime::from_unix_time(1_000_000_000, 0);
    filetime::set_file_mtime(&path, past).unwrap();

    let walker = Walker::new(dir.path(), WalkerConfig::default());
    let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();

    assert_eq!(files.len(), 1);
    let reported = files[0].created;
    let expected = std::time::SystemTime::UNIX_EPOCH
        + std::time::Duration::from_secs(1_000_000_000);
    assert_eq!(reported, expected);
}

#[test]
fn test_scan_results_are_idempotent() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("a.jpg"), &[1u8; 700]);
    touch(&dir.path().join("b.jpg"), &[1u8; 700]);
    touch(&dir.path().join("c.jpg"), &[2u8; 900]);

    let coordinator = ProcessingCoordinator::with_defaults();
    let first = coordinator.analyze(dir.path()).unwrap();
    let second = coordinator.analyze(dir.path()).unwrap();

    assert_eq!(first.groups.len(), second.groups.len());
    assert_eq!(first.groups[0].signature, second.groups[0].signature);
    assert_eq!(
        first.groups[0].paths().len(),
        second.groups[0].paths().len()
    );
}

#[test]
fn test_scan_accepts_flat_draft_list() {
    // The core consumes whatever flat list a collaborator hands it; the
    // built-in walker is just one producer.
    let dir = tempdir().unwrap();
    touch(&dir.path().join("x.jpg"), &[3u8; 250]);
    touch(&dir.path().join("y.jpg"), &[3u8; 250]);

    let coordinator = ProcessingCoordinator::with_defaults();
    let (drafts, errors) = coordinator.scan(dir.path()).unwrap();
    assert_eq!(drafts.len(), 2);
    assert!(errors.is_empty());

    let mut index = mediadupe::resolver::SizeIndex::new();
    index.extend(drafts, Origin::Source);
    mediadupe::resolver::resolve(&mut index, &mediadupe::resolver::ResolveConfig::default());

    assert!(index
        .records()
        .all(|r| r.resolution() == Resolution::Duplicate));
}
