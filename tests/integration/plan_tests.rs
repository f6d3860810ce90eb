use mediadupe::coordinator::{files_to_move, target_presence, ProcessingCoordinator};
use mediadupe::error::ExitCode;
use mediadupe::output::JsonOutput;
use mediadupe::scanner::ScanError;
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
fn test_plan_missing_target_fails() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("src");
    fs::create_dir(&source).unwrap();

    let coordinator = ProcessingCoordinator::with_defaults();
    let err = coordinator
        .plan(&source, &dir.path().join("nope"))
        .unwrap_err();
    assert!(matches!(err, ScanError::NotFound(_)));
}

#[test]
fn test_plan_target_must_be_directory() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("src");
    fs::create_dir(&source).unwrap();
    let file_target = dir.path().join("file.jpg");
    touch(&file_target, b"x");

    let coordinator = ProcessingCoordinator::with_defaults();
    let err = coordinator.plan(&source, &file_target).unwrap_err();
    assert!(matches!(err, ScanError::NotADirectory(_)));
}

#[test]
fn test_plan_moves_only_content_absent_from_target() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("incoming");
    let target = dir.path().join("library");

    touch(&source.join("fresh.cr3"), &[1u8; 1000]);
    touch(&source.join("already.jpg"), &[2u8; 2000]);
    // Same bytes, different name and folder in the library.
    touch(&target.join("2023/renamed.jpg"), &[2u8; 2000]);
    touch(&target.join("2022/existing.mp4"), &[9u8; 3000]);

    let coordinator = ProcessingCoordinator::with_defaults();
    let report = coordinator.plan(&source, &target).unwrap();

    assert_eq!(report.to_move.len(), 1);
    assert!(report.to_move[0].path.ends_with("fresh.cr3"));

    assert_eq!(report.groups.len(), 1);
    assert!(report.groups[0].has_target_copy());
    assert_eq!(report.groups[0].len(), 2);
}

#[test]
fn test_plan_same_size_different_content_moves_both() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("incoming");
    let target = dir.path().join("library");

    // Equal sizes force hashing; different bytes prove both unique.
    touch(&source.join("one.jpg"), &[1u8; 4096]);
    touch(&target.join("other.jpg"), &[2u8; 4096]);

    let coordinator = ProcessingCoordinator::with_defaults();
    let report = coordinator.plan(&source, &target).unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(report.to_move.len(), 1);
    assert!(report.to_move[0].path.ends_with("one.jpg"));
    // Only the source file is a move candidate; target files stay put.
}

#[test]
fn test_plan_exit_codes() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("incoming");
    let target = dir.path().join("library");
    fs::create_dir_all(&target).unwrap();

    // Nothing to do at all.
    fs::create_dir_all(&source).unwrap();
    let coordinator = ProcessingCoordinator::with_defaults();
    let report = coordinator.plan(&source, &target).unwrap();
    assert_eq!(ExitCode::from_report(&report), ExitCode::NoDuplicates);

    // A move candidate counts as actionable output.
    touch(&source.join("new.jpg"), &[1u8; 500]);
    let report = coordinator.plan(&source, &target).unwrap();
    assert_eq!(ExitCode::from_report(&report), ExitCode::Success);
}

#[test]
fn test_plan_json_report_schema() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("incoming");
    let target = dir.path().join("library");

    touch(&source.join("new.jpg"), &[1u8; 600]);
    touch(&source.join("dup.jpg"), &[2u8; 700]);
    touch(&target.join("dup_copy.jpg"), &[2u8; 700]);

    let coordinator = ProcessingCoordinator::with_defaults();
    let report = coordinator.plan(&source, &target).unwrap();

    let exit_code = ExitCode::from_report(&report);
    let json = JsonOutput::new(&report, exit_code).to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["summary"]["files_to_move"], 1);
    assert_eq!(value["to_move"][0]["kind"], "photo");
    assert_eq!(value["duplicates"][0]["in_target"], true);
    let origins: Vec<&str> = value["duplicates"][0]["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["origin"].as_str().unwrap())
        .collect();
    assert!(origins.contains(&"source"));
    assert!(origins.contains(&"target"));
}

#[test]
fn test_files_to_move_respects_custom_predicate() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("incoming");
    let target = dir.path().join("library");
    fs::create_dir_all(&target).unwrap();

    touch(&source.join("a.jpg"), &[1u8; 100]);
    touch(&source.join("b.jpg"), &[2u8; 200]);

    let coordinator = ProcessingCoordinator::with_defaults();
    let (drafts, _) = coordinator.scan(&source).unwrap();
    let mut index = mediadupe::resolver::SizeIndex::new();
    index.extend(drafts, mediadupe::scanner::Origin::Source);
    mediadupe::resolver::resolve(&mut index, &mediadupe::resolver::ResolveConfig::default());

    // An external import ledger can veto moves the resolver knows nothing
    // about.
    let moves = files_to_move(&index, |record| record.path.ends_with("a.jpg"));
    assert_eq!(moves.len(), 1);
    assert!(moves[0].path.ends_with("b.jpg"));

    // With no duplicate groups at all, nothing is "present in target".
    assert!(target_presence(&[]).is_empty());
}
