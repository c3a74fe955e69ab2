//! SyncEngine runs against the in-memory remote

use projsync_core::domain::errors::SyncError;
use projsync_core::domain::report::{FailureKind, SyncPhase};
use projsync_core::manifest::{ChangeSet, Manifest};

use crate::common::{engine, file, MockRemote, Op};

#[tokio::test]
async fn test_create_uploads_every_file() {
    let remote = MockRemote::new();
    let engine = engine(remote.clone());

    let (handle, report) = engine
        .create_project("demo", "", &[file("a.txt", "hi")])
        .await
        .unwrap();

    assert_eq!(handle.name, "demo");
    assert_eq!(
        remote.contents(handle.id.as_str()),
        vec![("a.txt".to_string(), "hi".to_string())]
    );
    assert_eq!(report.files_uploaded(), 1);
    assert!(!report.has_failures());
    assert_eq!(
        report.phases,
        vec![SyncPhase::Idle, SyncPhase::Uploading, SyncPhase::Done]
    );
}

#[tokio::test]
async fn test_create_failure_is_fatal_and_uploads_nothing() {
    let remote = MockRemote::new();
    remote.fail_create();
    let engine = engine(remote.clone());

    let err = engine
        .create_project("demo", "", &[file("a.txt", "hi")])
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::RemoteCreate(ref msg) if msg.contains("403")));
    assert_eq!(remote.ops(), vec![Op::Create("demo".to_string())]);
}

#[tokio::test]
async fn test_update_replaces_everything() {
    let remote = MockRemote::new();
    let handle = remote.seed("p1", &["old1", "old2"]);
    let engine = engine(remote.clone());

    let report = engine
        .update_project(&handle, &[file("a.txt", "new")])
        .await
        .unwrap();

    assert_eq!(remote.names("p1"), vec!["a.txt"]);
    assert_eq!(report.files_deleted(), 2);
    assert_eq!(report.files_uploaded(), 1);
    assert_eq!(
        report.phases,
        vec![
            SyncPhase::Idle,
            SyncPhase::Listing,
            SyncPhase::Deleting,
            SyncPhase::Uploading,
            SyncPhase::Done
        ]
    );
}

#[tokio::test]
async fn test_update_deletes_all_before_any_upload() {
    let remote = MockRemote::new();
    let names: Vec<String> = (0..12).map(|i| format!("old{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let handle = remote.seed("p1", &refs);
    let engine = engine(remote.clone());

    let files: Vec<_> = (0..12)
        .map(|i| file(&format!("f{i}.txt"), "x"))
        .collect();
    engine.update_project(&handle, &files).await.unwrap();

    let ops = remote.ops();
    let last_delete = ops
        .iter()
        .rposition(|op| matches!(op, Op::Delete(_)))
        .unwrap();
    let first_upload = ops
        .iter()
        .position(|op| matches!(op, Op::Upload(_)))
        .unwrap();
    assert_eq!(ops[0], Op::List);
    assert!(last_delete < first_upload, "ops interleaved: {ops:?}");
}

#[tokio::test]
async fn test_update_list_failure_is_fatal() {
    let remote = MockRemote::new();
    let handle = remote.seed("p1", &["old"]);
    remote.fail_list();
    let engine = engine(remote.clone());

    let err = engine
        .update_project(&handle, &[file("a.txt", "x")])
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::RemoteList(_)));
    assert_eq!(remote.ops(), vec![Op::List]);
    assert_eq!(remote.names("p1"), vec!["old"]);
}

#[tokio::test]
async fn test_partial_upload_failure_keeps_successes() {
    let remote = MockRemote::new();
    remote.fail_upload_of("b.txt");
    let engine = engine(remote.clone());

    let (handle, report) = engine
        .create_project(
            "demo",
            "",
            &[file("a.txt", "1"), file("b.txt", "2"), file("c.txt", "3")],
        )
        .await
        .unwrap();

    assert_eq!(report.files_uploaded(), 2);
    assert_eq!(remote.names(handle.id.as_str()), vec!["a.txt", "c.txt"]);
    assert_eq!(
        report.partial_upload_error(),
        Some(SyncError::PartialUpload {
            failed: vec!["b.txt".to_string()]
        })
    );
}

#[tokio::test]
async fn test_failed_delete_does_not_block_the_rest() {
    let remote = MockRemote::new();
    let handle = remote.seed("p1", &["keep-failing", "goes"]);
    remote.fail_delete_of("p1", "keep-failing");
    let engine = engine(remote.clone());

    let report = engine
        .update_project(&handle, &[file("a.txt", "x")])
        .await
        .unwrap();

    assert_eq!(report.files_deleted(), 1);
    assert_eq!(report.failures_of(FailureKind::RemoteDelete).count(), 1);
    assert_eq!(report.files_uploaded(), 1);
    assert_eq!(remote.names("p1"), vec!["a.txt", "keep-failing"]);
}

#[tokio::test]
async fn test_transient_upload_errors_are_retried() {
    let remote = MockRemote::new();
    remote.flaky_upload_of("a.txt", 2);
    let engine = engine(remote.clone());

    let (handle, report) = engine
        .create_project("demo", "", &[file("a.txt", "x")])
        .await
        .unwrap();

    assert!(!report.has_failures());
    assert_eq!(remote.names(handle.id.as_str()), vec!["a.txt"]);
    let attempts = remote
        .ops()
        .iter()
        .filter(|op| **op == Op::Upload("a.txt".to_string()))
        .count();
    assert_eq!(attempts, 3);
}

#[tokio::test]
async fn test_permanent_upload_error_is_not_retried_whatever_the_path() {
    let remote = MockRemote::new();
    remote.fail_upload_of("src/network.rs");
    let engine = engine(remote.clone());

    let (_, report) = engine
        .create_project("demo", "", &[file("src/network.rs", "x")])
        .await
        .unwrap();

    let attempts = remote
        .ops()
        .iter()
        .filter(|op| matches!(op, Op::Upload(_)))
        .count();
    assert_eq!(attempts, 1);
    assert_eq!(report.failures_of(FailureKind::Upload).count(), 1);
}

#[tokio::test]
async fn test_ambiguous_upload_failure_is_not_repeated() {
    let remote = MockRemote::new();
    remote.lose_upload_response_of("a.txt");
    let engine = engine(remote.clone());

    let (handle, report) = engine
        .create_project("demo", "", &[file("a.txt", "hi")])
        .await
        .unwrap();

    assert_eq!(remote.names(handle.id.as_str()), vec!["a.txt"]);
    assert_eq!(
        remote.ops(),
        vec![Op::Create("demo".to_string()), Op::Upload("a.txt".to_string())]
    );
    assert_eq!(report.files_uploaded(), 0);
    assert_eq!(report.failures_of(FailureKind::Upload).count(), 1);
}

#[tokio::test]
async fn test_upload_sends_lossy_text() {
    let remote = MockRemote::new();
    let engine = engine(remote.clone());
    let latin1 = projsync_core::domain::file::LocalFile::new(
        projsync_core::domain::newtypes::RelativePath::new("l.txt".to_string()).unwrap(),
        b"caf\xe9".to_vec(),
    );

    let (handle, _) = engine.create_project("demo", "", &[latin1]).await.unwrap();
    assert_eq!(
        remote.contents(handle.id.as_str()),
        vec![("l.txt".to_string(), "caf\u{FFFD}".to_string())]
    );
}

#[tokio::test]
async fn test_incremental_touches_only_changed_files() {
    let remote = MockRemote::new();
    let handle = remote.seed("p1", &["same.txt", "edit.txt", "gone.txt"]);
    let engine = engine(remote.clone());

    let manifest = Manifest::from_files(&[
        file("same.txt", "old same.txt"),
        file("edit.txt", "old edit.txt"),
        file("gone.txt", "old gone.txt"),
    ]);
    let now = [
        file("same.txt", "old same.txt"),
        file("edit.txt", "edited"),
        file("new.txt", "fresh"),
    ];
    let changes = ChangeSet::between(&manifest, &now);

    let report = engine
        .update_project_incremental(&handle, &now, &changes)
        .await
        .unwrap();

    assert_eq!(report.files_deleted(), 2);
    assert_eq!(report.files_uploaded(), 2);
    assert_eq!(
        remote.contents("p1"),
        vec![
            ("edit.txt".to_string(), "edited".to_string()),
            ("new.txt".to_string(), "fresh".to_string()),
            ("same.txt".to_string(), "old same.txt".to_string()),
        ]
    );
    assert!(!remote.ops().contains(&Op::Upload("same.txt".to_string())));
}

#[tokio::test]
async fn test_incremental_with_no_changes_only_lists() {
    let remote = MockRemote::new();
    let handle = remote.seed("p1", &["a.txt"]);
    let engine = engine(remote.clone());

    let files = [file("a.txt", "old a.txt")];
    let changes = ChangeSet::between(&Manifest::from_files(&files), &files);
    let report = engine
        .update_project_incremental(&handle, &files, &changes)
        .await
        .unwrap();

    assert_eq!(remote.ops(), vec![Op::List]);
    assert_eq!(report.files_uploaded(), 0);
    assert_eq!(report.phase(), SyncPhase::Done);
}

#[tokio::test]
async fn test_incremental_failed_stale_delete_still_uploads() {
    let remote = MockRemote::new();
    let handle = remote.seed("p1", &["edit.txt"]);
    remote.fail_delete_of("p1", "edit.txt");
    let engine = engine(remote.clone());

    let manifest = Manifest::from_files(&[file("edit.txt", "old edit.txt")]);
    let now = [file("edit.txt", "edited")];
    let changes = ChangeSet::between(&manifest, &now);

    let report = engine
        .update_project_incremental(&handle, &now, &changes)
        .await
        .unwrap();

    let failures: Vec<_> = report.failures_of(FailureKind::RemoteDelete).collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].target, "doc-1");
    assert_eq!(report.files_deleted(), 0);
    assert_eq!(report.uploaded.len(), 1);
    assert_eq!(report.uploaded[0].as_str(), "edit.txt");
    // The stale copy stays next to the new one until its delete succeeds.
    assert_eq!(
        remote.contents("p1"),
        vec![
            ("edit.txt".to_string(), "edited".to_string()),
            ("edit.txt".to_string(), "old edit.txt".to_string()),
        ]
    );
}
