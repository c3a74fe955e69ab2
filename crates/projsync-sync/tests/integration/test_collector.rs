//! Collector behavior against real directory trees

use projsync_core::domain::newtypes::RelativePath;
use projsync_core::ignore::IgnoreRuleSet;
use projsync_sync::FileTreeCollector;

use crate::common::write;

fn paths(collection: &projsync_sync::Collection) -> Vec<String> {
    collection.paths().map(RelativePath::to_string).collect()
}

#[test]
fn test_excluded_folders_and_extensions_are_dropped() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/main.py", b"print('hi')");
    write(dir.path(), "src/__pycache__/x.pyc", b"\x00");
    write(dir.path(), ".venv/lib/foo.py", b"pass");

    let rules = IgnoreRuleSet::load(
        "ignore_folders = [\".venv\"]\nignore_file_extensions = [\"pyc\"]\n",
    )
    .unwrap();

    let collection = FileTreeCollector::collect(dir.path(), &rules).unwrap();
    assert_eq!(paths(&collection), vec!["src/main.py"]);
    assert_eq!(collection.files[0].content(), b"print('hi')");
}

#[test]
fn test_nothing_beneath_pruned_folder_is_collected() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "node_modules/a/b/c/deep.js", b"x");
    write(dir.path(), "node_modules/top.js", b"x");
    write(dir.path(), "lib/node_modules/nested.js", b"x");
    write(dir.path(), "lib/keep.js", b"x");

    let rules = IgnoreRuleSet::new(
        ["node_modules".to_string()],
        Vec::new(),
        Vec::new(),
    );
    let collection = FileTreeCollector::collect(dir.path(), &rules).unwrap();

    assert_eq!(paths(&collection), vec!["lib/keep.js"]);
    assert!(collection
        .paths()
        .all(|p| p.parent_segments().all(|s| s != "node_modules")));
}

#[test]
fn test_name_includes_and_case_rules() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "IMAGE.PNG", b"x");
    write(dir.path(), "notes.md", b"x");
    write(dir.path(), "projsync.config", b"{}");
    write(dir.path(), "Projsync-readme.md", b"x");

    let rules = IgnoreRuleSet::load(
        "ignore_file_extensions = [\"png\"]\nignore_name_includes = [\"projsync\"]\n",
    )
    .unwrap();
    let collection = FileTreeCollector::collect(dir.path(), &rules).unwrap();

    assert_eq!(paths(&collection), vec!["Projsync-readme.md", "notes.md"]);
}

#[test]
fn test_collect_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "b/2.txt", b"2");
    write(dir.path(), "a/1.txt", b"1");
    write(dir.path(), "c.txt", b"3");
    write(dir.path(), "skip/x.txt", b"x");

    let rules = IgnoreRuleSet::new(["skip".to_string()], Vec::new(), Vec::new());
    let first = FileTreeCollector::collect(dir.path(), &rules).unwrap();
    let second = FileTreeCollector::collect(dir.path(), &rules).unwrap();

    assert_eq!(first.files, second.files);
    assert_eq!(paths(&first), vec!["a/1.txt", "b/2.txt", "c.txt"]);
}

#[test]
fn test_non_utf8_content_is_collected_as_bytes() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "latin1.txt", b"caf\xe9");

    let collection = FileTreeCollector::collect(dir.path(), &IgnoreRuleSet::default()).unwrap();
    assert_eq!(collection.files[0].content(), b"caf\xe9");
    assert_eq!(collection.files[0].text(), "caf\u{FFFD}");
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_a_warning() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "ok.txt", b"ok");
    write(dir.path(), "secret.txt", b"no");
    let secret = dir.path().join("secret.txt");
    std::fs::set_permissions(&secret, std::fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can read the file regardless of its mode.
    if std::fs::read(&secret).is_ok() {
        return;
    }

    let collection = FileTreeCollector::collect(dir.path(), &IgnoreRuleSet::default()).unwrap();
    assert_eq!(paths(&collection), vec!["ok.txt"]);
    assert_eq!(collection.warnings.len(), 1);
    assert_eq!(collection.warnings[0].target, "secret.txt");
}
