use std::fs;
use std::path::Path;
use std::process::Command;

use stashpeek::git::{GitCli, StashBackend};
use tempfile::TempDir;

fn git_available() -> bool {
    Command::new("git").arg("--version").output().is_ok_and(|o| o.status.success())
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .expect("git did not start");
    assert!(status.status.success(), "git {:?} failed: {}", args, String::from_utf8_lossy(&status.stderr));
}

/// A repository with one commit of `tracked.txt`.
fn repo() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path();
    git(path, &["init", "-q"]);
    git(path, &["config", "user.email", "dev@example.com"]);
    git(path, &["config", "user.name", "Dev"]);
    git(path, &["config", "commit.gpgsign", "false"]);
    fs::write(path.join("tracked.txt"), "one\n").unwrap();
    git(path, &["add", "tracked.txt"]);
    git(path, &["commit", "-q", "-m", "init"]);
    dir
}

#[test]
fn lists_shows_and_drops_stashes() {
    if !git_available() {
        eprintln!("git not installed; skipping");
        return;
    }
    let dir = repo();
    let path = dir.path();
    fs::write(path.join("tracked.txt"), "one\ntwo\n").unwrap();
    git(path, &["stash", "push", "-q", "-m", "first change"]);

    let cli = GitCli::new("git", path);
    let stashes = cli.list_stashes().unwrap();
    assert_eq!(stashes.len(), 1);
    assert_eq!(stashes[0].reference, "stash@{0}");
    assert!(stashes[0].message.contains("first change"));
    assert!(!stashes[0].relative_age.is_empty());

    let diff = cli.show_stash_diff("stash@{0}").unwrap();
    assert!(diff.contains("tracked.txt"));
    assert!(diff.contains("two"));

    let applied = cli.apply_stash("stash@{0}").unwrap();
    assert!(applied.contains("tracked.txt"));
    assert_eq!(fs::read_to_string(path.join("tracked.txt")).unwrap(), "one\ntwo\n");

    cli.drop_stash("stash@{0}").unwrap();
    assert!(cli.list_stashes().unwrap().is_empty());
}

#[test]
fn dropping_a_missing_stash_reports_git_output() {
    if !git_available() {
        return;
    }
    let dir = repo();
    let cli = GitCli::new("git", dir.path());
    let failure = cli.drop_stash("stash@{5}").unwrap_err();
    assert_eq!(failure.operation, "stash drop");
    assert!(failure.exit_code.is_some_and(|c| c != 0));
    assert!(!failure.output.is_empty());
}

#[test]
fn scans_diffs_and_stashes_selected_paths() {
    if !git_available() {
        return;
    }
    let dir = repo();
    let path = dir.path();
    fs::write(path.join("tracked.txt"), "one\nchanged\n").unwrap();
    fs::write(path.join("staged.txt"), "new\n").unwrap();
    git(path, &["add", "staged.txt"]);

    let cli = GitCli::new("git", path);
    let mut changes = cli.scan_working_tree().unwrap();
    changes.sort_by(|a, b| a.path.cmp(&b.path));
    assert_eq!(changes.len(), 2);
    assert_eq!((changes[0].path.as_str(), changes[0].status, changes[0].staged), ("staged.txt", 'A', true));
    assert_eq!((changes[1].path.as_str(), changes[1].status, changes[1].staged), ("tracked.txt", 'M', false));

    assert!(cli.diff_file("staged.txt", true).unwrap().contains("new"));
    assert!(cli.diff_file("staged.txt", false).unwrap().trim().is_empty());
    assert!(cli.diff_file("tracked.txt", false).unwrap().contains("changed"));

    cli.create_stash(&["tracked.txt".to_string()], "only tracked").unwrap();
    let stashes = cli.list_stashes().unwrap();
    assert_eq!(stashes.len(), 1);
    assert!(stashes[0].message.contains("only tracked"));

    let remaining = cli.scan_working_tree().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].path, "staged.txt");
}

#[test]
fn restore_resets_tracked_and_removes_untracked() {
    if !git_available() {
        return;
    }
    let dir = repo();
    let path = dir.path();
    fs::write(path.join("tracked.txt"), "dirty\n").unwrap();
    fs::create_dir(path.join("scratch")).unwrap();
    fs::write(path.join("scratch").join("notes.txt"), "tmp\n").unwrap();

    let cli = GitCli::new("git", path);
    let out = cli.restore_working_tree().unwrap();
    assert!(out.contains("HEAD is now at"));
    assert!(out.contains("scratch"));
    assert!(cli.scan_working_tree().unwrap().is_empty());
    assert_eq!(fs::read_to_string(path.join("tracked.txt")).unwrap(), "one\n");
}

#[test]
fn missing_binary_is_a_failure_without_exit_code() {
    let dir = TempDir::new().unwrap();
    let cli = GitCli::new("definitely-not-a-git-binary", dir.path());
    let failure = cli.list_stashes().unwrap_err();
    assert_eq!(failure.exit_code, None);
    assert_eq!(failure.operation, "stash list");
}

#[test]
fn non_ascii_paths_round_trip_through_scan_diff_and_stash() {
    if !git_available() {
        return;
    }
    let dir = repo();
    let path = dir.path();
    fs::write(path.join("café.txt"), "un\n").unwrap();
    git(path, &["add", "café.txt"]);
    git(path, &["commit", "-q", "-m", "accent"]);
    fs::write(path.join("café.txt"), "un\ndeux\n").unwrap();

    let cli = GitCli::new("git", path);
    let changes = cli.scan_working_tree().unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].path, "café.txt");

    assert!(cli.diff_file("café.txt", false).unwrap().contains("deux"));
    cli.create_stash(&["café.txt".to_string()], "accented").unwrap();
    assert!(cli.scan_working_tree().unwrap().is_empty());
}

#[test]
fn untracked_files_can_be_diffed_and_stashed() {
    if !git_available() {
        return;
    }
    let dir = repo();
    let path = dir.path();
    fs::create_dir(path.join("notes")).unwrap();
    fs::write(path.join("notes").join("new.txt"), "hello\n").unwrap();
    fs::write(path.join("tracked.txt"), "one\nmore\n").unwrap();

    let cli = GitCli::new("git", path);
    let mut changes = cli.scan_working_tree().unwrap();
    changes.sort_by(|a, b| a.path.cmp(&b.path));
    assert_eq!((changes[0].path.as_str(), changes[0].status, changes[0].staged), ("notes/new.txt", '?', false));

    let diff = cli.diff_file("notes/new.txt", false).unwrap();
    assert!(diff.contains("hello"));

    cli.create_stash(&["notes/new.txt".to_string()], "with untracked").unwrap();
    assert!(!path.join("notes").join("new.txt").exists());
    let remaining = cli.scan_working_tree().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].path, "tracked.txt");

    let shown = cli.list_stashes().unwrap();
    assert_eq!(shown.len(), 1);
    cli.apply_stash("stash@{0}").unwrap();
    assert_eq!(fs::read_to_string(path.join("notes").join("new.txt")).unwrap(), "hello\n");
}
