//! End-to-end tests of the walken binary against on-disk fixtures.

mod common;

use std::collections::BTreeSet;
use std::path::Path;
use std::process::Command;

use common::{git_available, three_commit_repo, walken, walken_env};

#[test]
fn objects_prints_each_object_then_the_summary() {
    let dir = tempfile::tempdir().unwrap();
    let fx = three_commit_repo(dir.path());

    let result = walken(dir.path(), &["objects"]);
    assert_eq!(result.exit_code, 0, "stderr: {}", result.stderr);

    let mut expected = String::new();
    for i in 0..3 {
        expected.push_str(&format!("commit: {}\n", fx.commits[i]));
        expected.push_str(&format!("tree: {}\n", fx.trees[i]));
        expected.push_str(&format!("blob: {}\n", fx.blobs[i]));
    }
    expected.push_str("commits 3\n blobs 3\n tags 0\n trees 3 omitted 0\n");
    assert_eq!(result.stdout, expected);
}

#[test]
fn tree_depth_filter_counts_omitted_blobs() {
    let dir = tempfile::tempdir().unwrap();
    three_commit_repo(dir.path());

    let depth_one = walken(dir.path(), &["objects", "--filter", "tree:1"]);
    assert!(depth_one
        .stdout
        .ends_with("commits 3\n blobs 3\n tags 0\n trees 3 omitted 0\n"));

    let depth_zero = walken(dir.path(), &["objects", "--filter", "tree:0"]);
    assert_eq!(depth_zero.exit_code, 0);
    assert!(depth_zero
        .stdout
        .ends_with("commits 3\n blobs 0\n tags 0\n trees 3 omitted 3\n"));
    assert!(!depth_zero.stdout.contains("blob: "));
}

#[test]
fn unknown_filter_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    three_commit_repo(dir.path());
    let result = walken(dir.path(), &["objects", "--filter", "sparse:oid=abc"]);
    assert_eq!(result.exit_code, 128);
    assert!(result.stderr.starts_with("fatal: invalid filter"), "{}", result.stderr);
    assert!(result.stdout.is_empty());
}

#[test]
fn commits_prints_oneline_summaries() {
    let dir = tempfile::tempdir().unwrap();
    let fx = three_commit_repo(dir.path());

    let result = walken(dir.path(), &["commits"]);
    assert_eq!(result.exit_code, 0, "stderr: {}", result.stderr);
    let expected: String = ["A", "B", "C"]
        .iter()
        .zip(&fx.commits)
        .map(|(name, oid)| format!("{oid} Add {name}\n"))
        .collect();
    assert_eq!(result.stdout, expected);
}

#[test]
fn commits_reverse_and_abbrev() {
    let dir = tempfile::tempdir().unwrap();
    let fx = three_commit_repo(dir.path());

    let result = walken(dir.path(), &["commits", "--reverse", "--abbrev", "7"]);
    let lines: Vec<&str> = result.stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            format!("{} Add C", fx.commits[2].to_short_hex(7)),
            format!("{} Add B", fx.commits[1].to_short_hex(7)),
            format!("{} Add A", fx.commits[0].to_short_hex(7)),
        ]
    );
}

#[test]
fn date_order_is_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let fx = three_commit_repo(dir.path());
    let result = walken(dir.path(), &["commits", "--date-order", "-n", "1"]);
    assert_eq!(result.stdout, format!("{} Add C\n", fx.commits[2]));
}

#[test]
fn author_filter_in_both_walks() {
    let dir = tempfile::tempdir().unwrap();
    let fx = three_commit_repo(dir.path());

    let commits = walken(dir.path(), &["commits", "--author", "gmail"]);
    assert_eq!(commits.stdout, format!("{} Add B\n", fx.commits[1]));

    let inverted = walken(dir.path(), &["commits", "--author", "gmail", "--invert-grep"]);
    assert_eq!(inverted.stdout.lines().count(), 2);

    let objects = walken(dir.path(), &["objects", "--author", "nobody@nowhere"]);
    assert_eq!(objects.exit_code, 0);
    assert_eq!(
        objects.stdout,
        "commits 0\n blobs 0\n tags 0\n trees 0 omitted 0\n"
    );
}

#[test]
fn grep_and_header_filters() {
    let dir = tempfile::tempdir().unwrap();
    let fx = three_commit_repo(dir.path());

    let grep = walken(dir.path(), &["commits", "--grep", "Body of [AC]"]);
    assert_eq!(grep.stdout.lines().count(), 2);

    let tree_hex = fx.trees[0].to_hex();
    let header = format!("tree={tree_hex}");
    let by_tree = walken(dir.path(), &["commits", "--header", &header]);
    assert_eq!(by_tree.stdout, format!("{} Add A\n", fx.commits[0]));

    let bad = walken(dir.path(), &["commits", "--grep", "("]);
    assert_eq!(bad.exit_code, 128);
    assert!(bad.stderr.starts_with("fatal: invalid pattern"));
}

#[test]
fn explicit_revisions_and_git_dir() {
    let dir = tempfile::tempdir().unwrap();
    let fx = three_commit_repo(dir.path());
    let elsewhere = tempfile::tempdir().unwrap();
    let git_dir = dir.path().join(".git");

    let b = fx.commits[1].to_hex();
    let result = walken(
        elsewhere.path(),
        &["--git-dir", git_dir.to_str().unwrap(), "commits", &b],
    );
    assert_eq!(result.exit_code, 0, "stderr: {}", result.stderr);
    assert_eq!(result.stdout.lines().count(), 2);

    let via_c = walken(
        elsewhere.path(),
        &["-C", dir.path().to_str().unwrap(), "commits", "main"],
    );
    assert_eq!(via_c.stdout.lines().count(), 3);
}

#[test]
fn unborn_head_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    walken_odb::LooseStore::init(dir.path().join(".git")).unwrap();
    let result = walken(dir.path(), &["objects"]);
    assert_eq!(result.exit_code, 128);
    assert!(result.stderr.starts_with("fatal: no entry point"), "{}", result.stderr);
    assert!(result.stderr.contains("HEAD"));
    assert!(result.stdout.is_empty());
}

#[test]
fn outside_a_repository_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let result = walken(dir.path(), &["commits"]);
    assert_eq!(result.exit_code, 128);
    assert!(result.stderr.contains("not a git repository"));
}

#[test]
fn missing_object_is_fatal_without_summary() {
    let dir = tempfile::tempdir().unwrap();
    let fx = three_commit_repo(dir.path());
    let path = dir
        .path()
        .join(".git/objects")
        .join(fx.blobs[1].loose_path());
    std::fs::remove_file(path).unwrap();

    let result = walken(dir.path(), &["objects"]);
    assert_eq!(result.exit_code, 128);
    assert!(result.stderr.contains(&fx.blobs[1].to_hex()));
    assert!(!result.stdout.contains("commits 3"));
}

#[test]
fn git_trace_logs_to_stderr_only() {
    let dir = tempfile::tempdir().unwrap();
    three_commit_repo(dir.path());
    let quiet = walken(dir.path(), &["objects"]);
    let traced = walken_env(dir.path(), &["objects"], &[("GIT_TRACE", "1")]);
    assert_eq!(quiet.stdout, traced.stdout);
    assert!(quiet.stderr.is_empty());
    assert!(traced.stderr.contains("walk phase"));
}

fn git(dir: &Path, args: &[&str], date: &str) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env("GIT_AUTHOR_NAME", "Test Author")
        .env("GIT_AUTHOR_EMAIL", "author@test.com")
        .env("GIT_COMMITTER_NAME", "Test Committer")
        .env("GIT_COMMITTER_EMAIL", "committer@test.com")
        .env("GIT_AUTHOR_DATE", date)
        .env("GIT_COMMITTER_DATE", date)
        .output()
        .expect("failed to run git");
    assert!(status.status.success(), "git {args:?} failed");
}

fn git_stdout(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .output()
        .expect("failed to run git");
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn matches_git_on_a_real_repository() {
    if !git_available() {
        eprintln!("git not found; skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let repo = dir.path();
    git(repo, &["init", "-q"], "1700000000 +0000");
    std::fs::create_dir(repo.join("src")).unwrap();
    for (i, name) in ["one", "two", "three"].iter().enumerate() {
        std::fs::write(repo.join("src").join(name), format!("{name}\n")).unwrap();
        std::fs::write(repo.join("README"), format!("step {i}\n")).unwrap();
        let date = format!("{} +0000", 1_700_000_000 + i * 100);
        git(repo, &["add", "."], &date);
        git(repo, &["commit", "-q", "-m", name], &date);
    }

    let ours = walken(repo, &["commits"]);
    assert_eq!(ours.exit_code, 0, "stderr: {}", ours.stderr);
    let our_ids: Vec<&str> = ours
        .stdout
        .lines()
        .map(|l| l.split(' ').next().unwrap())
        .collect();
    let theirs = git_stdout(repo, &["rev-list", "--reverse", "HEAD"]);
    assert_eq!(our_ids, theirs.lines().collect::<Vec<_>>());

    let objects = walken(repo, &["objects"]);
    let our_objects: BTreeSet<String> = objects
        .stdout
        .lines()
        .filter_map(|l| l.split_once(": ").map(|(_, hex)| hex.to_string()))
        .collect();
    let their_objects: BTreeSet<String> = git_stdout(repo, &["rev-list", "--objects", "HEAD"])
        .lines()
        .map(|l| l.split(' ').next().unwrap().to_string())
        .collect();
    assert_eq!(our_objects, their_objects);
}
