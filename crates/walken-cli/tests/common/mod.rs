//! Shared harness for walken CLI tests.
//!
//! Fixture repositories are written through `LooseStore`, so the tests do
//! not need a `git` binary.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use walken_hash::ObjectId;
use walken_object::{Blob, Commit, FileMode, Object, Signature, Tree, TreeEntry};
use walken_odb::LooseStore;

pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

pub fn walken_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_walken"))
}

/// Run walken in `dir` with logging env vars cleared.
pub fn walken(dir: &Path, args: &[&str]) -> CommandResult {
    walken_env(dir, args, &[])
}

pub fn walken_env(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> CommandResult {
    let mut cmd = Command::new(walken_bin());
    cmd.args(args)
        .current_dir(dir)
        .env_remove("WALKEN_LOG")
        .env_remove("GIT_TRACE")
        .env_remove("GIT_DIR");
    for (k, v) in env {
        cmd.env(k, v);
    }
    let output = cmd.output().expect("failed to run walken");
    CommandResult {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(128),
    }
}

pub struct Fixture {
    pub store: LooseStore,
    /// Commits oldest first.
    pub commits: Vec<ObjectId>,
    pub trees: Vec<ObjectId>,
    pub blobs: Vec<ObjectId>,
}

/// A worktree at `dir` whose `main` holds the chain A <- B <- C, each commit
/// with a root tree of one file. `gmail` authors only B.
pub fn three_commit_repo(dir: &Path) -> Fixture {
    let store = LooseStore::init(dir.join(".git")).unwrap();
    let mut fixture = Fixture {
        store,
        commits: Vec::new(),
        trees: Vec::new(),
        blobs: Vec::new(),
    };
    for (i, name) in ["A", "B", "C"].iter().enumerate() {
        let blob = fixture
            .store
            .write(&Object::Blob(Blob::new(format!("{name}\n").into_bytes())))
            .unwrap();
        let tree = fixture
            .store
            .write(&Object::Tree(Tree::new(vec![TreeEntry::new(
                FileMode::Regular,
                &format!("{}.txt", name.to_lowercase()),
                blob,
            )])))
            .unwrap();
        let email = if *name == "B" { "bee@gmail.com" } else { "author@example.com" };
        let time = 1_700_000_000 + i as i64 * 60;
        let commit = Commit {
            tree,
            parents: fixture.commits.last().copied().into_iter().collect(),
            author: Signature::new("A U Thor", email, time, 0),
            committer: Signature::new("C O Mitter", "committer@example.com", time, 0),
            extra_headers: vec![],
            message: format!("Add {name}\n\nBody of {name}.\n").into(),
        };
        let oid = fixture.store.write(&Object::Commit(commit)).unwrap();
        fixture.blobs.push(blob);
        fixture.trees.push(tree);
        fixture.commits.push(oid);
    }
    fixture
        .store
        .write_ref("refs/heads/main", &fixture.commits[2])
        .unwrap();
    fixture
}

pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
