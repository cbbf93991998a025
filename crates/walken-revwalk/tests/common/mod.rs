//! Synthetic object graphs for walk tests.

#![allow(dead_code)]

use walken_hash::ObjectId;
use walken_object::{Blob, Commit, FileMode, Object, Signature, Tag, Tree, TreeEntry};
use walken_odb::{Head, MemoryStore};
use walken_revwalk::{Visitor, WalkCounts, WalkError};

pub struct Graph {
    pub store: MemoryStore,
}

impl Graph {
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
        }
    }

    pub fn blob(&mut self, content: &str) -> ObjectId {
        self.store
            .insert(Object::Blob(Blob::new(content.as_bytes().to_vec())))
            .unwrap()
    }

    /// A tree from `(name, mode, oid)` triples.
    pub fn tree(&mut self, entries: &[(&str, FileMode, ObjectId)]) -> ObjectId {
        let entries = entries
            .iter()
            .map(|(name, mode, oid)| TreeEntry::new(*mode, name, *oid))
            .collect();
        self.store.insert(Object::Tree(Tree::new(entries))).unwrap()
    }

    pub fn commit(&mut self, tree: ObjectId, parents: &[ObjectId], time: i64, message: &str) -> ObjectId {
        self.commit_by("A U Thor", "author@example.com", tree, parents, time, message)
    }

    pub fn commit_by(
        &mut self,
        name: &str,
        email: &str,
        tree: ObjectId,
        parents: &[ObjectId],
        time: i64,
        message: &str,
    ) -> ObjectId {
        let commit = Commit {
            tree,
            parents: parents.to_vec(),
            author: Signature::new(name, email, time, 0),
            committer: Signature::new("C O Mitter", "committer@example.com", time, 0),
            extra_headers: vec![],
            message: message.into(),
        };
        self.store.insert(Object::Commit(commit)).unwrap()
    }

    pub fn commit_dated(
        &mut self,
        tree: ObjectId,
        parents: &[ObjectId],
        author_time: i64,
        commit_time: i64,
        message: &str,
    ) -> ObjectId {
        let commit = Commit {
            tree,
            parents: parents.to_vec(),
            author: Signature::new("A U Thor", "author@example.com", author_time, 0),
            committer: Signature::new("C O Mitter", "committer@example.com", commit_time, 0),
            extra_headers: vec![],
            message: message.into(),
        };
        self.store.insert(Object::Commit(commit)).unwrap()
    }

    pub fn tag(&mut self, name: &str, target: ObjectId, target_type: walken_object::ObjectType) -> ObjectId {
        let tag = Tag {
            target,
            target_type,
            name: name.into(),
            tagger: Some(Signature::new("T", "t@example.com", 1_700_000_000, 0)),
            message: format!("{name}\n").into(),
        };
        self.store.insert(Object::Tag(tag)).unwrap()
    }

    pub fn branch(&mut self, name: &str, oid: ObjectId) {
        self.store.set_ref(&format!("refs/heads/{name}"), oid);
    }

    pub fn head_on(&mut self, branch: &str) {
        self.store.set_head(Head::Symbolic(format!("refs/heads/{branch}")));
    }
}

/// Linear chain A <- B <- C, each root tree holding one distinct blob.
///
/// Returns the graph and the commits oldest first. `main` and `HEAD`
/// point at C.
pub fn three_commit_chain() -> (Graph, Vec<ObjectId>) {
    let mut g = Graph::new();
    let mut commits = Vec::new();
    let mut parent: Option<ObjectId> = None;
    for (i, name) in ["A", "B", "C"].iter().enumerate() {
        let blob = g.blob(&format!("content of {name}\n"));
        let tree = g.tree(&[("file.txt", FileMode::Regular, blob)]);
        let parents: Vec<ObjectId> = parent.into_iter().collect();
        let commit = g.commit(tree, &parents, 1_700_000_000 + i as i64 * 100, &format!("{name}\n"));
        commits.push(commit);
        parent = Some(commit);
    }
    g.branch("main", commits[2]);
    g.head_on("main");
    (g, commits)
}

/// Visitor that records `<type>: <hex>` lines like the object walk output.
#[derive(Default)]
pub struct Lines {
    pub lines: Vec<String>,
    pub last_counts: WalkCounts,
}

impl Visitor for Lines {
    fn on_commit(&mut self, oid: &ObjectId, _: &Commit, counts: &WalkCounts) -> Result<(), WalkError> {
        self.lines.push(format!("commit: {oid}"));
        self.last_counts = *counts;
        Ok(())
    }

    fn on_tree(&mut self, oid: &ObjectId, _: &Tree, counts: &WalkCounts) -> Result<(), WalkError> {
        self.lines.push(format!("tree: {oid}"));
        self.last_counts = *counts;
        Ok(())
    }

    fn on_blob(&mut self, oid: &ObjectId, _: &Blob, counts: &WalkCounts) -> Result<(), WalkError> {
        self.lines.push(format!("blob: {oid}"));
        self.last_counts = *counts;
        Ok(())
    }

    fn on_tag(&mut self, oid: &ObjectId, _: &Tag, counts: &WalkCounts) -> Result<(), WalkError> {
        self.lines.push(format!("tag: {oid}"));
        self.last_counts = *counts;
        Ok(())
    }
}

/// Visitor that only keeps emitted commit ids.
#[derive(Default)]
pub struct CommitIds(pub Vec<ObjectId>);

impl Visitor for CommitIds {
    fn on_commit(&mut self, oid: &ObjectId, _: &Commit, _: &WalkCounts) -> Result<(), WalkError> {
        self.0.push(*oid);
        Ok(())
    }
}
