//! Object ids computed from the canonical serialization must match git's.

use walken_hash::{HashAlgorithm, ObjectId};
use walken_object::{Blob, Commit, FileMode, Object, Signature, Tree, TreeEntry};

fn hex(s: &str) -> ObjectId {
    ObjectId::from_hex(s).unwrap()
}

#[test]
fn blob_tree_commit_chain_matches_git() {
    let blob = Object::Blob(Blob::new(b"hello\n".to_vec()));
    let blob_id = blob.compute_oid(HashAlgorithm::Sha1).unwrap();
    assert_eq!(blob_id, hex("ce013625030ba8dba906f756967f9e9ca394464a"));

    let tree = Object::Tree(Tree::new(vec![TreeEntry::new(
        FileMode::Regular,
        "hello.txt",
        blob_id,
    )]));
    let tree_id = tree.compute_oid(HashAlgorithm::Sha1).unwrap();
    assert_eq!(tree_id, hex("aaa96ced2d9a1c8e72c56b253a0e2fe78393feb7"));

    let commit = Object::Commit(Commit {
        tree: tree_id,
        parents: vec![],
        author: Signature::new("A U Thor", "author@example.com", 1_700_000_000, 0),
        committer: Signature::new("C O Mitter", "committer@example.com", 1_700_000_000, 0),
        extra_headers: vec![],
        message: "first\n".into(),
    });
    assert_eq!(
        commit.compute_oid(HashAlgorithm::Sha1).unwrap(),
        hex("d5a6df4659c45f10c2fa9865ff3260abe9120078")
    );
}

#[test]
fn stored_form_parses_back_for_every_class() {
    let blob_id = hex("ce013625030ba8dba906f756967f9e9ca394464a");
    let tree = Object::Tree(Tree::new(vec![
        TreeEntry::new(FileMode::Regular, "a", blob_id),
        TreeEntry::new(FileMode::Tree, "dir", blob_id),
    ]));
    let parsed = Object::parse(&tree.serialize(), HashAlgorithm::Sha1).unwrap();
    assert_eq!(parsed.object_type(), tree.object_type());
    match parsed {
        Object::Tree(t) => assert_eq!(t.len(), 2),
        other => panic!("expected a tree, got {:?}", other.object_type()),
    }
}
