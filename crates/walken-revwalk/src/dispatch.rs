//! Routing of emitted objects to type-specific visitor callbacks.

use walken_hash::ObjectId;
use walken_object::{Blob, Commit, Object, Tag, Tree};

use crate::WalkError;

/// Per-class tallies for one walk session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkCounts {
    pub commits: usize,
    pub trees: usize,
    pub blobs: usize,
    pub tags: usize,
    pub omitted: usize,
}

/// Callbacks invoked for each emitted object.
///
/// Every callback sees the session counts with the current object already
/// included. All methods default to doing nothing.
pub trait Visitor {
    fn on_commit(
        &mut self,
        _oid: &ObjectId,
        _commit: &Commit,
        _counts: &WalkCounts,
    ) -> Result<(), WalkError> {
        Ok(())
    }

    fn on_tree(&mut self, _oid: &ObjectId, _tree: &Tree, _counts: &WalkCounts) -> Result<(), WalkError> {
        Ok(())
    }

    fn on_blob(&mut self, _oid: &ObjectId, _blob: &Blob, _counts: &WalkCounts) -> Result<(), WalkError> {
        Ok(())
    }

    fn on_tag(&mut self, _oid: &ObjectId, _tag: &Tag, _counts: &WalkCounts) -> Result<(), WalkError> {
        Ok(())
    }
}

impl<V: Visitor + ?Sized> Visitor for &mut V {
    fn on_commit(&mut self, oid: &ObjectId, commit: &Commit, counts: &WalkCounts) -> Result<(), WalkError> {
        (**self).on_commit(oid, commit, counts)
    }

    fn on_tree(&mut self, oid: &ObjectId, tree: &Tree, counts: &WalkCounts) -> Result<(), WalkError> {
        (**self).on_tree(oid, tree, counts)
    }

    fn on_blob(&mut self, oid: &ObjectId, blob: &Blob, counts: &WalkCounts) -> Result<(), WalkError> {
        (**self).on_blob(oid, blob, counts)
    }

    fn on_tag(&mut self, oid: &ObjectId, tag: &Tag, counts: &WalkCounts) -> Result<(), WalkError> {
        (**self).on_tag(oid, tag, counts)
    }
}

/// The single place where counts are incremented and visitors called.
///
/// Commits travel [`dispatch_commit`](Self::dispatch_commit); everything
/// else travels [`dispatch_object`](Self::dispatch_object). Handing a commit
/// to the latter means the traversal is broken and aborts with a `BUG:`
/// panic.
#[derive(Debug)]
pub struct Dispatcher<V> {
    visitor: V,
    counts: WalkCounts,
}

impl<V: Visitor> Dispatcher<V> {
    pub fn new(visitor: V) -> Self {
        Self {
            visitor,
            counts: WalkCounts::default(),
        }
    }

    pub fn dispatch_commit(&mut self, oid: &ObjectId, commit: &Commit) -> Result<(), WalkError> {
        self.counts.commits += 1;
        tracing::trace!(%oid, "dispatch commit");
        self.visitor.on_commit(oid, commit, &self.counts)
    }

    pub fn dispatch_object(&mut self, oid: &ObjectId, object: &Object) -> Result<(), WalkError> {
        tracing::trace!(%oid, kind = %object.object_type(), "dispatch object");
        match object {
            Object::Commit(_) => {
                panic!("BUG: unexpected commit object {oid} on the non-commit dispatch path")
            }
            Object::Tree(tree) => {
                self.counts.trees += 1;
                self.visitor.on_tree(oid, tree, &self.counts)
            }
            Object::Blob(blob) => {
                self.counts.blobs += 1;
                self.visitor.on_blob(oid, blob, &self.counts)
            }
            Object::Tag(tag) => {
                self.counts.tags += 1;
                self.visitor.on_tag(oid, tag, &self.counts)
            }
        }
    }

    pub(crate) fn set_omitted(&mut self, omitted: usize) {
        self.counts.omitted = omitted;
    }

    pub fn counts(&self) -> &WalkCounts {
        &self.counts
    }

    pub fn into_visitor(self) -> V {
        self.visitor
    }
}
