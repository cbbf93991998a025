//! Pending references and the session-wide seen set.

use std::collections::VecDeque;

use walken_hash::{ObjectId, OidSet};

/// FIFO of references awaiting expansion plus a monotonic seen set.
///
/// A reference is queued at most once while pending and never again once
/// it has been marked seen, so each reference is expanded at most once per
/// session even on malformed graphs.
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    queue: VecDeque<ObjectId>,
    queued: OidSet,
    seen: OidSet,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `oid` unless it is already pending or seen.
    pub fn seed(&mut self, oid: ObjectId) -> bool {
        if self.seen.contains(&oid) || !self.queued.insert(oid) {
            return false;
        }
        self.queue.push_back(oid);
        true
    }

    /// Remove the oldest pending reference.
    pub fn take_next(&mut self) -> Option<ObjectId> {
        let oid = self.queue.pop_front()?;
        self.queued.remove(&oid);
        Some(oid)
    }

    /// Mark `oid` as expanded. Returns `false` if it already was.
    pub fn mark_seen(&mut self, oid: ObjectId) -> bool {
        self.seen.insert(oid)
    }

    pub fn is_seen(&self, oid: &ObjectId) -> bool {
        self.seen.contains(oid)
    }

    /// Number of pending references.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
