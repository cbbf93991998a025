use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use walken_hash::{hex, HashAlgorithm, HashError, ObjectId};
use walken_object::Object;

use crate::refs::{dwim_candidates, Head};
use crate::{ObjectStore, RefResolver, StoreError};

/// An in-memory object graph with refs.
///
/// Objects are addressed by the digest of their canonical form, so ids are
/// the same ones git would compute. Every [`ObjectStore::resolve`] call is
/// counted, which lets callers check how often a walk touched the store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    algo: HashAlgorithm,
    objects: HashMap<ObjectId, Object>,
    refs: BTreeMap<String, ObjectId>,
    head: Option<Head>,
    resolves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_algorithm(algo: HashAlgorithm) -> Self {
        Self {
            algo,
            ..Self::default()
        }
    }

    /// Add an object and return its id. Re-inserting identical content is a no-op.
    pub fn insert(&mut self, object: Object) -> Result<ObjectId, HashError> {
        let oid = object.compute_oid(self.algo)?;
        self.objects.entry(oid).or_insert(object);
        Ok(oid)
    }

    /// Point a full ref name (`refs/heads/main`, ...) at `oid`.
    pub fn set_ref(&mut self, name: &str, oid: ObjectId) {
        self.refs.insert(name.to_string(), oid);
    }

    pub fn set_head(&mut self, head: Head) {
        self.head = Some(head);
    }

    pub fn get(&self, oid: &ObjectId) -> Option<&Object> {
        self.objects.get(oid)
    }

    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.objects.contains_key(oid)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of `resolve` calls served so far.
    pub fn resolve_count(&self) -> usize {
        self.resolves.load(Ordering::Relaxed)
    }

    pub fn reset_resolve_count(&self) {
        self.resolves.store(0, Ordering::Relaxed);
    }
}

impl ObjectStore for MemoryStore {
    fn resolve(&self, oid: &ObjectId) -> Result<Object, StoreError> {
        self.resolves.fetch_add(1, Ordering::Relaxed);
        self.objects.get(oid).cloned().ok_or(StoreError::NotFound(*oid))
    }
}

impl RefResolver for MemoryStore {
    fn resolve_name(&self, name: &str) -> Result<Option<ObjectId>, StoreError> {
        if name == "HEAD" {
            return Ok(match &self.head {
                Some(Head::Detached(oid)) => Some(*oid),
                Some(Head::Symbolic(target)) => self.refs.get(target).copied(),
                None => None,
            });
        }
        if name.len() == self.algo.hex_len() && hex::is_hex(name) {
            return ObjectId::from_hex(name)
                .map(Some)
                .map_err(|e| StoreError::InvalidRef {
                    name: name.to_string(),
                    reason: e.to_string(),
                });
        }
        Ok(dwim_candidates(name)
            .iter()
            .find_map(|candidate| self.refs.get(candidate).copied()))
    }
}
