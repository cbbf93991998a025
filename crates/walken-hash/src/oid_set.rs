use std::collections::HashSet;

use crate::ObjectId;

/// Hash set of object ids.
#[derive(Debug, Clone, Default)]
pub struct OidSet {
    inner: HashSet<ObjectId>,
}

impl OidSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an id. Returns `true` if it was not present before.
    pub fn insert(&mut self, oid: ObjectId) -> bool {
        self.inner.insert(oid)
    }

    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.inner.contains(oid)
    }

    pub fn remove(&mut self, oid: &ObjectId) -> bool {
        self.inner.remove(oid)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectId> {
        self.inner.iter()
    }

    /// Members in byte order, for reproducible reporting.
    pub fn to_sorted_vec(&self) -> Vec<ObjectId> {
        let mut out: Vec<ObjectId> = self.inner.iter().copied().collect();
        out.sort_unstable();
        out
    }
}

impl FromIterator<ObjectId> for OidSet {
    fn from_iter<I: IntoIterator<Item = ObjectId>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}
