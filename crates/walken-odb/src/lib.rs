//! Object store and entry-point resolution for the walken graph walker.
//!
//! The walker never reads storage itself. It talks to two collaborators:
//!
//! - an [`ObjectStore`], which turns an [`ObjectId`] into a parsed [`Object`]
//!   or reports it missing or corrupt;
//! - a [`RefResolver`], which maps a caller-supplied name (`HEAD`, a branch,
//!   a tag, a full hex id) to zero or one [`ObjectId`].
//!
//! Two backends implement both: [`MemoryStore`] for synthetic graphs and
//! [`LooseStore`] for a `.git` directory holding loose objects.

mod discover;
mod loose;
mod memory;
pub mod refs;

pub use discover::discover_git_dir;
pub use loose::LooseStore;
pub use memory::MemoryStore;
pub use refs::Head;

use std::path::PathBuf;

use walken_hash::ObjectId;
use walken_object::Object;

/// Errors reported by store backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("object {0} not found")]
    NotFound(ObjectId),

    #[error("object {oid} is corrupt: {reason}")]
    Corrupt { oid: ObjectId, reason: String },

    #[error("invalid reference '{name}': {reason}")]
    InvalidRef { name: String, reason: String },

    #[error("not a git repository (or any of the parent directories): {0}")]
    NotARepository(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether the failure means the object is absent rather than unreadable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Resolution of object ids to parsed objects.
///
/// Implementations must be deterministic for a given id within one walk
/// session. No retry is expected of callers.
pub trait ObjectStore {
    fn resolve(&self, oid: &ObjectId) -> Result<Object, StoreError>;
}

/// Resolution of entry-point names to object ids.
pub trait RefResolver {
    /// `Ok(None)` when nothing matches `name`.
    fn resolve_name(&self, name: &str) -> Result<Option<ObjectId>, StoreError>;
}

impl<T: ObjectStore + ?Sized> ObjectStore for &T {
    fn resolve(&self, oid: &ObjectId) -> Result<Object, StoreError> {
        (**self).resolve(oid)
    }
}

impl<T: RefResolver + ?Sized> RefResolver for &T {
    fn resolve_name(&self, name: &str) -> Result<Option<ObjectId>, StoreError> {
        (**self).resolve_name(name)
    }
}
