//! Object identity for the walken graph walker.
//!
//! An [`ObjectId`] names exactly one node of the object graph. It is a plain
//! value: comparable byte-wise, hashable, and cheap to copy, so the walker can
//! keep it in frontiers and seen-sets without any ownership concerns.

mod error;
pub mod hex;
mod oid;
pub mod hasher;
mod oid_set;

pub use error::HashError;
pub use oid::{HashAlgorithm, ObjectId};
pub use oid_set::OidSet;
