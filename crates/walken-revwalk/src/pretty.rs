//! Line formats for walk output.
//!
//! These are script-facing: field order and labels are fixed.

use bstr::ByteSlice;
use walken_hash::ObjectId;
use walken_object::{Commit, ObjectType};

use crate::dispatch::WalkCounts;

/// `<hex> <subject>`, the oneline commit format.
///
/// `abbrev` shortens the id to that many hex digits (at least 4).
pub fn format_oneline(oid: &ObjectId, commit: &Commit, abbrev: Option<usize>) -> String {
    let id = match abbrev {
        Some(len) => oid.to_short_hex(len),
        None => oid.to_hex(),
    };
    format!("{id} {}", commit.summary().to_str_lossy())
}

/// `<type>: <hex>`, one line per object in an object walk.
pub fn format_object_line(kind: ObjectType, oid: &ObjectId) -> String {
    format!("{kind}: {oid}")
}

/// The closing tally of an object walk, trailing newline included.
pub fn format_summary(counts: &WalkCounts) -> String {
    format!(
        "commits {}\n blobs {}\n tags {}\n trees {} omitted {}\n",
        counts.commits, counts.blobs, counts.tags, counts.trees, counts.omitted
    )
}
