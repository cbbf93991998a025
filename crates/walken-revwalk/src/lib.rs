//! Graph walk and filter engine.
//!
//! A [`WalkSession`] starts from a [`Frontier`] of named entry points,
//! expands the commit graph through an [`ObjectStore`](walken_odb::ObjectStore),
//! orders the commits it found ([`SortOrder`]), gates them through a
//! [`FilterChain`] and hands every emitted object to a [`Visitor`] via the
//! [`Dispatcher`]. Objects a structural filter excludes are collected in the
//! omitted set of the final [`WalkReport`] instead of being resolved.

mod dispatch;
mod filter;
mod frontier;
mod interrupt;
mod ordering;
mod pretty;
mod session;

pub use dispatch::{Dispatcher, Visitor, WalkCounts};
pub use filter::{
    CommitPredicate, DateRange, FilterChain, HeaderGrep, MessageGrep, StructuralFilter,
};
pub use frontier::Frontier;
pub use interrupt::Interrupt;
pub use ordering::{order_commits, CommitMeta, SortOrder};
pub use pretty::{format_object_line, format_oneline, format_summary};
pub use session::{WalkMode, WalkOptions, WalkPhase, WalkReport, WalkSession};

use walken_hash::ObjectId;
use walken_odb::StoreError;

/// Errors produced by a walk session.
#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    #[error("no entry point to walk from{}", describe_names(.names))]
    EmptyFrontier { names: Vec<String> },

    #[error("invalid filter '{spec}': {reason}")]
    InvalidFilter { spec: String, reason: String },

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("unable to resolve '{name}': {source}")]
    Name {
        name: String,
        #[source]
        source: StoreError,
    },

    #[error("unable to read object {oid}: {source}")]
    Resolution {
        oid: ObjectId,
        #[source]
        source: StoreError,
    },

    #[error("walk interrupted")]
    Interrupted,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn describe_names(names: &[String]) -> String {
    if names.is_empty() {
        String::new()
    } else {
        format!(" (unresolved: {})", names.join(", "))
    }
}
