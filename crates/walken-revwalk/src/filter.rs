//! Metadata filters on commits and structural filters on trees and blobs.
//!
//! Metadata filters decide whether a commit is emitted; its parents are
//! traversed either way. Structural filters decide whether a tree entry is
//! expanded at all; entries they reject land in the omitted set without
//! being read from the store.

use bstr::BString;
use regex::bytes::Regex;
use walken_hash::ObjectId;
use walken_object::{Commit, FileMode};

use crate::WalkError;

/// A yes/no decision about a single commit.
pub trait CommitPredicate {
    fn matches(&self, oid: &ObjectId, commit: &Commit) -> bool;
}

impl<F> CommitPredicate for F
where
    F: Fn(&ObjectId, &Commit) -> bool,
{
    fn matches(&self, oid: &ObjectId, commit: &Commit) -> bool {
        self(oid, commit)
    }
}

fn compile(pattern: &str) -> Result<Regex, WalkError> {
    Regex::new(pattern).map_err(|source| WalkError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Match a regex against the value of a named header field.
///
/// `author` and `committer` match the whole identity line
/// (`Name <email> time tz`). Commits without the field never match.
#[derive(Debug, Clone)]
pub struct HeaderGrep {
    field: BString,
    pattern: Regex,
}

impl HeaderGrep {
    pub fn new(field: &str, pattern: &str) -> Result<Self, WalkError> {
        Ok(Self {
            field: BString::from(field),
            pattern: compile(pattern)?,
        })
    }

    pub fn author(pattern: &str) -> Result<Self, WalkError> {
        Self::new("author", pattern)
    }

    pub fn committer(pattern: &str) -> Result<Self, WalkError> {
        Self::new("committer", pattern)
    }

    /// Parse `<field>=<regex>`.
    pub fn parse(spec: &str) -> Result<Self, WalkError> {
        match spec.split_once('=') {
            Some((field, pattern)) if !field.is_empty() => Self::new(field, pattern),
            _ => Err(WalkError::InvalidFilter {
                spec: spec.to_string(),
                reason: "expected <field>=<pattern>".into(),
            }),
        }
    }
}

impl CommitPredicate for HeaderGrep {
    fn matches(&self, _oid: &ObjectId, commit: &Commit) -> bool {
        commit
            .header_fields()
            .iter()
            .any(|(name, value)| *name == self.field && self.pattern.is_match(value))
    }
}

/// Match a regex anywhere in the commit message.
#[derive(Debug, Clone)]
pub struct MessageGrep {
    pattern: Regex,
}

impl MessageGrep {
    pub fn new(pattern: &str) -> Result<Self, WalkError> {
        Ok(Self {
            pattern: compile(pattern)?,
        })
    }
}

impl CommitPredicate for MessageGrep {
    fn matches(&self, _oid: &ObjectId, commit: &Commit) -> bool {
        self.pattern.is_match(&commit.message)
    }
}

/// Inclusive bounds on the committer timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub since: Option<i64>,
    pub until: Option<i64>,
}

impl CommitPredicate for DateRange {
    fn matches(&self, _oid: &ObjectId, commit: &Commit) -> bool {
        let time = commit.committer.time;
        self.since.map_or(true, |since| time >= since)
            && self.until.map_or(true, |until| time <= until)
    }
}

/// Filters on the tree/blob subgraph below a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralFilter {
    /// Omit entries deeper than this below the root tree (`tree:<depth>`).
    /// The root tree is depth 0.
    TreeDepth(u32),
    /// Omit every blob (`blob:none`).
    BlobNone,
}

impl StructuralFilter {
    /// Parse a filter spec: `tree:<depth>` or `blob:none`.
    pub fn parse(spec: &str) -> Result<Self, WalkError> {
        if spec == "blob:none" {
            return Ok(Self::BlobNone);
        }
        if let Some(depth) = spec.strip_prefix("tree:") {
            return depth
                .parse()
                .map(Self::TreeDepth)
                .map_err(|_| WalkError::InvalidFilter {
                    spec: spec.to_string(),
                    reason: format!("invalid tree depth '{depth}'"),
                });
        }
        Err(WalkError::InvalidFilter {
            spec: spec.to_string(),
            reason: "unknown filter".into(),
        })
    }

    /// Whether an entry with `mode` at `depth` may be expanded.
    pub fn admits(&self, mode: FileMode, depth: u32) -> bool {
        match self {
            Self::TreeDepth(limit) => depth <= *limit,
            Self::BlobNone => !mode.is_blob(),
        }
    }
}

impl std::fmt::Display for StructuralFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TreeDepth(depth) => write!(f, "tree:{depth}"),
            Self::BlobNone => f.write_str("blob:none"),
        }
    }
}

/// Every filter installed on a session.
///
/// Commit predicates are AND-composed; `invert` flips the combined verdict.
/// An empty chain admits every commit and every entry.
#[derive(Default)]
pub struct FilterChain {
    predicates: Vec<Box<dyn CommitPredicate>>,
    invert: bool,
    structural: Option<StructuralFilter>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, predicate: impl CommitPredicate + 'static) {
        self.predicates.push(Box::new(predicate));
    }

    pub fn with(mut self, predicate: impl CommitPredicate + 'static) -> Self {
        self.push(predicate);
        self
    }

    pub fn set_invert(&mut self, invert: bool) {
        self.invert = invert;
    }

    pub fn set_structural(&mut self, filter: Option<StructuralFilter>) {
        self.structural = filter;
    }

    pub fn structural(&self) -> Option<StructuralFilter> {
        self.structural
    }

    /// Whether `commit` should be emitted.
    pub fn admits_commit(&self, oid: &ObjectId, commit: &Commit) -> bool {
        if self.predicates.is_empty() {
            return true;
        }
        let all = self.predicates.iter().all(|p| p.matches(oid, commit));
        all != self.invert
    }

    /// Whether a tree entry may be expanded.
    pub fn admits_entry(&self, mode: FileMode, depth: u32) -> bool {
        self.structural.map_or(true, |f| f.admits(mode, depth))
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("predicates", &self.predicates.len())
            .field("invert", &self.invert)
            .field("structural", &self.structural)
            .finish()
    }
}
