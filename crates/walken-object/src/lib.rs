//! Object model for the walken graph walker.
//!
//! The graph has four node classes: commits point at parent commits and a
//! root tree, trees point at subtrees and blobs, tags point at any object,
//! and blobs are leaves. [`Object`] is the closed sum type over those
//! classes; consumers match on it exhaustively so that a new class is a
//! compile-time decision everywhere it matters.

mod blob;
mod commit;
pub mod header;
mod signature;
mod tag;
mod tree;

pub use blob::Blob;
pub use commit::Commit;
pub use signature::Signature;
pub use tag::Tag;
pub use tree::{FileMode, Tree, TreeEntry};

use bstr::BString;
use walken_hash::hasher::Hasher;
use walken_hash::{HashAlgorithm, HashError, ObjectId};

/// Errors produced while parsing object content.
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    #[error("invalid object type: {0}")]
    InvalidType(BString),

    #[error("invalid object header: {0}")]
    InvalidHeader(String),

    #[error("truncated object: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("invalid tree entry at offset {offset}: {reason}")]
    InvalidTreeEntry { offset: usize, reason: String },

    #[error("invalid commit: missing '{field}' header")]
    MissingCommitField { field: &'static str },

    #[error("invalid tag: missing '{field}' header")]
    MissingTagField { field: &'static str },

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error(transparent)]
    Hash(#[from] HashError),
}

/// The class of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Commit,
    Tree,
    Blob,
    Tag,
}

impl ObjectType {
    /// Parse the type name used in object headers.
    pub fn from_bytes(s: &[u8]) -> Result<Self, ObjectError> {
        match s {
            b"commit" => Ok(Self::Commit),
            b"tree" => Ok(Self::Tree),
            b"blob" => Ok(Self::Blob),
            b"tag" => Ok(Self::Tag),
            _ => Err(ObjectError::InvalidType(BString::from(s))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::Tree => "tree",
            Self::Blob => "blob",
            Self::Tag => "tag",
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ObjectType {
    type Err = ObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.as_bytes())
    }
}

/// A resolved graph node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    Commit(Commit),
    Tree(Tree),
    Blob(Blob),
    Tag(Tag),
}

impl Object {
    /// Parse a full loose-object payload (`"<type> <size>\0"` + content).
    pub fn parse(data: &[u8], algo: HashAlgorithm) -> Result<Self, ObjectError> {
        let (obj_type, size, header_len) = header::parse_header(data)?;
        let content = &data[header_len..];
        if content.len() != size {
            return Err(ObjectError::Truncated {
                expected: size,
                actual: content.len(),
            });
        }
        Self::parse_content(obj_type, content, algo)
    }

    /// Parse content bytes of a known type.
    pub fn parse_content(
        obj_type: ObjectType,
        content: &[u8],
        algo: HashAlgorithm,
    ) -> Result<Self, ObjectError> {
        Ok(match obj_type {
            ObjectType::Commit => Self::Commit(Commit::parse(content)?),
            ObjectType::Tree => Self::Tree(Tree::parse(content, algo)?),
            ObjectType::Blob => Self::Blob(Blob::new(content.to_vec())),
            ObjectType::Tag => Self::Tag(Tag::parse(content)?),
        })
    }

    /// Canonical content bytes (no header).
    pub fn serialize_content(&self) -> Vec<u8> {
        match self {
            Self::Commit(c) => c.serialize_content(),
            Self::Tree(t) => t.serialize_content(),
            Self::Blob(b) => b.data.clone(),
            Self::Tag(t) => t.serialize_content(),
        }
    }

    /// Header plus content, as stored in a loose object file.
    pub fn serialize(&self) -> Vec<u8> {
        let content = self.serialize_content();
        let mut out = header::write_header(self.object_type(), content.len());
        out.extend_from_slice(&content);
        out
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::Commit(_) => ObjectType::Commit,
            Self::Tree(_) => ObjectType::Tree,
            Self::Blob(_) => ObjectType::Blob,
            Self::Tag(_) => ObjectType::Tag,
        }
    }

    /// The content address of this object.
    pub fn compute_oid(&self, algo: HashAlgorithm) -> Result<ObjectId, HashError> {
        Hasher::hash_object(algo, self.object_type().as_str(), &self.serialize_content())
    }
}
