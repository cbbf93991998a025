use std::fmt;
use std::str::FromStr;

use crate::{hex, HashError};

/// Hash function an object id was computed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl HashAlgorithm {
    /// Digest length in bytes.
    pub const fn digest_len(&self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
        }
    }

    /// Length of the hex form.
    pub const fn hex_len(&self) -> usize {
        self.digest_len() * 2
    }

    fn from_hex_len(len: usize) -> Option<Self> {
        match len {
            40 => Some(Self::Sha1),
            64 => Some(Self::Sha256),
            _ => None,
        }
    }
}

/// Identifier of one object in the graph: the digest of its canonical form.
///
/// Equality and ordering are by raw byte value, which is what the date
/// orderings use as their tie-breaker.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectId {
    Sha1([u8; 20]),
    Sha256([u8; 32]),
}

impl ObjectId {
    /// Build an id from raw digest bytes.
    pub fn from_bytes(bytes: &[u8], algo: HashAlgorithm) -> Result<Self, HashError> {
        if bytes.len() != algo.digest_len() {
            return Err(HashError::InvalidHashLength {
                expected: algo.digest_len(),
                actual: bytes.len(),
            });
        }
        Ok(match algo {
            HashAlgorithm::Sha1 => {
                let mut arr = [0u8; 20];
                arr.copy_from_slice(bytes);
                Self::Sha1(arr)
            }
            HashAlgorithm::Sha256 => {
                let mut arr = [0u8; 32];
                arr.copy_from_slice(bytes);
                Self::Sha256(arr)
            }
        })
    }

    /// Parse a full-length hex id; the algorithm follows from the length.
    pub fn from_hex(s: &str) -> Result<Self, HashError> {
        let algo = HashAlgorithm::from_hex_len(s.len()).ok_or(HashError::InvalidHexLength {
            expected: HashAlgorithm::Sha1.hex_len(),
            actual: s.len(),
        })?;
        let mut buf = [0u8; 32];
        let digest = &mut buf[..algo.digest_len()];
        hex::decode_into(s, digest)?;
        Self::from_bytes(digest, algo)
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Sha1(b) => b,
            Self::Sha256(b) => b,
        }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        match self {
            Self::Sha1(_) => HashAlgorithm::Sha1,
            Self::Sha256(_) => HashAlgorithm::Sha256,
        }
    }

    /// Lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    /// The first `len` hex digits (clamped to the full length).
    pub fn to_short_hex(&self, len: usize) -> String {
        let mut full = self.to_hex();
        full.truncate(len.max(4));
        full
    }

    /// Path of the loose object relative to `objects/`: `"xx/yyyy..."`.
    pub fn loose_path(&self) -> String {
        let hex = self.to_hex();
        format!("{}/{}", &hex[..2], &hex[2..])
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_short_hex(8))
    }
}

impl FromStr for ObjectId {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
