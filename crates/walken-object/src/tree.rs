use std::cmp::Ordering;

use bstr::{BString, ByteSlice};
use walken_hash::{HashAlgorithm, ObjectId};

use crate::ObjectError;

/// Mode of a tree entry; decides what kind of child the entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileMode {
    /// 100644
    Regular,
    /// 100755
    Executable,
    /// 120000
    Symlink,
    /// 160000, a submodule commit that lives in another repository.
    Gitlink,
    /// 40000
    Tree,
    Unknown(u32),
}

impl FileMode {
    pub fn from_bytes(s: &[u8]) -> Option<Self> {
        if s.is_empty() {
            return None;
        }
        let mut raw: u32 = 0;
        for &b in s {
            if !(b'0'..=b'7').contains(&b) {
                return None;
            }
            raw = raw.checked_mul(8)?.checked_add(u32::from(b - b'0'))?;
        }
        Some(Self::from_raw(raw))
    }

    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0o100644 => Self::Regular,
            0o100755 => Self::Executable,
            0o120000 => Self::Symlink,
            0o160000 => Self::Gitlink,
            0o040000 => Self::Tree,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(&self) -> u32 {
        match self {
            Self::Regular => 0o100644,
            Self::Executable => 0o100755,
            Self::Symlink => 0o120000,
            Self::Gitlink => 0o160000,
            Self::Tree => 0o040000,
            Self::Unknown(v) => *v,
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Tree)
    }

    /// Entries whose child is a blob: files and symlinks.
    pub fn is_blob(&self) -> bool {
        matches!(self, Self::Regular | Self::Executable | Self::Symlink)
    }

    pub fn is_gitlink(&self) -> bool {
        matches!(self, Self::Gitlink)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: FileMode,
    pub name: BString,
    pub oid: ObjectId,
}

impl TreeEntry {
    pub fn new(mode: FileMode, name: &str, oid: ObjectId) -> Self {
        Self {
            mode,
            name: BString::from(name),
            oid,
        }
    }

    /// Canonical tree order: directories compare as if their name ended in '/'.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        let key = |e: &TreeEntry| {
            let mut k = e.name.to_vec();
            if e.mode.is_tree() {
                k.push(b'/');
            }
            k
        };
        key(self).cmp(&key(other))
    }
}

/// A directory listing node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new(entries: Vec<TreeEntry>) -> Self {
        Self { entries }
    }

    /// Parse binary tree content: repeated `<octal-mode> <name>\0<raw-id>`.
    pub fn parse(content: &[u8], algo: HashAlgorithm) -> Result<Self, ObjectError> {
        let id_len = algo.digest_len();
        let mut entries = Vec::new();
        let mut pos = 0;

        while pos < content.len() {
            let bad = |offset: usize, reason: &str| ObjectError::InvalidTreeEntry {
                offset,
                reason: reason.to_string(),
            };
            let space = content[pos..]
                .find_byte(b' ')
                .ok_or_else(|| bad(pos, "missing space after mode"))?
                + pos;
            let mode =
                FileMode::from_bytes(&content[pos..space]).ok_or_else(|| bad(pos, "invalid mode"))?;
            let nul = content[space + 1..]
                .find_byte(0)
                .ok_or_else(|| bad(space + 1, "missing NUL after name"))?
                + space
                + 1;
            let id_end = nul + 1 + id_len;
            if id_end > content.len() {
                return Err(bad(nul + 1, "truncated object id"));
            }
            entries.push(TreeEntry {
                mode,
                name: BString::from(&content[space + 1..nul]),
                oid: ObjectId::from_bytes(&content[nul + 1..id_end], algo)?,
            });
            pos = id_end;
        }

        Ok(Self { entries })
    }

    /// Binary content with entries in canonical order.
    pub fn serialize_content(&self) -> Vec<u8> {
        let mut sorted: Vec<&TreeEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| a.canonical_cmp(b));

        let mut out = Vec::new();
        for entry in sorted {
            out.extend_from_slice(format!("{:o} ", entry.mode.raw()).as_bytes());
            out.extend_from_slice(&entry.name);
            out.push(0);
            out.extend_from_slice(entry.oid.as_bytes());
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
