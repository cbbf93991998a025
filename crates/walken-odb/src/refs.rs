//! Reference names: `HEAD`, DWIM expansion, and the on-disk ref formats.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use bstr::ByteSlice;
use walken_hash::{hex, ObjectId};

use crate::StoreError;

/// Symbolic refs are followed at most this many times.
const MAX_SYMREF_DEPTH: usize = 5;

/// What `HEAD` points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// `ref: refs/heads/<branch>`; the branch may not exist yet.
    Symbolic(String),
    Detached(ObjectId),
}

/// Full ref names tried for a short name, in priority order.
pub fn dwim_candidates(name: &str) -> Vec<String> {
    if name.starts_with("refs/") {
        return vec![name.to_string()];
    }
    vec![
        name.to_string(),
        format!("refs/{name}"),
        format!("refs/tags/{name}"),
        format!("refs/heads/{name}"),
        format!("refs/remotes/{name}"),
        format!("refs/remotes/{name}/HEAD"),
    ]
}

/// Parse the content of `HEAD` or a loose ref file.
pub fn parse_ref_content(name: &str, content: &[u8]) -> Result<Head, StoreError> {
    let line = content.trim();
    if let Some(target) = line.strip_prefix(b"ref:") {
        let target = target
            .trim()
            .to_str()
            .map_err(|_| invalid(name, "non-UTF8 symbolic target"))?;
        return Ok(Head::Symbolic(target.to_string()));
    }
    let hex = line.to_str().map_err(|_| invalid(name, "non-UTF8 object id"))?;
    ObjectId::from_hex(hex)
        .map(Head::Detached)
        .map_err(|e| invalid(name, &e.to_string()))
}

/// Parse a `packed-refs` file into `name -> id`. Peel lines are skipped.
pub fn parse_packed_refs(content: &[u8]) -> Result<BTreeMap<String, ObjectId>, StoreError> {
    let mut refs = BTreeMap::new();
    for line in content.lines() {
        if line.is_empty() || line.starts_with(b"#") || line.starts_with(b"^") {
            continue;
        }
        let (hex, name) = line
            .split_once_str(" ")
            .ok_or_else(|| invalid("packed-refs", "line without a space"))?;
        let hex = hex.to_str().map_err(|_| invalid("packed-refs", "non-UTF8 id"))?;
        let name = name
            .to_str()
            .map_err(|_| invalid("packed-refs", "non-UTF8 name"))?;
        let oid = ObjectId::from_hex(hex).map_err(|e| invalid(name, &e.to_string()))?;
        refs.insert(name.to_string(), oid);
    }
    Ok(refs)
}

/// Resolve `name` inside a files-backend ref store rooted at `git_dir`.
///
/// Accepts full hex ids, `HEAD`, full ref names and short names expanded by
/// [`dwim_candidates`].
pub fn resolve_in_git_dir(git_dir: &Path, name: &str) -> Result<Option<ObjectId>, StoreError> {
    if name.len() >= 40 && hex::is_hex(name) {
        return ObjectId::from_hex(name)
            .map(Some)
            .map_err(|e| invalid(name, &e.to_string()));
    }

    let packed = match fs::read(git_dir.join("packed-refs")) {
        Ok(data) => parse_packed_refs(&data)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
        Err(e) => return Err(e.into()),
    };

    let candidates = if name == "HEAD" {
        vec![name.to_string()]
    } else {
        dwim_candidates(name)
    };
    for candidate in candidates {
        if let Some(oid) = follow(git_dir, &packed, &candidate, 0)? {
            tracing::trace!(name, full_name = %candidate, %oid, "resolved ref");
            return Ok(Some(oid));
        }
    }
    Ok(None)
}

fn follow(
    git_dir: &Path,
    packed: &BTreeMap<String, ObjectId>,
    full_name: &str,
    depth: usize,
) -> Result<Option<ObjectId>, StoreError> {
    if depth > MAX_SYMREF_DEPTH {
        return Err(invalid(full_name, "symbolic ref chain too deep"));
    }
    // A directory such as refs/heads/ is never a ref itself.
    let path = git_dir.join(full_name);
    if path.is_file() {
        return match parse_ref_content(full_name, &fs::read(&path)?)? {
            Head::Detached(oid) => Ok(Some(oid)),
            Head::Symbolic(target) => follow(git_dir, packed, &target, depth + 1),
        };
    }
    Ok(packed.get(full_name).copied())
}

fn invalid(name: &str, reason: &str) -> StoreError {
    StoreError::InvalidRef {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
