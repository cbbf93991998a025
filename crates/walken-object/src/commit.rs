use bstr::{BStr, BString, ByteSlice};
use walken_hash::ObjectId;

use crate::{ObjectError, Signature};

/// A commit node: a snapshot (root tree) plus links to its parents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub tree: ObjectId,
    /// Empty for a root commit.
    pub parents: Vec<ObjectId>,
    pub author: Signature,
    pub committer: Signature,
    /// Headers after `committer` (`encoding`, `gpgsig`, `mergetag`, ...), in
    /// order, with continuation lines joined by `\n`.
    pub extra_headers: Vec<(BString, BString)>,
    pub message: BString,
}

impl Commit {
    /// Parse commit content (no object header).
    pub fn parse(content: &[u8]) -> Result<Self, ObjectError> {
        let mut tree = None;
        let mut parents = Vec::new();
        let mut author = None;
        let mut committer = None;
        let mut extra_headers = Vec::new();

        let (headers, message) = split_headers(content);
        for (key, value) in headers {
            match key.as_slice() {
                b"tree" => tree = Some(parse_oid(&value, "tree")?),
                b"parent" => parents.push(parse_oid(&value, "parent")?),
                b"author" => author = Some(Signature::parse(value.as_bstr())?),
                b"committer" => committer = Some(Signature::parse(value.as_bstr())?),
                _ => extra_headers.push((key, value)),
            }
        }

        Ok(Self {
            tree: tree.ok_or(ObjectError::MissingCommitField { field: "tree" })?,
            parents,
            author: author.ok_or(ObjectError::MissingCommitField { field: "author" })?,
            committer: committer.ok_or(ObjectError::MissingCommitField { field: "committer" })?,
            extra_headers,
            message: BString::from(message),
        })
    }

    /// Every header field as `(name, value)` in canonical order.
    ///
    /// This is the header block metadata filters match against.
    pub fn header_fields(&self) -> Vec<(BString, BString)> {
        let mut fields = Vec::with_capacity(3 + self.parents.len() + self.extra_headers.len());
        fields.push((BString::from("tree"), BString::from(self.tree.to_hex())));
        for parent in &self.parents {
            fields.push((BString::from("parent"), BString::from(parent.to_hex())));
        }
        fields.push((BString::from("author"), self.author.to_bytes()));
        fields.push((BString::from("committer"), self.committer.to_bytes()));
        fields.extend(self.extra_headers.iter().cloned());
        fields
    }

    pub fn serialize_content(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (key, value) in self.header_fields() {
            out.extend_from_slice(&key);
            out.push(b' ');
            // Multi-line values continue on lines starting with a space.
            out.extend_from_slice(&value.replace(b"\n", b"\n "));
            out.push(b'\n');
        }
        out.push(b'\n');
        out.extend_from_slice(&self.message);
        out
    }

    /// First line of the message.
    pub fn summary(&self) -> &BStr {
        let msg = self.message.as_bstr();
        match msg.find_byte(b'\n') {
            Some(pos) => msg[..pos].as_bstr(),
            None => msg,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

/// Split content into header fields and the message that follows the blank
/// separator line. Shared with tag parsing.
pub(crate) fn split_headers(data: &[u8]) -> (Vec<(BString, BString)>, &[u8]) {
    let mut fields: Vec<(BString, BString)> = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        if data[pos] == b'\n' {
            return (fields, &data[pos + 1..]);
        }
        let end = data[pos..]
            .find_byte(b'\n')
            .map(|p| p + pos)
            .unwrap_or(data.len());
        let line = &data[pos..end];
        pos = end + 1;

        if line.first() == Some(&b' ') {
            if let Some((_, value)) = fields.last_mut() {
                value.push(b'\n');
                value.extend_from_slice(&line[1..]);
            }
            continue;
        }
        match line.find_byte(b' ') {
            Some(sp) => fields.push((BString::from(&line[..sp]), BString::from(&line[sp + 1..]))),
            None => fields.push((BString::from(line), BString::default())),
        }
    }

    (fields, &data[data.len()..])
}

fn parse_oid(value: &[u8], field: &'static str) -> Result<ObjectId, ObjectError> {
    let hex = value
        .to_str()
        .map_err(|_| ObjectError::InvalidHeader(format!("non-UTF8 {field} id")))?;
    Ok(ObjectId::from_hex(hex)?)
}
