use bstr::{BString, ByteSlice};
use walken_hash::ObjectId;

use crate::commit::split_headers;
use crate::{ObjectError, ObjectType, Signature};

/// An annotated tag: a named pointer at exactly one target object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub target: ObjectId,
    pub target_type: ObjectType,
    pub name: BString,
    /// Absent on some very old tags.
    pub tagger: Option<Signature>,
    pub message: BString,
}

impl Tag {
    pub fn parse(content: &[u8]) -> Result<Self, ObjectError> {
        let mut target = None;
        let mut target_type = None;
        let mut name = None;
        let mut tagger = None;

        let (headers, message) = split_headers(content);
        for (key, value) in headers {
            match key.as_slice() {
                b"object" => {
                    let hex = value
                        .to_str()
                        .map_err(|_| ObjectError::InvalidHeader("non-UTF8 target id".into()))?;
                    target = Some(ObjectId::from_hex(hex)?);
                }
                b"type" => target_type = Some(ObjectType::from_bytes(&value)?),
                b"tag" => name = Some(value),
                b"tagger" => tagger = Some(Signature::parse(value.as_bstr())?),
                _ => {}
            }
        }

        Ok(Self {
            target: target.ok_or(ObjectError::MissingTagField { field: "object" })?,
            target_type: target_type.ok_or(ObjectError::MissingTagField { field: "type" })?,
            name: name.ok_or(ObjectError::MissingTagField { field: "tag" })?,
            tagger,
            message: BString::from(message),
        })
    }

    pub fn serialize_content(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(format!("object {}\n", self.target).as_bytes());
        out.extend_from_slice(format!("type {}\n", self.target_type).as_bytes());
        out.extend_from_slice(b"tag ");
        out.extend_from_slice(&self.name);
        out.push(b'\n');
        if let Some(tagger) = &self.tagger {
            out.extend_from_slice(b"tagger ");
            out.extend_from_slice(&tagger.to_bytes());
            out.push(b'\n');
        }
        out.push(b'\n');
        out.extend_from_slice(&self.message);
        out
    }
}
