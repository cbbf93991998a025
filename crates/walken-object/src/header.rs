//! The `"<type> <size>\0"` prefix of stored objects.

use crate::{ObjectError, ObjectType};

/// Parse an object header. Returns `(type, content_size, header_len)`, where
/// `header_len` includes the NUL terminator.
pub fn parse_header(data: &[u8]) -> Result<(ObjectType, usize, usize), ObjectError> {
    let nul = data
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| ObjectError::InvalidHeader("missing NUL terminator".into()))?;
    let header = &data[..nul];
    let space = header
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| ObjectError::InvalidHeader("missing space".into()))?;

    let obj_type = ObjectType::from_bytes(&header[..space])?;
    let size = std::str::from_utf8(&header[space + 1..])
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| {
            ObjectError::InvalidHeader(format!(
                "invalid size: {}",
                String::from_utf8_lossy(&header[space + 1..])
            ))
        })?;

    Ok((obj_type, size, nul + 1))
}

/// Render an object header.
pub fn write_header(obj_type: ObjectType, content_size: usize) -> Vec<u8> {
    format!("{obj_type} {content_size}\0").into_bytes()
}
