use bstr::{BStr, BString, ByteSlice};

use crate::ObjectError;

/// An identity line: `Name <email> <unix-seconds> <+hhmm>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: BString,
    pub email: BString,
    /// Seconds since the epoch.
    pub time: i64,
    /// Timezone offset in minutes east of UTC.
    pub offset: i32,
}

impl Signature {
    pub fn new(name: &str, email: &str, time: i64, offset: i32) -> Self {
        Self {
            name: BString::from(name),
            email: BString::from(email),
            time,
            offset,
        }
    }

    pub fn parse(input: &BStr) -> Result<Self, ObjectError> {
        let bytes = input.as_bytes();
        let gt = bytes
            .rfind_byte(b'>')
            .ok_or_else(|| ObjectError::InvalidSignature("missing '>'".into()))?;
        let lt = bytes[..gt]
            .rfind_byte(b'<')
            .ok_or_else(|| ObjectError::InvalidSignature("missing '<'".into()))?;

        let name = BString::from(bytes[..lt].trim());
        let email = BString::from(&bytes[lt + 1..gt]);

        let rest = bytes[gt + 1..].trim().to_str().map_err(|_| {
            ObjectError::InvalidSignature("non-ASCII date".into())
        })?;
        let mut parts = rest.split_ascii_whitespace();
        let time = parts
            .next()
            .and_then(|t| t.parse::<i64>().ok())
            .ok_or_else(|| ObjectError::InvalidSignature(format!("bad timestamp in '{rest}'")))?;
        let offset = match parts.next() {
            Some(tz) => parse_tz(tz)
                .ok_or_else(|| ObjectError::InvalidSignature(format!("bad timezone '{tz}'")))?,
            None => 0,
        };

        Ok(Self {
            name,
            email,
            time,
            offset,
        })
    }

    pub fn to_bytes(&self) -> BString {
        let mut out = BString::from(Vec::with_capacity(self.name.len() + self.email.len() + 24));
        out.extend_from_slice(&self.name);
        out.extend_from_slice(b" <");
        out.extend_from_slice(&self.email);
        out.extend_from_slice(b"> ");
        let sign = if self.offset < 0 { '-' } else { '+' };
        let abs = self.offset.unsigned_abs();
        out.extend_from_slice(
            format!("{} {}{:02}{:02}", self.time, sign, abs / 60, abs % 60).as_bytes(),
        );
        out
    }
}

fn parse_tz(tz: &str) -> Option<i32> {
    let (sign, digits) = match tz.as_bytes().first()? {
        b'+' => (1, &tz[1..]),
        b'-' => (-1, &tz[1..]),
        _ => return None,
    };
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    Some(sign * (hours * 60 + minutes))
}
