//! Chunk message text format
//!
//! Each chunk travels as one text message of the form
//! `IMG {index}/{total}:{fragment}` where `1 <= index <= total`. There is no
//! terminator, checksum or escaping; ordering is implied by send order only.

use core::fmt;

use crate::errors::WireError;

/// Prefix that marks an image chunk message
pub const CHUNK_PREFIX: &str = "IMG ";

/// One labelled chunk of an encoded payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkMessage<'a> {
    /// 1-based position in the payload
    pub index: usize,
    /// Total number of chunks in the payload
    pub total: usize,
    /// Base64 fragment
    pub fragment: &'a str,
}

impl<'a> ChunkMessage<'a> {
    pub fn new(index: usize, total: usize, fragment: &'a str) -> Self {
        Self {
            index,
            total,
            fragment,
        }
    }

    pub fn is_last(&self) -> bool {
        self.index == self.total
    }

    /// Parse a received message text back into its parts
    pub fn parse(text: &'a str) -> Result<Self, WireError> {
        let rest = text
            .strip_prefix(CHUNK_PREFIX)
            .ok_or(WireError::MissingPrefix)?;

        let (header, fragment) = rest
            .split_once(':')
            .ok_or_else(|| WireError::MalformedHeader("missing ':' separator".into()))?;

        let (index, total) = header
            .split_once('/')
            .ok_or_else(|| WireError::MalformedHeader(format!("'{}' has no '/'", header)))?;

        let index = parse_count(index)?;
        let total = parse_count(total)?;

        if index == 0 || index > total {
            return Err(WireError::IndexOutOfRange { index, total });
        }

        Ok(Self::new(index, total, fragment))
    }
}

impl fmt::Display for ChunkMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}/{}:{}",
            CHUNK_PREFIX, self.index, self.total, self.fragment
        )
    }
}

fn parse_count(digits: &str) -> Result<usize, WireError> {
    // Decimal digits only; `usize::from_str` would also accept a leading '+'
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WireError::MalformedHeader(format!(
            "'{}' is not a decimal number",
            digits
        )));
    }
    digits
        .parse()
        .map_err(|_| WireError::MalformedHeader(format!("'{}' is out of range", digits)))
}
