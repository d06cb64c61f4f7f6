//! Base64 payload encoding and fixed-size chunking
//!
//! The file bytes are encoded once with the standard padded base64 alphabet.
//! The resulting text is split into `ceil(len / chunk_size)` ordered,
//! non-overlapping fragments; every fragment except the last is exactly
//! `chunk_size` characters long.

use base64::Engine as _;

use crate::wire::ChunkMessage;
use crate::{MeshSendError, Result};

// ----------------------------------------------------------------------------
// Encoded Payload
// ----------------------------------------------------------------------------

/// Base64 text of a file's contents
///
/// Always ASCII, so any byte offset is a valid `str` boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload(String);

impl EncodedPayload {
    /// Encode raw file bytes
    pub fn encode(data: &[u8]) -> Self {
        Self(base64::engine::general_purpose::STANDARD.encode(data))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Number of chunks needed for `payload_len` characters
pub fn chunk_count(payload_len: usize, chunk_size: usize) -> usize {
    payload_len.div_ceil(chunk_size)
}

// ----------------------------------------------------------------------------
// Chunker
// ----------------------------------------------------------------------------

/// Splits an [`EncodedPayload`] into labelled chunk messages
#[derive(Debug, Clone)]
pub struct PayloadChunker<'a> {
    payload: &'a EncodedPayload,
    chunk_size: usize,
    total: usize,
}

impl<'a> PayloadChunker<'a> {
    /// Create a chunker; `chunk_size` must be positive
    pub fn new(payload: &'a EncodedPayload, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(MeshSendError::InvalidConfig(
                "chunk size must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            payload,
            chunk_size,
            total: chunk_count(payload.len(), chunk_size),
        })
    }

    /// Total number of chunks
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Fragment for 1-based `index`, or `None` when out of range
    pub fn fragment(&self, index: usize) -> Option<&'a str> {
        if index == 0 || index > self.total {
            return None;
        }
        let start = (index - 1) * self.chunk_size;
        let end = (start + self.chunk_size).min(self.payload.len());
        Some(&self.payload.as_str()[start..end])
    }

    /// Chunk messages in send order
    pub fn messages(&self) -> impl Iterator<Item = ChunkMessage<'a>> + '_ {
        (1..=self.total).filter_map(move |index| {
            self.fragment(index)
                .map(|fragment| ChunkMessage::new(index, self.total, fragment))
        })
    }
}
