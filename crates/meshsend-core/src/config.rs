//! Transfer configuration
//!
//! The size ceiling, chunk size and pacing delay are plain values passed into
//! the validator and the sender, so boundaries can be exercised directly.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{MeshSendError, Result};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Largest file accepted for transfer (1 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Number of base64 characters carried by each chunk message
pub const DEFAULT_CHUNK_SIZE: usize = 200;

/// Pause after every successfully sent chunk
pub const DEFAULT_SEND_DELAY: Duration = Duration::from_millis(500);

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

/// Configuration for a single image transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Maximum accepted file size in bytes (inclusive)
    pub max_file_size: u64,
    /// Base64 characters per chunk
    pub chunk_size: usize,
    /// Fixed delay after each successful send
    #[serde(rename = "send_delay_ms", with = "duration_ms")]
    pub send_delay: Duration,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            send_delay: DEFAULT_SEND_DELAY,
        }
    }
}

impl TransferConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum file size
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Set chunk size
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Set the delay between sends
    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = delay;
        self
    }

    /// Reject values the sender cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(MeshSendError::InvalidConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.max_file_size == 0 {
            return Err(MeshSendError::InvalidConfig(
                "max_file_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Serde Helpers
// ----------------------------------------------------------------------------

/// (De)serialize a [`Duration`] as whole milliseconds
pub mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TransferConfig::default();
        assert_eq!(config.max_file_size, 1_048_576);
        assert_eq!(config.chunk_size, 200);
        assert_eq!(config.send_delay, Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let config = TransferConfig::new().with_chunk_size(0);
        assert!(matches!(
            config.validate(),
            Err(MeshSendError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_max_size_rejected() {
        let config = TransferConfig::new().with_max_file_size(0);
        assert!(config.validate().is_err());
    }
}
