//! Sequential chunk sender
//!
//! Sends one chunk message at a time, waits for the radio's terminal result,
//! then pauses for a fixed delay. The first error ends the loop; nothing is
//! retried and already sent chunks are not recalled.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::chunking::{EncodedPayload, PayloadChunker};
use crate::config::TransferConfig;
use crate::contacts::Contact;
use crate::transport::{MeshSession, SendResult};
use crate::{MeshSendError, Result};

/// Summary of a completed transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReport {
    pub chunks_sent: usize,
    pub total_chunks: usize,
    pub payload_len: usize,
}

/// Sends an encoded payload as `IMG i/total:...` text messages
#[derive(Debug, Clone)]
pub struct ChunkedSender {
    chunk_size: usize,
    send_delay: Duration,
}

impl ChunkedSender {
    pub fn new(chunk_size: usize, send_delay: Duration) -> Self {
        Self {
            chunk_size,
            send_delay,
        }
    }

    pub fn from_config(config: &TransferConfig) -> Self {
        Self::new(config.chunk_size, config.send_delay)
    }

    /// Send every chunk of `payload` to `contact`, stopping at the first failure
    pub async fn send<S>(
        &self,
        session: &mut S,
        contact: &Contact,
        payload: &EncodedPayload,
    ) -> Result<TransferReport>
    where
        S: MeshSession + ?Sized,
    {
        let chunker = PayloadChunker::new(payload, self.chunk_size)?;
        let total = chunker.total();

        info!("Sending {} chunks", total);
        debug!("Destination {}, {} chars per chunk", contact, self.chunk_size);

        let mut chunks_sent = 0;
        for message in chunker.messages() {
            let text = message.to_string();

            let reason = match session.send_message(contact, &text).await {
                Ok(SendResult::Success(receipt)) => {
                    chunks_sent += 1;
                    debug!(
                        "Chunk {}/{} sent ({} chars, ack {:08x})",
                        message.index,
                        total,
                        message.fragment.len(),
                        receipt.expected_ack
                    );
                    tokio::time::sleep(self.send_delay).await;
                    continue;
                }
                Ok(SendResult::Error(payload)) => payload,
                Err(e) => e.to_string(),
            };

            warn!("Chunk {}/{} not delivered, stopping", message.index, total);
            return Err(MeshSendError::ChunkSend {
                index: message.index,
                total,
                reason,
            });
        }

        info!("Sent {}/{} chunks", chunks_sent, total);

        Ok(TransferReport {
            chunks_sent,
            total_chunks: total,
            payload_len: payload.len(),
        })
    }
}
