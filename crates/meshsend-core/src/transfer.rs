//! End-to-end transfer over a mesh transport
//!
//! connect -> sync contacts -> resolve contact -> send chunks, with the
//! session released by [`scoped`] on every path after a successful connect.

use std::future::Future;
use std::time::Duration;

use tracing::info;

use crate::chunking::EncodedPayload;
use crate::sender::{ChunkedSender, TransferReport};
use crate::session::scoped;
use crate::transport::{MeshSession, MeshTransport};
use crate::{MeshSendError, Result};

/// What to send and where, fixed for the process lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// BLE address or advertised name of the radio
    pub device: String,
    /// Display name of the destination contact
    pub contact: String,
    /// Base64 characters per chunk
    pub chunk_size: usize,
}

impl TransferRequest {
    pub fn new(device: impl Into<String>, contact: impl Into<String>, chunk_size: usize) -> Self {
        Self {
            device: device.into(),
            contact: contact.into(),
            chunk_size,
        }
    }
}

/// Deliver `payload` to the requested contact
///
/// A connection failure returns before any session exists. Every later
/// failure, and `interrupt` completing, still disconnects the session.
pub async fn run_transfer<T, I>(
    transport: &T,
    request: TransferRequest,
    payload: EncodedPayload,
    send_delay: Duration,
    interrupt: I,
) -> Result<TransferReport>
where
    T: MeshTransport,
    I: Future<Output = ()>,
{
    info!("Connecting to {}", request.device);
    let session = transport.connect(&request.device).await?;

    let sender = ChunkedSender::new(request.chunk_size, send_delay);
    let contact_name = request.contact;

    scoped(session, interrupt, move |session| {
        Box::pin(async move {
            session.ensure_contacts().await?;

            let contact = session
                .contact_by_name(&contact_name)
                .ok_or(MeshSendError::ContactNotFound { name: contact_name })?;

            sender.send(session, &contact, &payload).await
        })
    })
    .await
}
