//! Mesh radio transport abstraction
//!
//! The transfer flow only consumes these traits; the BLE companion-radio
//! implementation lives in `meshsend-ble` and tests plug in mocks.

use async_trait::async_trait;

use crate::contacts::Contact;
use crate::Result;

// ----------------------------------------------------------------------------
// Send Result
// ----------------------------------------------------------------------------

/// Terminal outcome the radio reports for one text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendResult {
    /// Message accepted for delivery
    Success(SendReceipt),
    /// Message rejected; the payload describes why
    Error(String),
}

impl SendResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SendResult::Success(_))
    }
}

/// Details returned with an accepted message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendReceipt {
    /// Ack code the recipient is expected to return
    pub expected_ack: u32,
    /// Radio's estimate of delivery time in milliseconds
    pub suggested_timeout_ms: u32,
    /// Whether the message was sent by flooding rather than a known path
    pub flood: bool,
}

// ----------------------------------------------------------------------------
// Transport Traits
// ----------------------------------------------------------------------------

/// Opens sessions to a mesh radio
#[async_trait]
pub trait MeshTransport: Send + Sync {
    type Session: MeshSession;

    /// Connect to the radio identified by address or advertised name
    ///
    /// Fails with [`MeshSendError::Connection`](crate::MeshSendError::Connection)
    /// when the device cannot be reached.
    async fn connect(&self, device: &str) -> Result<Self::Session>;
}

/// An open connection to a mesh radio
#[async_trait]
pub trait MeshSession: Send {
    /// Synchronize the radio's contact list; must precede any lookup
    async fn ensure_contacts(&mut self) -> Result<()>;

    /// Look up a synchronized contact by display name
    fn contact_by_name(&self, name: &str) -> Option<Contact>;

    /// Send one text message and wait for its terminal result
    async fn send_message(&mut self, contact: &Contact, text: &str) -> Result<SendResult>;

    /// Close the connection
    async fn disconnect(&mut self) -> Result<()>;
}
