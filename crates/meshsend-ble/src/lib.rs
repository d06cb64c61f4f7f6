//! Bluetooth Low Energy transport to MeshCore companion radios
//!
//! This crate implements the `MeshTransport` / `MeshSession` traits from
//! `meshsend-core` on top of btleplug, speaking the MeshCore companion
//! protocol over the Nordic UART service.
//!
//! ## Architecture
//!
//! - [`config`] - Timeouts and handshake settings
//! - [`error`] - Error types specific to the BLE transport
//! - [`protocol`] - UUIDs, command frames and response parsing
//! - [`discovery`] - Scanning for the radio by address or name
//! - [`connection`] - GATT connection and the [`FrameLink`] abstraction
//! - [`transport`] - Transport and companion session implementation
//!
//! ## Usage
//!
//! ```rust,no_run
//! use meshsend_ble::{BleTransport, BleTransportConfig};
//! use meshsend_core::{MeshSession, MeshTransport};
//! use std::time::Duration;
//!
//! # async fn example() -> meshsend_core::Result<()> {
//! let config = BleTransportConfig::new().with_scan_timeout(Duration::from_secs(15));
//! let transport = BleTransport::with_config(config);
//!
//! let mut session = transport.connect("MeshCore-1a2b").await?;
//! session.ensure_contacts().await?;
//! if let Some(contact) = session.contact_by_name("Base Camp") {
//!     session.send_message(&contact, "hello").await?;
//! }
//! session.disconnect().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod connection;
mod discovery;
mod error;
mod protocol;
mod transport;

// Public API exports
pub use config::BleTransportConfig;
pub use connection::{BleConnection, FrameLink};
pub use discovery::{matches_identifier, BleDiscovery};
pub use error::BleTransportError;
pub use protocol::{
    describe_error_code, Response, SelfInfo, MESHCORE_RX_CHARACTERISTIC_UUID,
    MESHCORE_SERVICE_UUID, MESHCORE_TX_CHARACTERISTIC_UUID,
};
pub use transport::{BleTransport, CompanionSession};
