//! Core of meshsend: sending a small image to a MeshCore contact as a series
//! of base64 text chunks
//!
//! ## Architecture
//!
//! - [`config`] - Size ceiling, chunk size and pacing delay
//! - [`errors`] - Error taxonomy for a transfer run
//! - [`chunking`] - Base64 encoding and fixed-size partitioning
//! - [`wire`] - The `IMG i/total:fragment` message format
//! - [`contacts`] - Contact records and the name lookup policy
//! - [`transport`] - Traits a mesh radio transport implements
//! - [`session`] - Scoped session ownership with guaranteed disconnect
//! - [`sender`] - Sequential, paced chunk sender
//! - [`validation`] - File size gate
//! - [`transfer`] - The connect / resolve / send flow
//!
//! ## Usage
//!
//! ```rust,no_run
//! use meshsend_core::{run_transfer, EncodedPayload, MeshTransport, TransferConfig, TransferRequest};
//!
//! # async fn example<T: MeshTransport>(transport: T) -> meshsend_core::Result<()> {
//! let config = TransferConfig::default();
//! let request = TransferRequest::new("MeshCore-1a2b", "Base Camp", config.chunk_size);
//! let payload = EncodedPayload::encode(&std::fs::read("photo.jpg")?);
//!
//! let report = run_transfer(
//!     &transport,
//!     request,
//!     payload,
//!     config.send_delay,
//!     futures::future::pending(),
//! )
//! .await?;
//! println!("Sent {} chunks", report.chunks_sent);
//! # Ok(())
//! # }
//! ```

pub mod chunking;
pub mod config;
pub mod contacts;
pub mod errors;
pub mod sender;
pub mod session;
pub mod transfer;
pub mod transport;
pub mod validation;
pub mod wire;

pub use chunking::{chunk_count, EncodedPayload, PayloadChunker};
pub use config::{
    TransferConfig, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_FILE_SIZE, DEFAULT_SEND_DELAY,
};
pub use contacts::{Contact, ContactBook, ContactKind, PUBKEY_PREFIX_LEN};
pub use errors::{MeshSendError, Result, WireError};
pub use sender::{ChunkedSender, TransferReport};
pub use session::scoped;
pub use transfer::{run_transfer, TransferRequest};
pub use transport::{MeshSession, MeshTransport, SendReceipt, SendResult};
pub use validation::{validate_file_size, SelectedFile};
pub use wire::{ChunkMessage, CHUNK_PREFIX};
