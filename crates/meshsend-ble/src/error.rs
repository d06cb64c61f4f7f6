//! Error types for the BLE transport

use meshsend_core::MeshSendError;
use thiserror::Error;

// ----------------------------------------------------------------------------
// Error Types
// ----------------------------------------------------------------------------

/// Errors specific to the BLE transport
#[derive(Error, Debug)]
pub enum BleTransportError {
    #[error("BLE error: {0}")]
    Btleplug(#[from] btleplug::Error),

    #[error("BLE adapter not available")]
    AdapterNotAvailable,

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to connect to device: {0}")]
    ConnectionFailed(String),

    #[error("Connection timeout")]
    ConnectionTimeout,

    #[error("Timed out disconnecting from device")]
    DisconnectTimeout,

    #[error("Characteristic not found: {characteristic}")]
    CharacteristicNotFound { characteristic: String },

    #[error("Failed to write to characteristic: {0}")]
    WriteFailed(String),

    #[error("Timed out waiting for {0}")]
    ResponseTimeout(&'static str),

    #[error("Radio returned an error: {0}")]
    DeviceError(String),

    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    #[error("Receive channel closed")]
    ReceiveChannelClosed,
}

impl From<BleTransportError> for MeshSendError {
    fn from(err: BleTransportError) -> Self {
        MeshSendError::Transport(err.to_string())
    }
}
