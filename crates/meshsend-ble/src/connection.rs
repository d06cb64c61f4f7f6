//! BLE connection management and frame transmission

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{Characteristic, Peripheral as _, WriteType};
use btleplug::platform::Peripheral;
use futures::stream::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info};

use crate::config::BleTransportConfig;
use crate::error::BleTransportError;
use crate::protocol::{MESHCORE_RX_CHARACTERISTIC_UUID, MESHCORE_TX_CHARACTERISTIC_UUID};

// ----------------------------------------------------------------------------
// Frame Link
// ----------------------------------------------------------------------------

/// A bidirectional channel carrying whole companion protocol frames
#[async_trait]
pub trait FrameLink: Send {
    /// Send one frame to the radio
    async fn write_frame(&mut self, frame: &[u8]) -> Result<(), BleTransportError>;

    /// Wait for the next frame from the radio
    async fn next_frame(&mut self) -> Result<Vec<u8>, BleTransportError>;

    /// Release the underlying connection
    async fn close(&mut self) -> Result<(), BleTransportError>;
}

// ----------------------------------------------------------------------------
// Connection Management
// ----------------------------------------------------------------------------

/// GATT connection to a companion radio over the Nordic UART service
pub struct BleConnection {
    peripheral: Peripheral,
    tx_char: Characteristic,
    frame_rx: mpsc::UnboundedReceiver<Vec<u8>>,
    notification_task: JoinHandle<()>,
    disconnect_timeout: Duration,
}

impl BleConnection {
    /// Connect, discover the UART characteristics and subscribe to notifications
    pub async fn open(
        peripheral: Peripheral,
        config: &BleTransportConfig,
    ) -> Result<Self, BleTransportError> {
        match timeout(config.connection_timeout, peripheral.connect()).await {
            Ok(Ok(())) => info!("Connected to device"),
            Ok(Err(e)) => {
                error!("Failed to connect: {}", e);
                return Err(BleTransportError::ConnectionFailed(e.to_string()));
            }
            Err(_) => {
                error!("Connection timed out");
                return Err(BleTransportError::ConnectionTimeout);
            }
        }

        match Self::setup(&peripheral).await {
            Ok((tx_char, frame_rx, notification_task)) => Ok(Self {
                peripheral,
                tx_char,
                frame_rx,
                notification_task,
                disconnect_timeout: config.connection_timeout,
            }),
            Err(e) => {
                let disconnect = within(config.connection_timeout, peripheral.disconnect());
                if let Err(disconnect_err) = disconnect.await {
                    error!("Failed to disconnect after setup error: {}", disconnect_err);
                }
                Err(e)
            }
        }
    }

    async fn setup(
        peripheral: &Peripheral,
    ) -> Result<
        (
            Characteristic,
            mpsc::UnboundedReceiver<Vec<u8>>,
            JoinHandle<()>,
        ),
        BleTransportError,
    > {
        peripheral.discover_services().await?;

        let characteristics = peripheral.characteristics();
        let tx_char = characteristics
            .iter()
            .find(|c| c.uuid == MESHCORE_TX_CHARACTERISTIC_UUID)
            .cloned()
            .ok_or_else(|| BleTransportError::CharacteristicNotFound {
                characteristic: "UART TX".into(),
            })?;
        let rx_char = characteristics
            .iter()
            .find(|c| c.uuid == MESHCORE_RX_CHARACTERISTIC_UUID)
            .cloned()
            .ok_or_else(|| BleTransportError::CharacteristicNotFound {
                characteristic: "UART RX".into(),
            })?;

        peripheral.subscribe(&rx_char).await?;
        let mut notifications = peripheral.notifications().await?;

        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let notification_task = tokio::spawn(async move {
            while let Some(data) = notifications.next().await {
                if data.uuid != MESHCORE_RX_CHARACTERISTIC_UUID {
                    continue;
                }
                if frame_tx.send(data.value).is_err() {
                    break;
                }
            }
            debug!("Notification handler ended");
        });

        Ok((tx_char, frame_rx, notification_task))
    }
}

#[async_trait]
impl FrameLink for BleConnection {
    async fn write_frame(&mut self, frame: &[u8]) -> Result<(), BleTransportError> {
        self.peripheral
            .write(&self.tx_char, frame, WriteType::WithoutResponse)
            .await
            .map_err(|e| BleTransportError::WriteFailed(e.to_string()))?;
        debug!("Wrote {} byte frame (code {:?})", frame.len(), frame.first());
        Ok(())
    }

    async fn next_frame(&mut self) -> Result<Vec<u8>, BleTransportError> {
        self.frame_rx
            .recv()
            .await
            .ok_or(BleTransportError::ReceiveChannelClosed)
    }

    async fn close(&mut self) -> Result<(), BleTransportError> {
        self.notification_task.abort();

        let peripheral = &self.peripheral;
        within(self.disconnect_timeout, async {
            if peripheral.is_connected().await? {
                peripheral.disconnect().await?;
            }
            Ok(())
        })
        .await?;

        info!("Disconnected from device");
        Ok(())
    }
}

/// Bound a disconnect so a stalled BLE stack cannot hold the process
async fn within<F>(limit: Duration, op: F) -> Result<(), BleTransportError>
where
    F: Future<Output = Result<(), btleplug::Error>>,
{
    timeout(limit, op)
        .await
        .map_err(|_| BleTransportError::DisconnectTimeout)?
        .map_err(BleTransportError::from)
}
