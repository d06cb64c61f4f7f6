//! BLE device discovery
//!
//! The radio is identified either by its Bluetooth address (compared
//! case-insensitively) or by its exact advertised local name.

use btleplug::api::{Central, CentralEvent, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::stream::StreamExt;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info};

use crate::config::BleTransportConfig;
use crate::error::BleTransportError;

// ----------------------------------------------------------------------------
// Discovery Implementation
// ----------------------------------------------------------------------------

/// Scans for a single MeshCore radio
pub struct BleDiscovery {
    config: BleTransportConfig,
}

impl BleDiscovery {
    pub fn new(config: BleTransportConfig) -> Self {
        Self { config }
    }

    /// Scan until a peripheral matches `identifier` or the scan timeout expires
    pub async fn find_device(&self, identifier: &str) -> Result<Peripheral, BleTransportError> {
        let adapter = default_adapter().await?;
        let mut events = adapter.events().await?;

        adapter.start_scan(ScanFilter::default()).await?;
        info!(
            "Scanning for {} ({}s timeout)",
            identifier,
            self.config.scan_timeout.as_secs()
        );

        let result = self.wait_for_match(&adapter, &mut events, identifier).await;

        if let Err(e) = adapter.stop_scan().await {
            debug!("Failed to stop BLE scan: {}", e);
        }

        result
    }

    async fn wait_for_match<S>(
        &self,
        adapter: &Adapter,
        events: &mut S,
        identifier: &str,
    ) -> Result<Peripheral, BleTransportError>
    where
        S: futures::Stream<Item = CentralEvent> + Unpin,
    {
        // The platform may already know the device from an earlier scan
        for peripheral in adapter.peripherals().await? {
            if is_match(&peripheral, identifier).await? {
                return Ok(peripheral);
            }
        }

        let deadline = Instant::now() + self.config.scan_timeout;

        while let Ok(Some(event)) = timeout_at(deadline, events.next()).await {
            let id = match event {
                CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) => id,
                _ => continue,
            };

            let peripheral = adapter.peripheral(&id).await?;
            if is_match(&peripheral, identifier).await? {
                return Ok(peripheral);
            }
        }

        Err(BleTransportError::DeviceNotFound(format!(
            "no device with address or name '{}' found",
            identifier
        )))
    }
}

async fn default_adapter() -> Result<Adapter, BleTransportError> {
    let manager = Manager::new().await?;
    manager
        .adapters()
        .await?
        .into_iter()
        .next()
        .ok_or(BleTransportError::AdapterNotAvailable)
}

async fn is_match(peripheral: &Peripheral, identifier: &str) -> Result<bool, BleTransportError> {
    let Some(properties) = peripheral.properties().await? else {
        return Ok(false);
    };

    let address = properties.address.to_string();
    let matched = matches_identifier(identifier, &address, properties.local_name.as_deref());
    if matched {
        info!(
            "Found device {} ({})",
            properties.local_name.as_deref().unwrap_or("unnamed"),
            address
        );
    } else {
        debug!("Skipping device {} ({:?})", address, properties.local_name);
    }
    Ok(matched)
}

/// Whether a peripheral's address or name selects it
pub fn matches_identifier(identifier: &str, address: &str, local_name: Option<&str>) -> bool {
    address.eq_ignore_ascii_case(identifier) || local_name == Some(identifier)
}
