//! meshsend application flow
//!
//! [`MeshSendApp::select`] is the synchronous pre-step: pick a file and check
//! its size. [`MeshSendApp::send`] is the async phase that talks to the radio.
//! [`MeshSendApp::run`] chains the two, entering the runtime only once a file
//! has been accepted.

use std::future::Future;

use tokio::runtime::Runtime;
use tracing::{info, warn};

use meshsend_core::{
    run_transfer, validate_file_size, EncodedPayload, MeshSendError, MeshTransport,
    SelectedFile, TransferReport, TransferRequest,
};

use crate::config::AppConfig;
use crate::dialogs::FilePicker;
use crate::error::Result;

/// Alert title shown for an oversized file
pub const TOO_LARGE_TITLE: &str = "File Too Large";

/// Alert text shown for an oversized file
pub const TOO_LARGE_MESSAGE: &str = "Selected image exceeds the 1MB size limit";

/// One send invocation: a device, a contact and the effective configuration
#[derive(Debug, Clone)]
pub struct MeshSendApp {
    device: String,
    contact: String,
    config: AppConfig,
}

impl MeshSendApp {
    pub fn new(device: impl Into<String>, contact: impl Into<String>, config: AppConfig) -> Self {
        Self {
            device: device.into(),
            contact: contact.into(),
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Ask for a file and check it against the size limit
    ///
    /// `Ok(None)` means the user cancelled. An oversized file is reported
    /// through the picker's alert before the error is returned.
    pub fn select(&self, picker: &dyn FilePicker) -> Result<Option<SelectedFile>> {
        let Some(path) = picker.pick_file() else {
            return Ok(None);
        };

        match validate_file_size(&path, self.config.transfer.max_file_size) {
            Ok(selected) => {
                info!("Selected {} ({} bytes)", selected.path.display(), selected.len);
                Ok(Some(selected))
            }
            Err(e @ MeshSendError::FileTooLarge { .. }) => {
                picker.show_error(TOO_LARGE_TITLE, TOO_LARGE_MESSAGE);
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Connect through `transport` and deliver `payload`
    pub async fn send<T, I>(
        &self,
        transport: &T,
        payload: EncodedPayload,
        interrupt: I,
    ) -> Result<TransferReport>
    where
        T: MeshTransport,
        I: Future<Output = ()>,
    {
        let request = TransferRequest::new(
            self.device.clone(),
            self.contact.clone(),
            self.config.transfer.chunk_size,
        );

        let report = run_transfer(
            transport,
            request,
            payload,
            self.config.transfer.send_delay,
            interrupt,
        )
        .await?;

        Ok(report)
    }

    /// Pick, validate and read a file, then send it on `runtime`
    ///
    /// Returns `Ok(None)` when the user cancels. Nothing touches `transport`
    /// unless a file within the size limit was read.
    pub fn run<T, I>(
        &self,
        picker: &dyn FilePicker,
        runtime: &Runtime,
        transport: &T,
        interrupt: I,
    ) -> Result<Option<TransferReport>>
    where
        T: MeshTransport,
        I: Future<Output = ()>,
    {
        let Some(selected) = self.select(picker)? else {
            return Ok(None);
        };
        let payload = selected.read_payload()?;

        let report = runtime.block_on(self.send(transport, payload, interrupt))?;
        Ok(Some(report))
    }
}

/// Resolves on the first Ctrl-C
///
/// If the signal handler cannot be installed this never resolves, so the
/// transfer runs without interrupt support instead of aborting at once.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
