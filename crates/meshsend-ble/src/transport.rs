//! MeshCore companion radio transport
//!
//! [`BleTransport`] finds and connects to the radio, performs the companion
//! handshake and hands back a [`CompanionSession`] that speaks the request /
//! response protocol over any [`FrameLink`].

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use meshsend_core::{
    Contact, ContactBook, MeshSendError, MeshSession, MeshTransport, Result as MeshResult,
    SendResult,
};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::BleTransportConfig;
use crate::connection::{BleConnection, FrameLink};
use crate::discovery::BleDiscovery;
use crate::error::BleTransportError;
use crate::protocol::{
    app_start_frame, describe_error_code, get_contacts_frame, send_text_frame, Response, SelfInfo,
};

// ----------------------------------------------------------------------------
// BLE Transport
// ----------------------------------------------------------------------------

/// Opens companion sessions to MeshCore radios over BLE
#[derive(Debug, Clone, Default)]
pub struct BleTransport {
    config: BleTransportConfig,
}

impl BleTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BleTransportConfig) -> Self {
        Self { config }
    }

    async fn open(
        &self,
        device: &str,
    ) -> Result<CompanionSession<BleConnection>, BleTransportError> {
        let peripheral = BleDiscovery::new(self.config.clone())
            .find_device(device)
            .await?;
        let connection = BleConnection::open(peripheral, &self.config).await?;

        let mut session = CompanionSession::new(connection, self.config.response_timeout);
        if let Err(e) = session.start(&self.config.app_name).await {
            if let Err(close_err) = session.link.close().await {
                warn!("Failed to close link after handshake error: {}", close_err);
            }
            return Err(e);
        }

        Ok(session)
    }
}

#[async_trait]
impl MeshTransport for BleTransport {
    type Session = CompanionSession<BleConnection>;

    async fn connect(&self, device: &str) -> MeshResult<Self::Session> {
        self.open(device)
            .await
            .map_err(|e| MeshSendError::Connection {
                device: device.to_string(),
                reason: e.to_string(),
            })
    }
}

// ----------------------------------------------------------------------------
// Companion Session
// ----------------------------------------------------------------------------

/// Request / response session with a companion radio
pub struct CompanionSession<L> {
    link: L,
    response_timeout: Duration,
    self_info: Option<SelfInfo>,
    contacts: Option<ContactBook>,
}

impl<L: FrameLink> CompanionSession<L> {
    pub fn new(link: L, response_timeout: Duration) -> Self {
        Self {
            link,
            response_timeout,
            self_info: None,
            contacts: None,
        }
    }

    /// Identity reported by the radio during the handshake
    pub fn self_info(&self) -> Option<&SelfInfo> {
        self.self_info.as_ref()
    }

    /// Announce this application and wait for the radio's identity
    pub async fn start(&mut self, app_name: &str) -> Result<&SelfInfo, BleTransportError> {
        self.link.write_frame(&app_start_frame(app_name)).await?;

        loop {
            match self.next_response("device info").await? {
                Response::SelfInfo(info) => {
                    info!(
                        "Companion radio '{}' ({}) ready",
                        info.name,
                        hex::encode(&info.public_key[..6])
                    );
                    return Ok(self.self_info.insert(info));
                }
                Response::Error(code) => {
                    return Err(BleTransportError::DeviceError(describe_error_code(code)))
                }
                other => debug!("Ignoring {:?} during handshake", other),
            }
        }
    }

    /// Fetch the radio's full contact table
    pub async fn load_contacts(&mut self) -> Result<ContactBook, BleTransportError> {
        self.link.write_frame(&get_contacts_frame()).await?;

        let mut contacts = Vec::new();
        loop {
            match self.next_response("contacts").await? {
                Response::ContactsStart { count } => {
                    debug!("Radio reports {} contacts", count);
                    contacts.reserve(count as usize);
                }
                Response::Contact(contact) => contacts.push(contact),
                Response::EndOfContacts { last_modified } => {
                    return Ok(ContactBook::new(contacts, last_modified));
                }
                Response::Error(code) => {
                    return Err(BleTransportError::DeviceError(describe_error_code(code)))
                }
                other => debug!("Ignoring {:?} while loading contacts", other),
            }
        }
    }

    async fn next_response(
        &mut self,
        waiting_for: &'static str,
    ) -> Result<Response, BleTransportError> {
        let frame = timeout(self.response_timeout, self.link.next_frame())
            .await
            .map_err(|_| BleTransportError::ResponseTimeout(waiting_for))??;
        Response::parse(&frame)
    }
}

#[async_trait]
impl<L: FrameLink> MeshSession for CompanionSession<L> {
    async fn ensure_contacts(&mut self) -> MeshResult<()> {
        let book = self.load_contacts().await?;
        info!("Loaded {} contacts", book.len());
        self.contacts = Some(book);
        Ok(())
    }

    fn contact_by_name(&self, name: &str) -> Option<Contact> {
        self.contacts.as_ref()?.find_by_name(name).cloned()
    }

    async fn send_message(&mut self, contact: &Contact, text: &str) -> MeshResult<SendResult> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or_default();

        self.link
            .write_frame(&send_text_frame(&contact.key_prefix(), text, timestamp, 0))
            .await?;

        loop {
            match self.next_response("message sent").await? {
                Response::Sent(receipt) => return Ok(SendResult::Success(receipt)),
                Response::Error(code) => return Ok(SendResult::Error(describe_error_code(code))),
                other => debug!("Ignoring {:?} while sending", other),
            }
        }
    }

    async fn disconnect(&mut self) -> MeshResult<()> {
        self.link.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use meshsend_core::ContactKind;

    use super::*;
    use crate::protocol::tests::{contact_frame, self_info_frame, sent_frame};

    /// Link that replays scripted frames and records writes
    #[derive(Default)]
    struct ScriptedLink {
        incoming: VecDeque<Vec<u8>>,
        written: Arc<Mutex<Vec<Vec<u8>>>>,
        closed: Arc<Mutex<bool>>,
    }

    impl ScriptedLink {
        fn with_frames(frames: Vec<Vec<u8>>) -> Self {
            Self {
                incoming: frames.into(),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl FrameLink for ScriptedLink {
        async fn write_frame(&mut self, frame: &[u8]) -> Result<(), BleTransportError> {
            self.written.lock().unwrap().push(frame.to_vec());
            Ok(())
        }

        async fn next_frame(&mut self) -> Result<Vec<u8>, BleTransportError> {
            match self.incoming.pop_front() {
                Some(frame) => Ok(frame),
                None => futures::future::pending().await,
            }
        }

        async fn close(&mut self) -> Result<(), BleTransportError> {
            *self.closed.lock().unwrap() = true;
            Ok(())
        }
    }

    fn session(frames: Vec<Vec<u8>>) -> CompanionSession<ScriptedLink> {
        CompanionSession::new(ScriptedLink::with_frames(frames), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_handshake_skips_push_frames() {
        let mut session = session(vec![vec![0x83], self_info_frame("Companion")]);

        let info = session.start("meshsend").await.unwrap();
        assert_eq!(info.name, "Companion");

        let written = session.link.written.lock().unwrap().clone();
        assert_eq!(written, vec![app_start_frame("meshsend")]);
    }

    #[tokio::test]
    async fn test_ensure_contacts_loads_table() {
        let mut session = session(vec![
            vec![0x02, 2, 0, 0, 0],
            contact_frame(0x01, "Base Camp"),
            vec![0x80, 1, 2, 3],
            contact_frame(0x02, "Ridge"),
            vec![0x04, 77, 0, 0, 0],
        ]);

        assert!(session.contact_by_name("Base Camp").is_none());
        session.ensure_contacts().await.unwrap();

        let contact = session.contact_by_name("Ridge").unwrap();
        assert_eq!(contact.public_key, [0x02; 32]);
        assert_eq!(contact.kind, ContactKind::Chat);
        assert_eq!(session.contacts.as_ref().unwrap().last_modified(), 77);
        assert_eq!(
            session.link.written.lock().unwrap().clone(),
            vec![get_contacts_frame()]
        );
    }

    #[tokio::test]
    async fn test_send_message_success_and_error() {
        let mut session = session(vec![vec![0x82, 0, 0, 0, 0], sent_frame(7), vec![0x01, 3]]);
        let contact = Contact::new([0x09; 32], "Base Camp");

        let first = session.send_message(&contact, "IMG 1/2:QUJD").await.unwrap();
        assert!(matches!(first, SendResult::Success(r) if r.expected_ack == 7));

        let second = session.send_message(&contact, "IMG 2/2:RA==").await.unwrap();
        assert_eq!(second, SendResult::Error("table full".to_string()));

        let written = session.link.written.lock().unwrap().clone();
        assert_eq!(written.len(), 2);
        assert_eq!(&written[0][7..13], &[0x09; 6]);
        assert_eq!(&written[0][13..], b"IMG 1/2:QUJD");
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_reply_times_out() {
        let mut session = session(vec![]);
        let contact = Contact::new([0x09; 32], "Base Camp");

        let result = session.send_message(&contact, "IMG 1/1:QQ==").await;
        assert!(matches!(result, Err(MeshSendError::Transport(_))));
    }

    #[tokio::test]
    async fn test_disconnect_closes_link() {
        let mut session = session(vec![]);
        let closed = Arc::clone(&session.link.closed);

        session.disconnect().await.unwrap();
        assert!(*closed.lock().unwrap());
    }
}
