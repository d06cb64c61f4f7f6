//! MeshCore companion protocol over the Nordic UART Service
//!
//! Every GATT write or notification carries exactly one frame. The first byte
//! is a command code (host to radio) or a response code (radio to host);
//! multi-byte integers are little-endian.

use meshsend_core::{Contact, ContactKind, SendReceipt, PUBKEY_PREFIX_LEN};
use uuid::Uuid;

use crate::error::BleTransportError;

// ----------------------------------------------------------------------------
// BLE Service and Characteristic UUIDs
// ----------------------------------------------------------------------------

/// Nordic UART service exposed by MeshCore companion radios
pub const MESHCORE_SERVICE_UUID: Uuid = Uuid::from_u128(0x6E400001_B5A3_F393_E0A9_E50E24DCCA9E);

/// Characteristic the host writes command frames to
pub const MESHCORE_TX_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0x6E400002_B5A3_F393_E0A9_E50E24DCCA9E);

/// Characteristic the radio notifies response frames on
pub const MESHCORE_RX_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0x6E400003_B5A3_F393_E0A9_E50E24DCCA9E);

// ----------------------------------------------------------------------------
// Frame Codes
// ----------------------------------------------------------------------------

/// Companion protocol version announced in the handshake
pub const PROTOCOL_VERSION: u8 = 0x03;

/// Command codes sent by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandCode {
    AppStart = 0x01,
    SendTextMessage = 0x02,
    GetContacts = 0x04,
}

/// Response codes sent by the radio
pub mod response_code {
    pub const OK: u8 = 0x00;
    pub const ERROR: u8 = 0x01;
    pub const CONTACTS_START: u8 = 0x02;
    pub const CONTACT: u8 = 0x03;
    pub const END_OF_CONTACTS: u8 = 0x04;
    pub const SELF_INFO: u8 = 0x05;
    pub const SENT: u8 = 0x06;
    /// Codes at or above this are unsolicited push notifications
    pub const PUSH_BASE: u8 = 0x80;
}

/// Plain text message type
const TEXT_TYPE_PLAIN: u8 = 0x00;

const NAME_FIELD_LEN: usize = 32;
const OUT_PATH_FIELD_LEN: usize = 64;
const CONTACT_BODY_LEN: usize = 32 + 1 + 1 + 1 + OUT_PATH_FIELD_LEN + NAME_FIELD_LEN + 4 * 4;
const SELF_INFO_KEY_OFFSET: usize = 3;
const SELF_INFO_NAME_OFFSET: usize = 57;
const SENT_BODY_LEN: usize = 9;

// ----------------------------------------------------------------------------
// Command Frames
// ----------------------------------------------------------------------------

/// Handshake frame: code, version, six reserved bytes, application name
pub fn app_start_frame(app_name: &str) -> Vec<u8> {
    let mut frame = Vec::with_capacity(8 + app_name.len());
    frame.push(CommandCode::AppStart as u8);
    frame.push(PROTOCOL_VERSION);
    frame.extend_from_slice(&[b' '; 6]);
    frame.extend_from_slice(app_name.as_bytes());
    frame
}

/// Request the full contact table
pub fn get_contacts_frame() -> Vec<u8> {
    vec![CommandCode::GetContacts as u8]
}

/// Direct text message to the contact identified by `key_prefix`
pub fn send_text_frame(
    key_prefix: &[u8; PUBKEY_PREFIX_LEN],
    text: &str,
    timestamp: u32,
    attempt: u8,
) -> Vec<u8> {
    let mut frame = Vec::with_capacity(3 + 4 + PUBKEY_PREFIX_LEN + text.len());
    frame.push(CommandCode::SendTextMessage as u8);
    frame.push(TEXT_TYPE_PLAIN);
    frame.push(attempt);
    frame.extend_from_slice(&timestamp.to_le_bytes());
    frame.extend_from_slice(key_prefix);
    frame.extend_from_slice(text.as_bytes());
    frame
}

// ----------------------------------------------------------------------------
// Response Frames
// ----------------------------------------------------------------------------

/// Identity the radio reports after the handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfInfo {
    pub public_key: [u8; 32],
    pub name: String,
}

/// A decoded radio-to-host frame
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Ok,
    Error(Option<u8>),
    ContactsStart { count: u32 },
    Contact(Contact),
    EndOfContacts { last_modified: u32 },
    SelfInfo(SelfInfo),
    Sent(SendReceipt),
    /// Unsolicited notification (adverts, acks, waiting messages)
    Push(u8),
    Unknown(u8),
}

impl Response {
    pub fn parse(frame: &[u8]) -> Result<Self, BleTransportError> {
        let (&code, body) = frame
            .split_first()
            .ok_or_else(|| BleTransportError::MalformedFrame("empty frame".into()))?;

        let response = match code {
            response_code::OK => Response::Ok,
            response_code::ERROR => Response::Error(body.first().copied()),
            response_code::CONTACTS_START => Response::ContactsStart {
                count: read_u32(body, 0, "contacts start")?,
            },
            response_code::CONTACT => Response::Contact(parse_contact(body)?),
            response_code::END_OF_CONTACTS => Response::EndOfContacts {
                last_modified: if body.len() >= 4 {
                    read_u32(body, 0, "end of contacts")?
                } else {
                    0
                },
            },
            response_code::SELF_INFO => Response::SelfInfo(parse_self_info(body)?),
            response_code::SENT => Response::Sent(parse_sent(body)?),
            code if code >= response_code::PUSH_BASE => Response::Push(code),
            code => Response::Unknown(code),
        };

        Ok(response)
    }
}

/// Human-readable reason for a radio error code
pub fn describe_error_code(code: Option<u8>) -> String {
    match code {
        None => "unspecified error".to_string(),
        Some(1) => "unsupported command".to_string(),
        Some(2) => "not found".to_string(),
        Some(3) => "table full".to_string(),
        Some(4) => "bad state".to_string(),
        Some(5) => "file I/O error".to_string(),
        Some(6) => "illegal argument".to_string(),
        Some(other) => format!("error code {}", other),
    }
}

fn parse_contact(body: &[u8]) -> Result<Contact, BleTransportError> {
    if body.len() < CONTACT_BODY_LEN {
        return Err(BleTransportError::MalformedFrame(format!(
            "contact frame has {} bytes, expected {}",
            body.len(),
            CONTACT_BODY_LEN
        )));
    }

    let mut public_key = [0u8; 32];
    public_key.copy_from_slice(&body[..32]);

    let name_start = 35 + OUT_PATH_FIELD_LEN;
    let ints_start = name_start + NAME_FIELD_LEN;

    Ok(Contact {
        public_key,
        kind: ContactKind::from(body[32]),
        flags: body[33],
        out_path_len: body[34] as i8,
        name: decode_name(&body[name_start..ints_start]),
        last_advert: read_u32(body, ints_start, "contact")?,
        latitude: read_i32(body, ints_start + 4, "contact")? as f64 / 1e6,
        longitude: read_i32(body, ints_start + 8, "contact")? as f64 / 1e6,
        last_modified: read_u32(body, ints_start + 12, "contact")?,
    })
}

fn parse_self_info(body: &[u8]) -> Result<SelfInfo, BleTransportError> {
    let key_end = SELF_INFO_KEY_OFFSET + 32;
    if body.len() < key_end {
        return Err(BleTransportError::MalformedFrame(format!(
            "self info frame has {} bytes",
            body.len()
        )));
    }

    let mut public_key = [0u8; 32];
    public_key.copy_from_slice(&body[SELF_INFO_KEY_OFFSET..key_end]);

    let name = body
        .get(SELF_INFO_NAME_OFFSET..)
        .map(decode_name)
        .unwrap_or_default();

    Ok(SelfInfo { public_key, name })
}

fn parse_sent(body: &[u8]) -> Result<SendReceipt, BleTransportError> {
    if body.len() < SENT_BODY_LEN {
        return Err(BleTransportError::MalformedFrame(format!(
            "sent frame has {} bytes",
            body.len()
        )));
    }

    Ok(SendReceipt {
        flood: body[0] == 1,
        expected_ack: read_u32(body, 1, "sent")?,
        suggested_timeout_ms: read_u32(body, 5, "sent")?,
    })
}

/// NUL-padded UTF-8 field
fn decode_name(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

fn read_u32(body: &[u8], offset: usize, what: &str) -> Result<u32, BleTransportError> {
    body.get(offset..offset + 4)
        .and_then(|bytes| bytes.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or_else(|| BleTransportError::MalformedFrame(format!("{} frame truncated", what)))
}

fn read_i32(body: &[u8], offset: usize, what: &str) -> Result<i32, BleTransportError> {
    read_u32(body, offset, what).map(|value| value as i32)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Contact frame laid out the way the radio sends it
    pub(crate) fn contact_frame(key_byte: u8, name: &str) -> Vec<u8> {
        let mut frame = vec![response_code::CONTACT];
        frame.extend_from_slice(&[key_byte; 32]);
        frame.push(1); // chat
        frame.push(0); // flags
        frame.push(0xff); // out_path_len = -1
        frame.extend_from_slice(&[0u8; OUT_PATH_FIELD_LEN]);
        let mut name_field = [0u8; NAME_FIELD_LEN];
        name_field[..name.len()].copy_from_slice(name.as_bytes());
        frame.extend_from_slice(&name_field);
        frame.extend_from_slice(&1_700_000_000u32.to_le_bytes());
        frame.extend_from_slice(&47_123_456i32.to_le_bytes());
        frame.extend_from_slice(&(-122_500_000i32).to_le_bytes());
        frame.extend_from_slice(&42u32.to_le_bytes());
        frame
    }

    pub(crate) fn sent_frame(ack: u32) -> Vec<u8> {
        let mut frame = vec![response_code::SENT, 1];
        frame.extend_from_slice(&ack.to_le_bytes());
        frame.extend_from_slice(&5000u32.to_le_bytes());
        frame
    }

    pub(crate) fn self_info_frame(name: &str) -> Vec<u8> {
        let mut frame = vec![response_code::SELF_INFO, 1, 22, 22];
        frame.extend_from_slice(&[0xab; 32]);
        frame.extend_from_slice(&[0u8; SELF_INFO_NAME_OFFSET - SELF_INFO_KEY_OFFSET - 32]);
        frame.extend_from_slice(name.as_bytes());
        frame
    }

    #[test]
    fn test_app_start_frame() {
        let frame = app_start_frame("mccli");
        assert_eq!(frame, b"\x01\x03      mccli".to_vec());
    }

    #[test]
    fn test_send_text_frame_layout() {
        let prefix = [1, 2, 3, 4, 5, 6];
        let frame = send_text_frame(&prefix, "IMG 1/1:QQ==", 0x0102_0304, 0);
        assert_eq!(&frame[..3], &[0x02, 0x00, 0x00]);
        assert_eq!(&frame[3..7], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&frame[7..13], &prefix);
        assert_eq!(&frame[13..], b"IMG 1/1:QQ==");
    }

    #[test]
    fn test_parse_contact() {
        let frame = contact_frame(0x11, "Base Camp");
        assert_eq!(frame.len(), 1 + CONTACT_BODY_LEN);

        match Response::parse(&frame).unwrap() {
            Response::Contact(contact) => {
                assert_eq!(contact.public_key, [0x11; 32]);
                assert_eq!(contact.kind, ContactKind::Chat);
                assert_eq!(contact.out_path_len, -1);
                assert_eq!(contact.name, "Base Camp");
                assert_eq!(contact.last_advert, 1_700_000_000);
                assert!((contact.latitude - 47.123456).abs() < 1e-9);
                assert!((contact.longitude + 122.5).abs() < 1e-9);
                assert_eq!(contact.last_modified, 42);
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_parse_truncated_contact() {
        let frame = contact_frame(0x11, "x");
        assert!(matches!(
            Response::parse(&frame[..100]),
            Err(BleTransportError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_parse_sent_and_error() {
        match Response::parse(&sent_frame(0xdead_beef)).unwrap() {
            Response::Sent(receipt) => {
                assert!(receipt.flood);
                assert_eq!(receipt.expected_ack, 0xdead_beef);
                assert_eq!(receipt.suggested_timeout_ms, 5000);
            }
            other => panic!("unexpected response: {:?}", other),
        }

        assert_eq!(Response::parse(&[0x01, 0x03]).unwrap(), Response::Error(Some(3)));
        assert_eq!(Response::parse(&[0x01]).unwrap(), Response::Error(None));
        assert_eq!(describe_error_code(Some(3)), "table full");
    }

    #[test]
    fn test_parse_contact_list_markers() {
        assert_eq!(
            Response::parse(&[0x02, 5, 0, 0, 0]).unwrap(),
            Response::ContactsStart { count: 5 }
        );
        assert_eq!(
            Response::parse(&[0x04, 9, 0, 0, 0]).unwrap(),
            Response::EndOfContacts { last_modified: 9 }
        );
        assert_eq!(
            Response::parse(&[0x04]).unwrap(),
            Response::EndOfContacts { last_modified: 0 }
        );
    }

    #[test]
    fn test_parse_self_info() {
        match Response::parse(&self_info_frame("Companion")).unwrap() {
            Response::SelfInfo(info) => {
                assert_eq!(info.public_key, [0xab; 32]);
                assert_eq!(info.name, "Companion");
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_push_and_unknown_codes() {
        assert_eq!(Response::parse(&[0x83]).unwrap(), Response::Push(0x83));
        assert_eq!(Response::parse(&[0x0c]).unwrap(), Response::Unknown(0x0c));
        assert!(Response::parse(&[]).is_err());
    }
}
