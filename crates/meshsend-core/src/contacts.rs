//! Contact records and name lookup
//!
//! Lookup policy: names are compared exactly (case-sensitive, no trimming) and
//! when several contacts share a name the first one in the radio's reported
//! order wins.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Length of the public key prefix used to address text messages
pub const PUBKEY_PREFIX_LEN: usize = 6;

// ----------------------------------------------------------------------------
// Contact
// ----------------------------------------------------------------------------

/// Kind of node a contact represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactKind {
    Chat,
    Repeater,
    Room,
    Sensor,
    Unknown(u8),
}

impl From<u8> for ContactKind {
    fn from(code: u8) -> Self {
        match code {
            1 => ContactKind::Chat,
            2 => ContactKind::Repeater,
            3 => ContactKind::Room,
            4 => ContactKind::Sensor,
            other => ContactKind::Unknown(other),
        }
    }
}

/// A peer known to the radio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub public_key: [u8; 32],
    pub kind: ContactKind,
    pub flags: u8,
    /// Known outbound path length; negative means flood routing
    pub out_path_len: i8,
    pub name: String,
    pub last_advert: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub last_modified: u32,
}

impl Contact {
    /// Minimal contact with only a key and a name
    pub fn new(public_key: [u8; 32], name: impl Into<String>) -> Self {
        Self {
            public_key,
            kind: ContactKind::Chat,
            flags: 0,
            out_path_len: -1,
            name: name.into(),
            last_advert: 0,
            latitude: 0.0,
            longitude: 0.0,
            last_modified: 0,
        }
    }

    /// Address prefix used when sending direct messages
    pub fn key_prefix(&self) -> [u8; PUBKEY_PREFIX_LEN] {
        let mut prefix = [0u8; PUBKEY_PREFIX_LEN];
        prefix.copy_from_slice(&self.public_key[..PUBKEY_PREFIX_LEN]);
        prefix
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key)
    }

    pub fn is_flood_routed(&self) -> bool {
        self.out_path_len < 0
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})",
            self.name,
            hex::encode(self.key_prefix())
        )
    }
}

// ----------------------------------------------------------------------------
// Contact Book
// ----------------------------------------------------------------------------

/// Contacts in the order the radio reported them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactBook {
    contacts: Vec<Contact>,
    /// Radio-side modification marker from the last sync
    last_modified: u32,
}

impl ContactBook {
    pub fn new(contacts: Vec<Contact>, last_modified: u32) -> Self {
        Self {
            contacts,
            last_modified,
        }
    }

    /// First contact whose name equals `name` exactly
    pub fn find_by_name(&self, name: &str) -> Option<&Contact> {
        self.contacts.iter().find(|contact| contact.name == name)
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn last_modified(&self) -> u32 {
        self.last_modified
    }

    pub fn iter(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.iter()
    }
}
