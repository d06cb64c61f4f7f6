//! Test doubles for the CLI flow: a scripted picker and a recording transport

#![allow(dead_code)]

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use meshsend_cli::FilePicker;
use meshsend_core::{
    Contact, ContactBook, MeshSession, MeshTransport, Result, SendReceipt, SendResult,
};

// ----------------------------------------------------------------------------
// Picker
// ----------------------------------------------------------------------------

/// Returns a fixed answer and records every alert
pub struct ScriptedPicker {
    answer: Option<PathBuf>,
    pub alerts: RefCell<Vec<(String, String)>>,
}

impl ScriptedPicker {
    pub fn returning(path: PathBuf) -> Self {
        Self {
            answer: Some(path),
            alerts: RefCell::new(Vec::new()),
        }
    }

    pub fn cancelled() -> Self {
        Self {
            answer: None,
            alerts: RefCell::new(Vec::new()),
        }
    }
}

impl FilePicker for ScriptedPicker {
    fn pick_file(&self) -> Option<PathBuf> {
        self.answer.clone()
    }

    fn show_error(&self, title: &str, message: &str) {
        self.alerts
            .borrow_mut()
            .push((title.to_string(), message.to_string()));
    }
}

// ----------------------------------------------------------------------------
// Transport
// ----------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Recorded {
    pub connects: usize,
    pub sent: Vec<String>,
    pub disconnects: usize,
}

pub struct RecordingTransport {
    contacts: Vec<Contact>,
    pub recorded: Arc<Mutex<Recorded>>,
}

impl RecordingTransport {
    pub fn new(contacts: Vec<Contact>) -> Self {
        Self {
            contacts,
            recorded: Arc::new(Mutex::new(Recorded::default())),
        }
    }

    pub fn connects(&self) -> usize {
        self.recorded.lock().unwrap().connects
    }

    pub fn sent(&self) -> Vec<String> {
        self.recorded.lock().unwrap().sent.clone()
    }

    pub fn disconnects(&self) -> usize {
        self.recorded.lock().unwrap().disconnects
    }
}

#[async_trait]
impl MeshTransport for RecordingTransport {
    type Session = RecordingSession;

    async fn connect(&self, _device: &str) -> Result<RecordingSession> {
        self.recorded.lock().unwrap().connects += 1;
        Ok(RecordingSession {
            contacts: self.contacts.clone(),
            book: None,
            recorded: Arc::clone(&self.recorded),
        })
    }
}

pub struct RecordingSession {
    contacts: Vec<Contact>,
    book: Option<ContactBook>,
    recorded: Arc<Mutex<Recorded>>,
}

#[async_trait]
impl MeshSession for RecordingSession {
    async fn ensure_contacts(&mut self) -> Result<()> {
        self.book = Some(ContactBook::new(self.contacts.clone(), 0));
        Ok(())
    }

    fn contact_by_name(&self, name: &str) -> Option<Contact> {
        self.book.as_ref()?.find_by_name(name).cloned()
    }

    async fn send_message(&mut self, _contact: &Contact, text: &str) -> Result<SendResult> {
        self.recorded.lock().unwrap().sent.push(text.to_string());
        Ok(SendResult::Success(SendReceipt::default()))
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.recorded.lock().unwrap().disconnects += 1;
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Runtime
// ----------------------------------------------------------------------------

/// Current-thread runtime with the clock paused, so pacing sleeps are instant
pub fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .unwrap()
}

// ----------------------------------------------------------------------------
// Files
// ----------------------------------------------------------------------------

/// Write `len` bytes to a per-test file in the temp directory
pub fn temp_image(name: &str, len: usize) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "meshsend-cli-{}-{}",
        std::process::id(),
        name
    ));
    std::fs::write(&path, vec![0xa5; len]).unwrap();
    path
}
