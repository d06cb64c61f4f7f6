//! File selection and error alerts
//!
//! Both run synchronously, before the async runtime exists.

use std::path::PathBuf;

use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};
use tracing::error;

/// Title of the file-open dialog
pub const PICKER_TITLE: &str = "Select Image File";

/// Source of the file to send and sink for user-facing alerts
pub trait FilePicker {
    /// Ask for a file; `None` when the user cancels
    fn pick_file(&self) -> Option<PathBuf>;

    /// Report a blocking error to the user
    fn show_error(&self, title: &str, message: &str);
}

/// Native desktop dialogs
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopDialogs;

impl FilePicker for DesktopDialogs {
    fn pick_file(&self) -> Option<PathBuf> {
        FileDialog::new().set_title(PICKER_TITLE).pick_file()
    }

    fn show_error(&self, title: &str, message: &str) {
        let _ = MessageDialog::new()
            .set_level(MessageLevel::Error)
            .set_title(title)
            .set_description(message)
            .set_buttons(MessageButtons::Ok)
            .show();
    }
}

/// A path given on the command line, for headless runs
#[derive(Debug, Clone)]
pub struct PresetFile {
    path: PathBuf,
}

impl PresetFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl FilePicker for PresetFile {
    fn pick_file(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }

    fn show_error(&self, title: &str, message: &str) {
        error!("{}: {}", title, message);
    }
}
