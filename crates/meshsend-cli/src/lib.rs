//! meshsend CLI library
//!
//! Argument parsing, layered configuration, desktop dialogs and the
//! select-then-send flow behind the `meshsend` binary.

pub mod app;
pub mod cli;
pub mod config;
pub mod dialogs;
pub mod error;

pub use app::{ctrl_c, MeshSendApp, TOO_LARGE_MESSAGE, TOO_LARGE_TITLE};
pub use cli::Cli;
pub use config::AppConfig;
pub use dialogs::{DesktopDialogs, FilePicker, PresetFile};
pub use error::{CliError, Result};
