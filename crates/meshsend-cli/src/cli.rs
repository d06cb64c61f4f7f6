//! Command-line interface definitions and parsing

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "meshsend",
    author,
    version,
    about = "Send an image over MeshCore via BLE using a GUI file picker",
    long_about = None
)]
pub struct Cli {
    /// BLE address or name of the MeshCore radio
    pub device: String,

    /// Destination contact name
    pub contact: String,

    /// Chunk size in characters of base64 data [default: 200]
    #[arg(long)]
    pub chunk: Option<NonZeroUsize>,

    /// Send this file instead of opening the file picker
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Delay after each sent chunk in milliseconds
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// How long to scan for the radio, in seconds
    #[arg(long, value_name = "SECS")]
    pub scan_timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_positionals_and_defaults() {
        let cli = Cli::try_parse_from(["meshsend", "AA:BB:CC:DD:EE:FF", "Base Camp"]).unwrap();
        assert_eq!(cli.device, "AA:BB:CC:DD:EE:FF");
        assert_eq!(cli.contact, "Base Camp");
        assert!(cli.chunk.is_none());
        assert!(cli.file.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_chunk_option() {
        let cli = Cli::try_parse_from(["meshsend", "radio", "Bob", "--chunk", "120"]).unwrap();
        assert_eq!(cli.chunk.map(NonZeroUsize::get), Some(120));
    }

    #[test]
    fn test_missing_contact_is_usage_error() {
        let err = Cli::try_parse_from(["meshsend", "radio"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_invalid_chunk_is_usage_error() {
        let err = Cli::try_parse_from(["meshsend", "radio", "Bob", "--chunk", "abc"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);

        let err = Cli::try_parse_from(["meshsend", "radio", "Bob", "--chunk", "0"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }
}
