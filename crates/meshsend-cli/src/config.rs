//! meshsend configuration management
//!
//! Configuration is layered with figment, lowest priority first:
//! - Built-in defaults
//! - `meshsend.toml` in the working directory
//! - An explicit `--config` file
//! - Environment variables (`MESHSEND_*`, nested keys separated by `__`,
//!   e.g. `MESHSEND_TRANSFER__CHUNK_SIZE=120`)
//! - Command line arguments

use std::path::Path;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use meshsend_ble::BleTransportConfig;
use meshsend_core::TransferConfig;

use crate::cli::Cli;
use crate::error::{CliError, Result};

/// Config file picked up from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "meshsend.toml";

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "MESHSEND_";

// ----------------------------------------------------------------------------
// Application Configuration
// ----------------------------------------------------------------------------

/// Complete configuration for the meshsend CLI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Size limit, chunking and pacing
    pub transfer: TransferConfig,

    /// BLE scanning, connection and handshake
    pub ble: BleTransportConfig,
}

impl AppConfig {
    /// Layered figment without command line overrides
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(DEFAULT_CONFIG_FILE));

        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load configuration from files and environment
    ///
    /// Values are not validated here; call [`AppConfig::validate`] once the
    /// command line overrides are applied.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(CliError::Config(format!(
                    "configuration file not found: {}",
                    path.display()
                )));
            }
        }

        let config: Self = Self::figment(explicit).extract()?;
        Ok(config)
    }

    /// Apply command line overrides on top of the loaded values
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(chunk) = cli.chunk {
            self.transfer.chunk_size = chunk.get();
        }
        if let Some(delay_ms) = cli.delay_ms {
            self.transfer.send_delay = Duration::from_millis(delay_ms);
        }
        if let Some(secs) = cli.scan_timeout {
            self.ble.scan_timeout = Duration::from_secs(secs);
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.transfer.validate()?;

        if self.ble.scan_timeout.is_zero() {
            return Err(CliError::Config("ble.scan_timeout_ms must be positive".into()));
        }
        if self.ble.response_timeout.is_zero() {
            return Err(CliError::Config(
                "ble.response_timeout_ms must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use figment::Jail;

    #[test]
    fn test_defaults_without_files() {
        Jail::expect_with(|_jail| {
            let config = AppConfig::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config, AppConfig::default());
            assert_eq!(config.transfer.chunk_size, 200);
            assert_eq!(config.transfer.max_file_size, 1_048_576);
            Ok(())
        });
    }

    #[test]
    fn test_file_then_env_priority() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                [transfer]
                chunk_size = 150
                send_delay_ms = 750

                [ble]
                scan_timeout_ms = 20000
                app_name = "field-kit"
                "#,
            )?;
            jail.set_env("MESHSEND_TRANSFER__CHUNK_SIZE", "80");

            let config = AppConfig::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.transfer.chunk_size, 80);
            assert_eq!(config.transfer.send_delay, Duration::from_millis(750));
            assert_eq!(config.ble.scan_timeout, Duration::from_secs(20));
            assert_eq!(config.ble.app_name, "field-kit");
            assert_eq!(config.transfer.max_file_size, 1_048_576);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_overrides_default_file() {
        Jail::expect_with(|jail| {
            jail.create_file(DEFAULT_CONFIG_FILE, "[transfer]\nchunk_size = 150\n")?;
            jail.create_file("custom.toml", "[transfer]\nchunk_size = 90\n")?;

            let config =
                AppConfig::load(Some(Path::new("custom.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.transfer.chunk_size, 90);
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        Jail::expect_with(|_jail| {
            let result = AppConfig::load(Some(Path::new("absent.toml")));
            assert!(matches!(result, Err(CliError::Config(_))));
            Ok(())
        });
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file(DEFAULT_CONFIG_FILE, "[transfer]\nchunk_size = 0\n")?;
            let config = AppConfig::load(None).map_err(|e| e.to_string())?;
            assert!(config.validate().is_err());
            Ok(())
        });
    }

    #[test]
    fn test_cli_chunk_overrides_invalid_env_value() {
        Jail::expect_with(|jail| {
            jail.set_env("MESHSEND_TRANSFER__CHUNK_SIZE", "0");

            let mut config = AppConfig::load(None).map_err(|e| e.to_string())?;
            let cli = Cli::parse_from(["meshsend", "radio", "Bob", "--chunk", "100"]);
            config.apply_cli(&cli);

            assert_eq!(config.transfer.chunk_size, 100);
            assert!(config.validate().is_ok());
            Ok(())
        });
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "meshsend",
            "radio",
            "Bob",
            "--chunk",
            "64",
            "--delay-ms",
            "100",
            "--scan-timeout",
            "3",
        ]);

        let mut config = AppConfig::default();
        config.apply_cli(&cli);
        assert_eq!(config.transfer.chunk_size, 64);
        assert_eq!(config.transfer.send_delay, Duration::from_millis(100));
        assert_eq!(config.ble.scan_timeout, Duration::from_secs(3));
    }
}
