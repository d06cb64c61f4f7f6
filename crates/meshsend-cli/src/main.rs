//! meshsend - send an image to a MeshCore contact over BLE

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use meshsend_ble::BleTransport;
use meshsend_cli::{
    ctrl_c, AppConfig, Cli, CliError, DesktopDialogs, MeshSendApp, PresetFile, Result,
};

fn main() -> ExitCode {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    setup_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli(&cli);
    config.validate()?;

    let app = MeshSendApp::new(cli.device, cli.contact, config);

    // Built up front, entered only after a file has been accepted
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))?;
    let transport = BleTransport::with_config(app.config().ble.clone());

    let outcome = match cli.file {
        Some(path) => app.run(&PresetFile::new(path), &runtime, &transport, ctrl_c()),
        None => app.run(&DesktopDialogs, &runtime, &transport, ctrl_c()),
    }?;
    let Some(report) = outcome else {
        println!("No image selected");
        return Ok(());
    };

    info!(
        "Transfer complete: {} chunks, {} base64 characters",
        report.chunks_sent, report.payload_len
    );
    Ok(())
}

/// Setup logging based on verbosity level
fn setup_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
