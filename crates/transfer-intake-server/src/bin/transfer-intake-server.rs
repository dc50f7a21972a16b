// crates/transfer-intake-server/src/bin/transfer-intake-server.rs
// ============================================================================
// Module: Transfer Intake Server Entry Point
// Description: Binary entry for the intake HTTP service.
// Purpose: Load configuration, initialize logging, and run the server.
// Dependencies: clap, tokio, tracing-subscriber, transfer-intake-server
// ============================================================================

//! ## Overview
//! Starts the intake HTTP server from a TOML configuration file. The config
//! path comes from `--config`, the `TRANSFER_INTAKE_CONFIG` environment
//! variable, or the default filename in the working directory.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use transfer_intake_config::IntakeConfig;
use transfer_intake_server::HttpServer;

// ============================================================================
// SECTION: CLI
// ============================================================================

/// Transfer Intake HTTP server.
#[derive(Parser, Debug)]
#[command(name = "transfer-intake-server", version)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Loads configuration and runs the server to completion.
#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let config = match IntakeConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!("failed to load configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    let server = match HttpServer::from_config(config) {
        Ok(server) => server,
        Err(err) => {
            error!("failed to initialize server: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = server.serve().await {
        error!("server terminated: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
