// crates/envview-server/src/main.rs
// ============================================================================
// Module: envview Binary
// Description: Process entry point for the envview server.
// Purpose: Load configuration, install logging, and serve HTTP.
// Dependencies: clap, envview-config, envview-core, envview-server, tokio
// ============================================================================

//! ## Overview
//! Reads configuration from the process environment, applies command-line
//! overrides, installs the log subscriber, builds shared state, and serves
//! until Ctrl+C or SIGTERM. Startup errors are written to stderr and exit
//! with a failure code.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use envview_config::EnvviewConfig;
use envview_core::EnvironmentSource;
use envview_core::ProcessEnvironment;
use envview_server::AppState;
use envview_server::ServerError;
use envview_server::build_metrics;
use envview_server::build_secret_store;
use envview_server::init_logging;
use envview_server::serve;
use envview_server::shutdown_signal;
use tracing::info;

// ============================================================================
// SECTION: CLI
// ============================================================================

/// Environment diagnostic web page.
#[derive(Parser, Debug)]
#[command(name = "envview", version)]
struct Cli {
    /// Listen address, overriding `BIND_ADDRESS`.
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
    /// Log level, overriding `LOG_LEVEL`.
    #[arg(long = "log-level", value_name = "LEVEL")]
    log_level: Option<String>,
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Binary entry point.
#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Runs the server until shutdown.
async fn run() -> Result<(), ServerError> {
    let cli = Cli::parse();
    let env: Arc<dyn EnvironmentSource> = Arc::new(ProcessEnvironment);
    let config = EnvviewConfig::from_env(env.as_ref())?
        .with_overrides(cli.bind.as_deref(), cli.log_level.as_deref())?;
    init_logging(config.log_level, env.get("RUST_LOG").as_deref())?;
    info!(
        log_level = %config.log_level,
        telemetry = config.telemetry_requested(),
        key_vault = config.key_vault_requested(),
        "starting envview"
    );

    let metrics = build_metrics(config.instrumentation_key.as_deref());
    let secret_store = build_secret_store(&config, env.as_ref());
    let state = Arc::new(AppState::new(env, secret_store, metrics));
    serve(config.bind, state, shutdown_signal()).await
}

/// Writes a startup error to stderr and returns a failure code.
fn emit_error(message: &str) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "envview: {message}");
    ExitCode::FAILURE
}
