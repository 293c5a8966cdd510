// crates/envview-server/src/logging.rs
// ============================================================================
// Module: Logging
// Description: tracing subscriber installation.
// Purpose: Map the configured log level onto an EnvFilter.
// Dependencies: envview-config, tracing-subscriber
// ============================================================================

//! ## Overview
//! The process log threshold comes from `LOG_LEVEL` (or `--log-level`). A
//! non-blank `RUST_LOG` directive takes precedence so operators can scope
//! verbosity per target.

// ============================================================================
// SECTION: Imports
// ============================================================================

use envview_config::LogLevel;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Filter
// ============================================================================

/// Builds the subscriber filter.
///
/// # Errors
///
/// Returns [`LoggingError::Directive`] when `rust_log` does not parse.
pub fn build_filter(level: LogLevel, rust_log: Option<&str>) -> Result<EnvFilter, LoggingError> {
    match rust_log.map(str::trim).filter(|directive| !directive.is_empty()) {
        Some(directive) => {
            EnvFilter::try_new(directive).map_err(|err| LoggingError::Directive(err.to_string()))
        }
        None => Ok(EnvFilter::new(level.as_directive())),
    }
}

/// Installs the global `fmt` subscriber.
///
/// # Errors
///
/// Returns [`LoggingError`] when the filter is invalid or a subscriber is
/// already installed.
pub fn init_logging(level: LogLevel, rust_log: Option<&str>) -> Result<(), LoggingError> {
    let filter = build_filter(level, rust_log)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| LoggingError::Init(err.to_string()))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Logging setup errors.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// `RUST_LOG` directive is invalid.
    #[error("invalid RUST_LOG directive: {0}")]
    Directive(String),
    /// Subscriber installation failed.
    #[error("failed to install log subscriber: {0}")]
    Init(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
