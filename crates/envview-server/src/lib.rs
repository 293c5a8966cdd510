// crates/envview-server/src/lib.rs
// ============================================================================
// Module: envview Server Library
// Description: HTTP surface for the environment diagnostic page.
// Purpose: Wire configuration, secrets, telemetry, and rendering into axum.
// Dependencies: axum, envview-core, envview-config, envview-keyvault, tracing
// ============================================================================

//! ## Overview
//! The server exposes `GET /health` and `GET /`. State is assembled once in
//! [`AppState`] and every request reads environment, flags, and secrets
//! afresh through it.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod logging;
pub mod render;
pub mod server;
pub mod telemetry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use logging::LoggingError;
pub use logging::init_logging;
pub use render::escape_html;
pub use render::render_index;
pub use server::AppState;
pub use server::ServerError;
pub use server::build_router;
pub use server::build_secret_store;
pub use server::load_secrets;
pub use server::serve;
pub use server::shutdown_signal;
pub use telemetry::NoopMetrics;
pub use telemetry::RequestMetricEvent;
pub use telemetry::RequestMetrics;
pub use telemetry::TelemetryError;
pub use telemetry::TracingMetrics;
pub use telemetry::build_metrics;
pub use telemetry::validate_instrumentation_key;
