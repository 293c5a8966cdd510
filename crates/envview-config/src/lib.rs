// crates/envview-config/src/lib.rs
// ============================================================================
// Module: envview Config Library
// Description: Canonical configuration model for the envview server.
// Purpose: Single source of truth for environment-provided settings.
// Dependencies: envview-core, thiserror
// ============================================================================

//! ## Overview
//! `envview-config` reads the server's settings from an injected
//! [`envview_core::EnvironmentSource`] and maps them into a typed
//! [`EnvviewConfig`]. Only startup-critical values (log level, bind address)
//! fail validation; optional integrations are carried as raw values and
//! validated by the components that consume them.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod level;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use level::LogLevel;
