// crates/envview-config/src/level.rs
// ============================================================================
// Module: Log Levels
// Description: Log verbosity names accepted from configuration.
// Purpose: Map operator-facing level names onto filter directives.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Operators name log levels the conventional way (`DEBUG`, `INFO`,
//! `WARNING`, `ERROR`, `CRITICAL`). Names are matched case-insensitively and
//! mapped onto the five levels of the logging backend.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;

// ============================================================================
// SECTION: Log Level
// ============================================================================

/// Log verbosity threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Everything, including trace output (`NOTSET`).
    Trace,
    /// Debug output and above.
    Debug,
    /// Informational output and above.
    #[default]
    Info,
    /// Warnings and errors (`WARNING`, `WARN`).
    Warn,
    /// Errors only (`ERROR`, `CRITICAL`, `FATAL`).
    Error,
}

impl LogLevel {
    /// Returns the filter directive understood by the logging backend.
    #[must_use]
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_directive())
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let name = raw.trim().to_ascii_uppercase();
        match name.as_str() {
            "NOTSET" | "TRACE" => Ok(Self::Trace),
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARNING" | "WARN" => Ok(Self::Warn),
            "ERROR" | "CRITICAL" | "FATAL" => Ok(Self::Error),
            _ => Err(ConfigError::InvalidLogLevel(raw.to_string())),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
