// crates/envview-config/src/config.rs
// ============================================================================
// Module: envview Configuration
// Description: Environment-backed configuration for the envview server.
// Purpose: Centralize env parsing with strict validation of startup values.
// Dependencies: envview-core
// ============================================================================

//! ## Overview
//! Settings are read once at startup through an [`EnvironmentSource`].
//! Log level and bind address fail closed on invalid input. The telemetry key
//! and Key Vault URI are optional; their presence activates the matching
//! integration and their validity is judged by that integration, which
//! degrades instead of failing startup.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;

use envview_core::EnvironmentSource;

use crate::level::LogLevel;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default listen address for the HTTP server.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8000";

// ============================================================================
// SECTION: Environment Keys
// ============================================================================

/// Environment keys read by envview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvviewEnv {
    /// Log verbosity level name.
    LogLevel,
    /// Optional telemetry instrumentation key.
    InstrumentationKey,
    /// Comma-delimited feature flag list (read per request).
    FeatureFlags,
    /// Optional Azure Key Vault URI.
    KeyVaultUri,
    /// Optional HTTP listen address override.
    BindAddress,
}

impl EnvviewEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LogLevel => "LOG_LEVEL",
            Self::InstrumentationKey => "APPINSIGHTS_INSTRUMENTATIONKEY",
            Self::FeatureFlags => "FEATURE_FLAGS",
            Self::KeyVaultUri => "AZURE_KEY_VAULT_URI",
            Self::BindAddress => "BIND_ADDRESS",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed envview configuration derived from environment variables.
///
/// # Invariants
/// - `key_vault_uri` is `None` when the variable is unset or blank.
/// - `instrumentation_key` is `Some` whenever the variable is set, even blank.
#[derive(Clone, PartialEq, Eq)]
pub struct EnvviewConfig {
    /// Logging threshold.
    pub log_level: LogLevel,
    /// Raw telemetry instrumentation key, if configured.
    pub instrumentation_key: Option<String>,
    /// Raw Key Vault URI, if configured.
    pub key_vault_uri: Option<String>,
    /// HTTP listen address.
    pub bind: SocketAddr,
}

impl EnvviewConfig {
    /// Loads configuration from the given environment source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the log level or bind address is invalid.
    pub fn from_env(env: &dyn EnvironmentSource) -> Result<Self, ConfigError> {
        let log_level = match env.get(EnvviewEnv::LogLevel.as_str()) {
            Some(raw) => raw.parse()?,
            None => LogLevel::default(),
        };
        let bind = parse_bind(
            env.get(EnvviewEnv::BindAddress.as_str()).as_deref().unwrap_or(DEFAULT_BIND_ADDRESS),
        )?;
        let key_vault_uri = env
            .get(EnvviewEnv::KeyVaultUri.as_str())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        Ok(Self {
            log_level,
            instrumentation_key: env.get(EnvviewEnv::InstrumentationKey.as_str()),
            key_vault_uri,
            bind,
        })
    }

    /// Applies command-line overrides on top of the environment values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an override is invalid.
    pub fn with_overrides(
        mut self,
        bind: Option<&str>,
        log_level: Option<&str>,
    ) -> Result<Self, ConfigError> {
        if let Some(bind) = bind {
            self.bind = parse_bind(bind)?;
        }
        if let Some(level) = log_level {
            self.log_level = level.parse()?;
        }
        Ok(self)
    }

    /// Returns true when telemetry wiring should be attempted.
    #[must_use]
    pub const fn telemetry_requested(&self) -> bool {
        self.instrumentation_key.is_some()
    }

    /// Returns true when a secret store should be constructed.
    #[must_use]
    pub const fn key_vault_requested(&self) -> bool {
        self.key_vault_uri.is_some()
    }
}

impl std::fmt::Debug for EnvviewConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvviewConfig")
            .field("log_level", &self.log_level)
            .field("instrumentation_key", &self.instrumentation_key.as_ref().map(|_| "[REDACTED]"))
            .field("key_vault_uri", &self.key_vault_uri)
            .field("bind", &self.bind)
            .finish()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Unrecognized log level name.
    #[error("invalid log level: {0:?}")]
    InvalidLogLevel(String),
    /// Bind address is not a socket address.
    #[error("invalid bind address: {0:?}")]
    InvalidBindAddress(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a listen address.
fn parse_bind(raw: &str) -> Result<SocketAddr, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidBindAddress(raw.to_string()))
}
