// crates/envview-keyvault/src/error.rs
// ============================================================================
// Module: Key Vault Errors
// Description: Construction and credential failures for Key Vault access.
// Purpose: Classify failures before they are mapped onto store errors.
// Dependencies: envview-core, thiserror
// ============================================================================

//! ## Overview
//! Construction failures ([`KeyVaultError`]) disable the secret store for the
//! process lifetime. Credential failures ([`CredentialError`]) happen per
//! request and surface as [`SecretStoreError::Auth`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use envview_core::SecretStoreError;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Key Vault client construction failures.
#[derive(Debug, Error)]
pub enum KeyVaultError {
    /// Vault URI is malformed or uses a disallowed scheme.
    #[error("invalid vault uri: {0}")]
    InvalidUri(String),
    /// HTTP client could not be built.
    #[error("http client error: {0}")]
    Client(String),
    /// No usable credential could be configured.
    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),
}

/// Token acquisition failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// Credential configuration is incomplete or invalid.
    #[error("invalid credential config: {0}")]
    Config(String),
    /// Token endpoint could not be reached.
    #[error("token request failed: {0}")]
    Request(String),
    /// Token endpoint rejected the request.
    #[error("token endpoint returned status {0}")]
    Status(u16),
    /// Token response could not be decoded.
    #[error("invalid token response: {0}")]
    InvalidResponse(String),
}

impl From<CredentialError> for SecretStoreError {
    fn from(err: CredentialError) -> Self {
        Self::Auth(err.to_string())
    }
}
