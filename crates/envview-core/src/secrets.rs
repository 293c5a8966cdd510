// crates/envview-core/src/secrets.rs
// ============================================================================
// Module: Secret Fetching
// Description: Secret store interface and all-or-nothing fetch.
// Purpose: Enumerate and retrieve secrets from an optional remote store.
// Dependencies: async-trait, thiserror
// ============================================================================

//! ## Overview
//! A [`SecretStore`] exposes two fallible operations: enumerate secret names
//! and fetch one value by name. [`fetch_secrets`] drives both and returns an
//! explicit [`Result`]; a missing store is the disabled state and yields an
//! empty map without I/O. Any failure aborts the whole fetch so callers never
//! see a partial set.
//! Security posture: secret values are wrapped in [`SecretValue`], whose
//! `Debug` and `Display` output is redacted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use async_trait::async_trait;

// ============================================================================
// SECTION: Secret Values
// ============================================================================

/// Secret value with redacted formatting.
///
/// # Invariants
/// - `Debug` and `Display` never reveal the wrapped value.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretValue(String);

impl SecretValue {
    /// Wraps a raw secret value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Exposes the raw secret value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Secrets keyed by name.
pub type SecretMap = BTreeMap<String, SecretValue>;

// ============================================================================
// SECTION: Store Interface
// ============================================================================

/// Remote store holding named secrets.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Lists the names of every secret in the store.
    ///
    /// # Errors
    ///
    /// Returns [`SecretStoreError`] when the store cannot be enumerated.
    async fn list_secret_names(&self) -> Result<Vec<String>, SecretStoreError>;

    /// Fetches the current value of one secret.
    ///
    /// # Errors
    ///
    /// Returns [`SecretStoreError`] when the value cannot be retrieved.
    async fn get_secret_value(&self, name: &str) -> Result<SecretValue, SecretStoreError>;
}

/// Secret store operation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SecretStoreError {
    /// Authentication against the store failed.
    #[error("authentication failed: {0}")]
    Auth(String),
    /// Transport-level failure reaching the store.
    #[error("transport error: {0}")]
    Transport(String),
    /// The store answered with an unexpected status.
    #[error("store returned status {status}")]
    Status {
        /// HTTP-style status code.
        status: u16,
    },
    /// The store response could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// The named secret does not exist.
    #[error("secret not found: {0}")]
    NotFound(String),
}

// ============================================================================
// SECTION: Fetch
// ============================================================================

/// Errors from a full secret fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SecretFetchError {
    /// Enumerating secret names failed.
    #[error("secret enumeration failed: {0}")]
    Enumerate(#[source] SecretStoreError),
    /// Fetching one secret's value failed.
    #[error("fetching secret {name} failed: {source}")]
    Fetch {
        /// Name of the secret whose fetch failed.
        name: String,
        /// Underlying store error.
        #[source]
        source: SecretStoreError,
    },
}

/// Fetches every secret from the store.
///
/// A `None` store is the disabled state and returns an empty map without
/// touching the network.
///
/// # Errors
///
/// Returns [`SecretFetchError`] on the first enumeration or value failure;
/// values fetched before the failure are discarded.
pub async fn fetch_secrets(store: Option<&dyn SecretStore>) -> Result<SecretMap, SecretFetchError> {
    let Some(store) = store else {
        return Ok(SecretMap::new());
    };
    let names = store.list_secret_names().await.map_err(SecretFetchError::Enumerate)?;
    let mut secrets = SecretMap::new();
    for name in names {
        let value = store.get_secret_value(&name).await.map_err(|source| {
            SecretFetchError::Fetch {
                name: name.clone(),
                source,
            }
        })?;
        secrets.insert(name, value);
    }
    Ok(secrets)
}

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-process secret store for tests and local runs.
///
/// # Invariants
/// - Enumeration returns names in sorted order.
/// - Names listed in `failing` are enumerated but fail on fetch.
#[derive(Debug, Clone, Default)]
pub struct InMemorySecretStore {
    /// Stored secrets.
    secrets: SecretMap,
    /// Secrets whose fetch fails.
    failing: BTreeSet<String>,
    /// Enumeration failure to return, if any.
    list_error: Option<SecretStoreError>,
}

impl InMemorySecretStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the store with one additional secret.
    #[must_use]
    pub fn with_secret(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets.insert(name.into(), SecretValue::new(value));
        self
    }

    /// Returns the store with a secret that is listed but fails on fetch.
    #[must_use]
    pub fn with_failing_secret(mut self, name: impl Into<String>) -> Self {
        self.failing.insert(name.into());
        self
    }

    /// Returns the store with enumeration failing with `error`.
    #[must_use]
    pub fn with_list_error(mut self, error: SecretStoreError) -> Self {
        self.list_error = Some(error);
        self
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn list_secret_names(&self) -> Result<Vec<String>, SecretStoreError> {
        if let Some(error) = &self.list_error {
            return Err(error.clone());
        }
        let names: BTreeSet<&String> = self.secrets.keys().chain(self.failing.iter()).collect();
        Ok(names.into_iter().cloned().collect())
    }

    async fn get_secret_value(&self, name: &str) -> Result<SecretValue, SecretStoreError> {
        if self.failing.contains(name) {
            return Err(SecretStoreError::Transport(format!("injected failure for {name}")));
        }
        self.secrets.get(name).cloned().ok_or_else(|| SecretStoreError::NotFound(name.to_string()))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
