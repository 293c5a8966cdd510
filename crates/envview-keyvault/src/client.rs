// crates/envview-keyvault/src/client.rs
// ============================================================================
// Module: Key Vault Client
// Description: SecretStore implementation over the Key Vault REST API.
// Purpose: Enumerate secret names and fetch current secret values.
// Dependencies: envview-core, reqwest, serde, url
// ============================================================================

//! ## Overview
//! [`KeyVaultClient`] issues bounded GET requests against a single vault:
//! `GET /secrets` (following `nextLink` pages) to enumerate, and
//! `GET /secrets/{name}` to read the current value. Every request carries a
//! fresh bearer token from the configured [`TokenCredential`]. Redirects are
//! not followed and `nextLink` must stay on the vault origin so tokens are
//! never sent elsewhere. There is no retry and no caching.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use envview_core::SecretStore;
use envview_core::SecretStoreError;
use envview_core::SecretValue;
use reqwest::Client;
use reqwest::StatusCode;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::credential::TokenCredential;
use crate::error::KeyVaultError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Key Vault REST API version used for every request.
pub const KEY_VAULT_API_VERSION: &str = "7.4";

/// OAuth2 scope for Key Vault data-plane access.
pub const KEY_VAULT_SCOPE: &str = "https://vault.azure.net/.default";

// ============================================================================
// SECTION: Options
// ============================================================================

/// Key Vault client options.
///
/// # Invariants
/// - `timeout` applies to each request's full lifecycle.
/// - `allow_http = false` rejects cleartext vault URIs.
/// - Enumeration fails once more than `max_pages` pages are returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyVaultOptions {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Allow `http://` vault URIs.
    pub allow_http: bool,
    /// Upper bound on list pages followed.
    pub max_pages: usize,
}

impl Default for KeyVaultOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            allow_http: false,
            max_pages: 1_000,
        }
    }
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// One page of the secret listing.
#[derive(Debug, Deserialize)]
struct SecretListPage {
    /// Secret items on this page.
    #[serde(default)]
    value: Vec<SecretItem>,
    /// Absolute URL of the next page, if any.
    #[serde(rename = "nextLink")]
    next_link: Option<String>,
}

/// Secret listing entry.
#[derive(Debug, Deserialize)]
struct SecretItem {
    /// Secret identifier URL.
    id: String,
}

/// Secret read response.
#[derive(Deserialize)]
struct SecretBundle {
    /// Current secret value.
    value: Option<String>,
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Key Vault-backed secret store.
pub struct KeyVaultClient {
    /// Vault base URL.
    vault_url: Url,
    /// Token source for bearer auth.
    credential: Arc<dyn TokenCredential>,
    /// HTTP client configured with timeouts and no redirects.
    client: Client,
    /// Client options.
    options: KeyVaultOptions,
}

impl KeyVaultClient {
    /// Builds a client for the vault at `vault_uri`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyVaultError`] when the URI is invalid or the HTTP client
    /// cannot be built.
    pub fn new(
        vault_uri: &str,
        credential: Arc<dyn TokenCredential>,
        options: KeyVaultOptions,
    ) -> Result<Self, KeyVaultError> {
        let vault_url = validate_vault_uri(vault_uri, options.allow_http)?;
        let client = Client::builder()
            .timeout(options.timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|err| KeyVaultError::Client(err.to_string()))?;
        Ok(Self {
            vault_url,
            credential,
            client,
            options,
        })
    }

    /// Returns the vault base URL.
    #[must_use]
    pub const fn vault_url(&self) -> &Url {
        &self.vault_url
    }

    /// Builds `{vault}/secrets[/{name}]?api-version=...`.
    fn secrets_url(&self, name: Option<&str>) -> Result<Url, SecretStoreError> {
        let mut url = self.vault_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                SecretStoreError::InvalidResponse("vault url cannot be a base".to_string())
            })?;
            segments.pop_if_empty().push("secrets");
            if let Some(name) = name {
                segments.push(name);
            }
        }
        url.set_query(None);
        url.query_pairs_mut().append_pair("api-version", KEY_VAULT_API_VERSION);
        Ok(url)
    }

    /// Issues an authenticated GET and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, SecretStoreError> {
        let token = self.credential.get_token(KEY_VAULT_SCOPE).await?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|err| SecretStoreError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SecretStoreError::Status {
                status: status.as_u16(),
            });
        }
        response.json::<T>().await.map_err(|err| SecretStoreError::InvalidResponse(err.to_string()))
    }
}

#[async_trait]
impl SecretStore for KeyVaultClient {
    async fn list_secret_names(&self) -> Result<Vec<String>, SecretStoreError> {
        let mut names = Vec::new();
        let mut next = Some(self.secrets_url(None)?);
        let mut pages = 0usize;
        while let Some(url) = next.take() {
            pages += 1;
            if pages > self.options.max_pages {
                return Err(SecretStoreError::InvalidResponse(format!(
                    "secret listing exceeded {} pages",
                    self.options.max_pages
                )));
            }
            let page: SecretListPage = self.get_json(url).await?;
            for item in page.value {
                names.push(secret_name_from_id(&item.id)?);
            }
            next = page
                .next_link
                .filter(|link| !link.trim().is_empty())
                .map(|link| self.validate_next_link(&link))
                .transpose()?;
        }
        debug!(secret_count = names.len(), pages, "listed key vault secrets");
        Ok(names)
    }

    async fn get_secret_value(&self, name: &str) -> Result<SecretValue, SecretStoreError> {
        let url = self.secrets_url(Some(name))?;
        let bundle: SecretBundle = self.get_json(url).await.map_err(|err| match err {
            SecretStoreError::Status {
                status,
            } if status == StatusCode::NOT_FOUND.as_u16() => {
                SecretStoreError::NotFound(name.to_string())
            }
            other => other,
        })?;
        debug!(secret = name, "fetched key vault secret");
        bundle
            .value
            .map(SecretValue::new)
            .ok_or_else(|| SecretStoreError::InvalidResponse(format!("secret {name} has no value")))
    }
}

impl KeyVaultClient {
    /// Parses a `nextLink` and requires it to stay on the vault origin.
    fn validate_next_link(&self, link: &str) -> Result<Url, SecretStoreError> {
        let url = Url::parse(link)
            .map_err(|err| SecretStoreError::InvalidResponse(format!("invalid nextLink: {err}")))?;
        if url.origin() != self.vault_url.origin() {
            return Err(SecretStoreError::InvalidResponse(
                "nextLink points outside the vault".to_string(),
            ));
        }
        Ok(url)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates a vault URI and normalizes it to a base URL.
fn validate_vault_uri(raw: &str, allow_http: bool) -> Result<Url, KeyVaultError> {
    let url = Url::parse(raw.trim()).map_err(|err| KeyVaultError::InvalidUri(err.to_string()))?;
    match url.scheme() {
        "https" => {}
        "http" if allow_http => {}
        other => return Err(KeyVaultError::InvalidUri(format!("unsupported scheme: {other}"))),
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(KeyVaultError::InvalidUri("vault uri must include a host".to_string()));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(KeyVaultError::InvalidUri("vault uri must not embed credentials".to_string()));
    }
    Ok(url)
}

/// Extracts the secret name from a secret identifier URL.
fn secret_name_from_id(id: &str) -> Result<String, SecretStoreError> {
    id.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && !name.contains(':'))
        .map(str::to_string)
        .ok_or_else(|| SecretStoreError::InvalidResponse(format!("invalid secret id: {id}")))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
