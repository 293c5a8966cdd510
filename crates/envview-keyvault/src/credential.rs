// crates/envview-keyvault/src/credential.rs
// ============================================================================
// Module: Key Vault Credentials
// Description: Bearer token sources for Key Vault requests.
// Purpose: Acquire OAuth2 access tokens from static, client-secret, or
//          managed-identity sources.
// Dependencies: envview-core, reqwest, serde, url
// ============================================================================

//! ## Overview
//! [`TokenCredential`] yields an [`AccessToken`] for a scope. Three sources
//! are supported:
//! - [`StaticTokenCredential`]: a token supplied up front.
//! - [`ClientSecretCredential`]: the OAuth2 client-credentials flow against
//!   the Microsoft identity platform.
//! - [`ManagedIdentityCredential`]: the App Service identity endpoint or the
//!   instance metadata endpoint.
//!
//! [`DefaultCredential::from_env`] picks the first configured source in that
//! order. Tokens are acquired per call and never cached.
//! Security posture: tokens and client secrets use redacting wrappers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use envview_core::EnvironmentSource;
use envview_core::SecretValue;
use reqwest::Client;
use reqwest::Response;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use url::Url;
use url::form_urlencoded;

use crate::error::CredentialError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default Microsoft identity platform authority.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Instance metadata service token endpoint.
pub const IMDS_TOKEN_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";

/// API version for the instance metadata token endpoint.
const IMDS_API_VERSION: &str = "2018-02-01";

/// Connect timeout for the link-local metadata endpoint.
pub const IMDS_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// API version for the App Service identity endpoint.
const APP_SERVICE_API_VERSION: &str = "2019-08-01";

/// Suffix stripped from a scope to obtain a managed-identity resource.
const DEFAULT_SCOPE_SUFFIX: &str = "/.default";

// ============================================================================
// SECTION: Environment Keys
// ============================================================================

/// Environment keys consulted when selecting a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialEnv {
    /// Pre-acquired bearer token.
    AccessToken,
    /// Directory (tenant) identifier.
    TenantId,
    /// Application or user-assigned identity client identifier.
    ClientId,
    /// Application client secret.
    ClientSecret,
    /// Identity platform authority override.
    AuthorityHost,
    /// App Service managed identity endpoint.
    IdentityEndpoint,
    /// App Service managed identity header secret.
    IdentityHeader,
}

impl CredentialEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccessToken => "AZURE_ACCESS_TOKEN",
            Self::TenantId => "AZURE_TENANT_ID",
            Self::ClientId => "AZURE_CLIENT_ID",
            Self::ClientSecret => "AZURE_CLIENT_SECRET",
            Self::AuthorityHost => "AZURE_AUTHORITY_HOST",
            Self::IdentityEndpoint => "IDENTITY_ENDPOINT",
            Self::IdentityHeader => "IDENTITY_HEADER",
        }
    }
}

// ============================================================================
// SECTION: Access Token
// ============================================================================

/// Bearer token with redacted formatting.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw bearer token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Exposes the raw token for use in an `Authorization` header.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

// ============================================================================
// SECTION: Credential Interface
// ============================================================================

/// Source of bearer tokens.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Acquires a token for `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] when no token can be acquired.
    async fn get_token(&self, scope: &str) -> Result<AccessToken, CredentialError>;
}

/// Token endpoint response payload.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    /// Issued bearer token.
    access_token: String,
}

// ============================================================================
// SECTION: Static Token
// ============================================================================

/// Credential returning a fixed token.
#[derive(Debug, Clone)]
pub struct StaticTokenCredential {
    /// Token returned for every scope.
    token: AccessToken,
}

impl StaticTokenCredential {
    /// Creates a static credential.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Config`] when the token is blank.
    pub fn new(token: impl Into<String>) -> Result<Self, CredentialError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(CredentialError::Config("access token must not be empty".to_string()));
        }
        Ok(Self {
            token: AccessToken::new(token),
        })
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self, _scope: &str) -> Result<AccessToken, CredentialError> {
        Ok(self.token.clone())
    }
}

// ============================================================================
// SECTION: Client Secret
// ============================================================================

/// OAuth2 client-credentials flow credential.
#[derive(Debug, Clone)]
pub struct ClientSecretCredential {
    /// Tenant token endpoint.
    token_url: Url,
    /// Application client identifier.
    client_id: String,
    /// Application client secret.
    client_secret: SecretValue,
    /// HTTP client configured with timeouts.
    client: Client,
}

impl ClientSecretCredential {
    /// Creates a client-secret credential for a tenant.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Config`] when the authority or tenant is
    /// invalid or the HTTP client cannot be built.
    pub fn new(
        authority_host: &str,
        tenant_id: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CredentialError> {
        let tenant_id = tenant_id.trim();
        if tenant_id.is_empty()
            || !tenant_id.chars().all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '.'))
        {
            return Err(CredentialError::Config("invalid tenant id".to_string()));
        }
        let mut token_url = Url::parse(authority_host)
            .map_err(|err| CredentialError::Config(format!("invalid authority host: {err}")))?;
        token_url
            .path_segments_mut()
            .map_err(|()| CredentialError::Config("authority host cannot be a base".to_string()))?
            .pop_if_empty()
            .extend([tenant_id, "oauth2", "v2.0", "token"]);
        Ok(Self {
            token_url,
            client_id: client_id.into(),
            client_secret: SecretValue::new(client_secret),
            client: build_client(timeout)?,
        })
    }

    /// Returns the token endpoint this credential posts to.
    #[must_use]
    pub const fn token_url(&self) -> &Url {
        &self.token_url
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken, CredentialError> {
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "client_credentials")
            .append_pair("client_id", &self.client_id)
            .append_pair("client_secret", self.client_secret.expose())
            .append_pair("scope", scope)
            .finish();
        let response = self
            .client
            .post(self.token_url.clone())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|err| CredentialError::Request(err.to_string()))?;
        read_token(response).await
    }
}

// ============================================================================
// SECTION: Managed Identity
// ============================================================================

/// Managed identity token endpoint flavor.
#[derive(Debug, Clone)]
enum IdentityEndpoint {
    /// App Service style endpoint guarded by a header secret.
    AppService {
        /// Endpoint URL.
        url: Url,
        /// Value for the `X-IDENTITY-HEADER` header.
        header: SecretValue,
    },
    /// Instance metadata service endpoint.
    Imds {
        /// Endpoint URL.
        url: Url,
    },
}

/// Managed identity credential.
#[derive(Debug, Clone)]
pub struct ManagedIdentityCredential {
    /// Token endpoint.
    endpoint: IdentityEndpoint,
    /// Optional user-assigned identity client identifier.
    client_id: Option<String>,
    /// HTTP client configured with timeouts.
    client: Client,
}

impl ManagedIdentityCredential {
    /// Creates a credential for an App Service identity endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Config`] when the endpoint is invalid.
    pub fn app_service(
        endpoint: &str,
        identity_header: impl Into<String>,
        client_id: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CredentialError> {
        let url = Url::parse(endpoint)
            .map_err(|err| CredentialError::Config(format!("invalid identity endpoint: {err}")))?;
        Ok(Self {
            endpoint: IdentityEndpoint::AppService {
                url,
                header: SecretValue::new(identity_header),
            },
            client_id,
            client: build_client(timeout)?,
        })
    }

    /// Creates a credential for the standard instance metadata endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Config`] when the HTTP client cannot be built.
    pub fn imds(client_id: Option<String>, timeout: Duration) -> Result<Self, CredentialError> {
        Self::imds_at(IMDS_TOKEN_ENDPOINT, client_id, timeout)
    }

    /// Creates a credential for an instance metadata endpoint at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Config`] when the endpoint is invalid.
    pub fn imds_at(
        endpoint: &str,
        client_id: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CredentialError> {
        let url = Url::parse(endpoint)
            .map_err(|err| CredentialError::Config(format!("invalid imds endpoint: {err}")))?;
        Ok(Self {
            endpoint: IdentityEndpoint::Imds {
                url,
            },
            client_id,
            client: build_imds_client(timeout)?,
        })
    }

    /// Returns true when this credential targets an App Service endpoint.
    #[must_use]
    pub const fn is_app_service(&self) -> bool {
        matches!(self.endpoint, IdentityEndpoint::AppService { .. })
    }
}

#[async_trait]
impl TokenCredential for ManagedIdentityCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken, CredentialError> {
        let resource = scope.strip_suffix(DEFAULT_SCOPE_SUFFIX).unwrap_or(scope);
        let request = match &self.endpoint {
            IdentityEndpoint::AppService {
                url,
                header,
            } => {
                let url = token_query(url, APP_SERVICE_API_VERSION, resource, self.client_id.as_deref());
                self.client.get(url).header("X-IDENTITY-HEADER", header.expose())
            }
            IdentityEndpoint::Imds {
                url,
            } => {
                let url = token_query(url, IMDS_API_VERSION, resource, self.client_id.as_deref());
                self.client.get(url).header("Metadata", "true")
            }
        };
        let response =
            request.send().await.map_err(|err| CredentialError::Request(err.to_string()))?;
        read_token(response).await
    }
}

// ============================================================================
// SECTION: Default Credential
// ============================================================================

/// Credential selected from the environment.
#[derive(Debug, Clone)]
pub enum DefaultCredential {
    /// `AZURE_ACCESS_TOKEN` is set.
    Static(StaticTokenCredential),
    /// Tenant, client id, and client secret are set.
    ClientSecret(ClientSecretCredential),
    /// Fallback to the platform's managed identity.
    ManagedIdentity(ManagedIdentityCredential),
}

impl DefaultCredential {
    /// Selects a credential from environment variables.
    ///
    /// Order: static token, client secret, managed identity.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Config`] when a source is partially
    /// configured or its settings are invalid.
    pub fn from_env(
        env: &dyn EnvironmentSource,
        timeout: Duration,
    ) -> Result<Self, CredentialError> {
        let read = |key: CredentialEnv| {
            env.get(key.as_str()).map(|value| value.trim().to_string()).filter(|v| !v.is_empty())
        };

        if let Some(token) = read(CredentialEnv::AccessToken) {
            return StaticTokenCredential::new(token).map(Self::Static);
        }

        let tenant = read(CredentialEnv::TenantId);
        let client_id = read(CredentialEnv::ClientId);
        let secret = read(CredentialEnv::ClientSecret);
        match (tenant, client_id.clone(), secret) {
            (Some(tenant), Some(client_id), Some(secret)) => {
                let authority = read(CredentialEnv::AuthorityHost)
                    .unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string());
                return ClientSecretCredential::new(&authority, &tenant, client_id, secret, timeout)
                    .map(Self::ClientSecret);
            }
            (_, _, Some(_)) => {
                return Err(CredentialError::Config(format!(
                    "{} requires {} and {}",
                    CredentialEnv::ClientSecret.as_str(),
                    CredentialEnv::TenantId.as_str(),
                    CredentialEnv::ClientId.as_str()
                )));
            }
            _ => {}
        }

        match (read(CredentialEnv::IdentityEndpoint), read(CredentialEnv::IdentityHeader)) {
            (Some(endpoint), Some(header)) => {
                ManagedIdentityCredential::app_service(&endpoint, header, client_id, timeout)
                    .map(Self::ManagedIdentity)
            }
            (Some(_), None) => Err(CredentialError::Config(format!(
                "{} requires {}",
                CredentialEnv::IdentityEndpoint.as_str(),
                CredentialEnv::IdentityHeader.as_str()
            ))),
            (None, _) => ManagedIdentityCredential::imds(client_id, timeout).map(Self::ManagedIdentity),
        }
    }

    /// Returns a stable label for the selected source.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Static(_) => "static_token",
            Self::ClientSecret(_) => "client_secret",
            Self::ManagedIdentity(credential) if credential.is_app_service() => {
                "managed_identity_app_service"
            }
            Self::ManagedIdentity(_) => "managed_identity_imds",
        }
    }
}

#[async_trait]
impl TokenCredential for DefaultCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken, CredentialError> {
        match self {
            Self::Static(credential) => credential.get_token(scope).await,
            Self::ClientSecret(credential) => credential.get_token(scope).await,
            Self::ManagedIdentity(credential) => credential.get_token(scope).await,
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds an HTTP client with a whole-request timeout.
fn build_client(timeout: Duration) -> Result<Client, CredentialError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| CredentialError::Config(format!("http client: {err}")))
}

/// Builds an HTTP client for the metadata endpoint.
///
/// Off Azure the link-local address usually drops packets, so connecting
/// gives up after [`IMDS_CONNECT_TIMEOUT`].
fn build_imds_client(timeout: Duration) -> Result<Client, CredentialError> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(IMDS_CONNECT_TIMEOUT))
        .build()
        .map_err(|err| CredentialError::Config(format!("http client: {err}")))
}

/// Appends managed-identity query parameters to a token endpoint.
fn token_query(base: &Url, api_version: &str, resource: &str, client_id: Option<&str>) -> Url {
    let mut url = base.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("api-version", api_version).append_pair("resource", resource);
        if let Some(client_id) = client_id {
            pairs.append_pair("client_id", client_id);
        }
    }
    url
}

/// Decodes a token endpoint response.
async fn read_token(response: Response) -> Result<AccessToken, CredentialError> {
    let status = response.status();
    if !status.is_success() {
        return Err(CredentialError::Status(status.as_u16()));
    }
    let body: TokenResponse =
        response.json().await.map_err(|err| CredentialError::InvalidResponse(err.to_string()))?;
    if body.access_token.is_empty() {
        return Err(CredentialError::InvalidResponse("empty access token".to_string()));
    }
    Ok(AccessToken::new(body.access_token))
}
