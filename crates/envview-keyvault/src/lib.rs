// crates/envview-keyvault/src/lib.rs
// ============================================================================
// Module: envview Key Vault Library
// Description: Azure Key Vault secret store for envview.
// Purpose: Provide a SecretStore backed by the Key Vault REST API.
// Dependencies: envview-core, reqwest, serde, url
// ============================================================================

//! ## Overview
//! [`KeyVaultClient`] implements [`envview_core::SecretStore`] over the Azure
//! Key Vault REST API. Requests are authenticated with bearer tokens from a
//! [`TokenCredential`]; [`DefaultCredential`] picks a credential from the
//! environment the way Azure-hosted workloads expect.
//! Security posture: secret values and tokens are never logged and are
//! wrapped in redacting types.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod credential;
pub mod error;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::KEY_VAULT_API_VERSION;
pub use client::KEY_VAULT_SCOPE;
pub use client::KeyVaultClient;
pub use client::KeyVaultOptions;
pub use credential::AccessToken;
pub use credential::ClientSecretCredential;
pub use credential::DefaultCredential;
pub use credential::IMDS_CONNECT_TIMEOUT;
pub use credential::ManagedIdentityCredential;
pub use credential::StaticTokenCredential;
pub use credential::TokenCredential;
pub use error::CredentialError;
pub use error::KeyVaultError;
