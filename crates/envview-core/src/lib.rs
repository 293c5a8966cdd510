// crates/envview-core/src/lib.rs
// ============================================================================
// Module: envview Core Library
// Description: Public API surface for the envview core.
// Purpose: Expose flag parsing, secret fetching, and view aggregation.
// Dependencies: crate::{aggregate, environment, flags, secrets}
// ============================================================================

//! ## Overview
//! envview core turns ambient configuration state into a deterministic,
//! display-ready view. It reads an environment snapshot, parses feature flags,
//! fetches secret names from an optional secret store, and merges the three
//! sources into a sorted mapping with secret values masked. The core performs
//! no HTTP serving or rendering; those live in `envview-server`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod aggregate;
pub mod environment;
pub mod flags;
pub mod secrets;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use aggregate::AggregatedView;
pub use aggregate::PARSED_FEATURE_FLAGS_KEY;
pub use aggregate::SECRET_KEY_PREFIX;
pub use aggregate::SECRET_MASK;
pub use aggregate::aggregate;
pub use environment::EnvironmentSource;
pub use environment::ProcessEnvironment;
pub use environment::StaticEnvironment;
pub use flags::FLAG_DELIMITER;
pub use flags::FLAG_JOIN_SEPARATOR;
pub use flags::join_feature_flags;
pub use flags::parse_feature_flags;
pub use secrets::InMemorySecretStore;
pub use secrets::SecretFetchError;
pub use secrets::SecretMap;
pub use secrets::SecretStore;
pub use secrets::SecretStoreError;
pub use secrets::SecretValue;
pub use secrets::fetch_secrets;
