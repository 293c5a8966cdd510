// crates/envview-server/src/server/tests.rs
// ============================================================================
// Module: Server Unit Tests
// Description: Unit tests for state wiring, secret collapse, and metrics.
// Purpose: Validate server module behavior with in-memory fixtures.
// Dependencies: envview-server, envview-core, tower
// ============================================================================

//! ## Overview
//! Exercises the server module with static environments and in-memory
//! secret stores; no network access is needed.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use axum::body::Body;
use axum::http::Request;
use axum::http::StatusCode;
use envview_config::EnvviewConfig;
use envview_core::InMemorySecretStore;
use envview_core::SecretStoreError;
use envview_core::StaticEnvironment;
use tower::ServiceExt;

use super::AppState;
use super::build_router;
use super::build_secret_store;
use super::load_secrets;
use crate::telemetry::NoopMetrics;
use crate::telemetry::RequestMetricEvent;
use crate::telemetry::RequestMetrics;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Metrics sink that keeps every event.
#[derive(Default)]
struct RecordingMetrics {
    /// Recorded events in arrival order.
    events: Mutex<Vec<RequestMetricEvent>>,
}

impl RequestMetrics for RecordingMetrics {
    fn record_request(&self, event: &RequestMetricEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Loads configuration from a static environment.
fn config_from(env: &StaticEnvironment) -> EnvviewConfig {
    EnvviewConfig::from_env(env).unwrap()
}

// ============================================================================
// SECTION: Secret Collapse
// ============================================================================

#[tokio::test]
async fn load_secrets_returns_values_on_success() {
    let store = InMemorySecretStore::new().with_secret("db", "pw");
    let secrets = load_secrets(Some(&store)).await;
    assert_eq!(secrets["db"].expose(), "pw");
}

#[tokio::test]
async fn load_secrets_collapses_failures_to_empty() {
    let store = InMemorySecretStore::new().with_secret("db", "pw").with_failing_secret("broken");
    assert!(load_secrets(Some(&store)).await.is_empty());

    let store = InMemorySecretStore::new()
        .with_list_error(SecretStoreError::Auth("denied".to_string()));
    assert!(load_secrets(Some(&store)).await.is_empty());
}

#[tokio::test]
async fn load_secrets_without_store_is_empty() {
    assert!(load_secrets(None).await.is_empty());
}

// ============================================================================
// SECTION: Secret Store Wiring
// ============================================================================

#[test]
fn no_vault_uri_disables_store() {
    let env = StaticEnvironment::default().with_var("AZURE_ACCESS_TOKEN", "t");
    assert!(build_secret_store(&config_from(&env), &env).is_none());
}

#[test]
fn valid_vault_uri_with_credential_enables_store() {
    let env = StaticEnvironment::default()
        .with_var("AZURE_KEY_VAULT_URI", "https://demo.vault.azure.net/")
        .with_var("AZURE_ACCESS_TOKEN", "t");
    assert!(build_secret_store(&config_from(&env), &env).is_some());
}

#[test]
fn invalid_vault_uri_disables_store() {
    let env = StaticEnvironment::default()
        .with_var("AZURE_KEY_VAULT_URI", "ftp://demo.vault.azure.net/")
        .with_var("AZURE_ACCESS_TOKEN", "t");
    assert!(build_secret_store(&config_from(&env), &env).is_none());
}

#[test]
fn incomplete_credential_disables_store() {
    let env = StaticEnvironment::default()
        .with_var("AZURE_KEY_VAULT_URI", "https://demo.vault.azure.net/")
        .with_var("AZURE_CLIENT_SECRET", "orphan");
    assert!(build_secret_store(&config_from(&env), &env).is_none());
}

// ============================================================================
// SECTION: Metrics Middleware
// ============================================================================

#[tokio::test]
async fn middleware_records_each_request() {
    let metrics = Arc::new(RecordingMetrics::default());
    let state = Arc::new(AppState::new(
        Arc::new(StaticEnvironment::default()),
        None,
        Arc::clone(&metrics) as Arc<dyn RequestMetrics>,
    ));
    let router = build_router(state);

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = router
        .oneshot(Request::builder().uri("/missing").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let events = metrics.events.lock().unwrap().clone();
    let health = events.iter().find(|event| event.route == "/health").unwrap();
    assert_eq!(health.method, "GET");
    assert_eq!(health.status, 200);
}

#[test]
fn state_reports_secret_store_presence() {
    let env = Arc::new(StaticEnvironment::default());
    let disabled = AppState::new(env.clone(), None, Arc::new(NoopMetrics));
    assert!(!disabled.secrets_enabled());
    let enabled =
        AppState::new(env, Some(Arc::new(InMemorySecretStore::new())), Arc::new(NoopMetrics));
    assert!(enabled.secrets_enabled());
}
