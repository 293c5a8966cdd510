// crates/envview-server/src/server.rs
// ============================================================================
// Module: HTTP Server
// Description: Router, handlers, and serving loop for envview.
// Purpose: Expose the health probe and the environment page over HTTP.
// Dependencies: axum, envview-core, envview-keyvault, tokio, tracing
// ============================================================================

//! ## Overview
//! [`AppState`] is built once at startup and shared through axum `State`.
//! `GET /health` answers without touching configuration; `GET /` re-reads
//! feature flags and secrets on every request, aggregates them with the
//! environment snapshot, and renders HTML. Secret fetch failures are logged
//! and collapse to an empty secret set in [`load_secrets`]; clients never see
//! an error response.
//! Security posture: only secret names reach the page; values stay inside
//! redacting wrappers and are dropped after the request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::extract::MatchedPath;
use axum::extract::Request;
use axum::extract::State;
use axum::middleware;
use axum::middleware::Next;
use axum::response::Html;
use axum::response::Response;
use axum::routing::get;
use envview_config::ConfigError;
use envview_config::EnvviewConfig;
use envview_config::EnvviewEnv;
use envview_core::EnvironmentSource;
use envview_core::SecretMap;
use envview_core::SecretStore;
use envview_core::aggregate;
use envview_core::fetch_secrets;
use envview_core::parse_feature_flags;
use envview_keyvault::DefaultCredential;
use envview_keyvault::KeyVaultClient;
use envview_keyvault::KeyVaultOptions;
use serde::Serialize;
use tokio::signal;
use tracing::debug;
use tracing::error;
use tracing::info;

use crate::logging::LoggingError;
use crate::render::render_index;
use crate::telemetry::RequestMetricEvent;
use crate::telemetry::RequestMetrics;

// ============================================================================
// SECTION: State
// ============================================================================

/// Shared, immutable per-process state.
pub struct AppState {
    /// Environment variable source.
    env: Arc<dyn EnvironmentSource>,
    /// Secret store, absent when disabled.
    secret_store: Option<Arc<dyn SecretStore>>,
    /// Request metrics sink.
    metrics: Arc<dyn RequestMetrics>,
}

impl AppState {
    /// Assembles application state.
    #[must_use]
    pub fn new(
        env: Arc<dyn EnvironmentSource>,
        secret_store: Option<Arc<dyn SecretStore>>,
        metrics: Arc<dyn RequestMetrics>,
    ) -> Self {
        Self {
            env,
            secret_store,
            metrics,
        }
    }

    /// Returns true when a secret store is configured.
    #[must_use]
    pub const fn secrets_enabled(&self) -> bool {
        self.secret_store.is_some()
    }
}

// ============================================================================
// SECTION: Secret Store Wiring
// ============================================================================

/// Builds the Key Vault secret store when a vault URI is configured.
///
/// Credential or client construction failures are logged at `error` and
/// leave secret fetching disabled for the process lifetime.
#[must_use]
pub fn build_secret_store(
    config: &EnvviewConfig,
    env: &dyn EnvironmentSource,
) -> Option<Arc<dyn SecretStore>> {
    let vault_uri = config.key_vault_uri.as_deref()?;
    let options = KeyVaultOptions::default();
    let credential = match DefaultCredential::from_env(env, options.timeout) {
        Ok(credential) => credential,
        Err(err) => {
            error!(error = %err, "failed to initialize key vault credential");
            return None;
        }
    };
    let credential_kind = credential.kind();
    match KeyVaultClient::new(vault_uri, Arc::new(credential), options) {
        Ok(client) => {
            info!(
                vault = %client.vault_url(),
                credential = credential_kind,
                "key vault client initialized"
            );
            Some(Arc::new(client))
        }
        Err(err) => {
            error!(error = %err, "failed to initialize key vault client");
            None
        }
    }
}

/// Fetches secrets, collapsing any failure to an empty map.
pub async fn load_secrets(store: Option<&dyn SecretStore>) -> SecretMap {
    match fetch_secrets(store).await {
        Ok(secrets) => secrets,
        Err(err) => {
            error!(error = %err, "failed to retrieve secrets from key vault");
            SecretMap::new()
        }
    }
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Health probe response body.
#[derive(Debug, Serialize)]
struct HealthResponse {
    /// Always `healthy`.
    status: &'static str,
}

/// Builds the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(index))
        .layer(middleware::from_fn_with_state(Arc::clone(&state), record_metrics))
        .with_state(state)
}

/// Handles `GET /health`.
async fn health() -> Json<HealthResponse> {
    debug!("health check endpoint called");
    Json(HealthResponse {
        status: "healthy",
    })
}

/// Handles `GET /`.
async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    debug!("environment page requested");
    let flags = parse_feature_flags(state.env.get(EnvviewEnv::FeatureFlags.as_str()).as_deref());
    let secrets = load_secrets(state.secret_store.as_deref()).await;
    let view = aggregate(state.env.snapshot(), &flags, &secrets);
    Html(render_index(&view, &flags))
}

/// Records one metric event per request.
async fn record_metrics(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path().to_string(), |path| path.as_str().to_string());
    let started = Instant::now();
    let response = next.run(request).await;
    state.metrics.record_request(&RequestMetricEvent {
        method,
        route,
        status: response.status().as_u16(),
        latency: started.elapsed(),
    });
    response
}

// ============================================================================
// SECTION: Serving
// ============================================================================

/// Serves the router on `bind` until `shutdown` resolves.
///
/// # Errors
///
/// Returns [`ServerError::Transport`] when binding or serving fails.
pub async fn serve<F>(bind: SocketAddr, state: Arc<AppState>, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|err| ServerError::Transport(format!("bind {bind} failed: {err}")))?;
    info!(bind = %bind, "listening");
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|err| ServerError::Transport(format!("http server failed: {err}")))?;
    info!("shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C"),
        () = terminate => info!("received SIGTERM"),
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server startup and runtime errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// Logging setup errors.
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
