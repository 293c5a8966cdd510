// crates/envview-server/src/telemetry.rs
// ============================================================================
// Module: Request Telemetry
// Description: Request metric events and sinks.
// Purpose: Record method, route, status, and latency for every request.
// Dependencies: tracing, thiserror
// ============================================================================

//! ## Overview
//! [`RequestMetrics`] is a thin sink that the HTTP middleware calls once per
//! request. [`NoopMetrics`] discards events; [`TracingMetrics`] emits a
//! structured event on the `envview::telemetry` target. Telemetry is enabled
//! by a well-formed instrumentation key; a malformed key is logged and the
//! no-op sink is used instead.
//! Security posture: the instrumentation key is never logged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use tracing::error;
use tracing::info;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Tracing target for request telemetry events.
pub const TELEMETRY_TARGET: &str = "envview::telemetry";

/// Hyphen-separated group lengths of a GUID instrumentation key.
const KEY_GROUP_LENGTHS: [usize; 5] = [8, 4, 4, 4, 12];

// ============================================================================
// SECTION: Events
// ============================================================================

/// One completed HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMetricEvent {
    /// HTTP method.
    pub method: String,
    /// Matched route template, or the raw path when no route matched.
    pub route: String,
    /// Response status code.
    pub status: u16,
    /// Time spent producing the response.
    pub latency: Duration,
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Metrics sink for HTTP requests.
pub trait RequestMetrics: Send + Sync {
    /// Records a completed request.
    fn record_request(&self, event: &RequestMetricEvent);
}

/// No-op metrics sink.
pub struct NoopMetrics;

impl RequestMetrics for NoopMetrics {
    fn record_request(&self, _event: &RequestMetricEvent) {}
}

/// Metrics sink that emits one tracing event per request.
pub struct TracingMetrics;

impl RequestMetrics for TracingMetrics {
    fn record_request(&self, event: &RequestMetricEvent) {
        let latency_ms = u64::try_from(event.latency.as_millis()).unwrap_or(u64::MAX);
        info!(
            target: TELEMETRY_TARGET,
            method = %event.method,
            route = %event.route,
            status = event.status,
            latency_ms,
            "request completed"
        );
    }
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Checks that an instrumentation key is a GUID.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the key is blank or not a GUID.
pub fn validate_instrumentation_key(raw: &str) -> Result<(), TelemetryError> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(TelemetryError::EmptyKey);
    }
    let groups: Vec<&str> = key.split('-').collect();
    let well_formed = groups.len() == KEY_GROUP_LENGTHS.len()
        && groups.iter().zip(KEY_GROUP_LENGTHS).all(|(group, len)| {
            group.len() == len && group.chars().all(|ch| ch.is_ascii_hexdigit())
        });
    if well_formed { Ok(()) } else { Err(TelemetryError::MalformedKey) }
}

/// Telemetry configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TelemetryError {
    /// Key is present but blank.
    #[error("instrumentation key is empty")]
    EmptyKey,
    /// Key is not a GUID.
    #[error("instrumentation key is not a valid GUID")]
    MalformedKey,
}

/// Builds the metrics sink for an optional instrumentation key.
///
/// A missing key selects [`NoopMetrics`]. An invalid key is logged at `error`
/// and also selects [`NoopMetrics`].
#[must_use]
pub fn build_metrics(instrumentation_key: Option<&str>) -> Arc<dyn RequestMetrics> {
    let Some(raw) = instrumentation_key else {
        return Arc::new(NoopMetrics);
    };
    match validate_instrumentation_key(raw) {
        Ok(()) => {
            info!("request telemetry configured");
            Arc::new(TracingMetrics)
        }
        Err(err) => {
            error!(error = %err, "failed to configure request telemetry");
            Arc::new(NoopMetrics)
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
