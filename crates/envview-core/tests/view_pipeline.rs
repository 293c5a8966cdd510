// crates/envview-core/tests/view_pipeline.rs
// ============================================================================
// Module: View Pipeline Tests
// Description: End-to-end coverage of parse, fetch, and aggregate.
// Purpose: Ensure the core produces the documented view from raw inputs.
// Dependencies: envview-core, tokio
// ============================================================================
//! ## Overview
//! Drives the public core API the way a request handler does: read the
//! environment, parse flags, fetch secrets, aggregate.
//!
//! Security posture: secret values must never appear in the aggregated view.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use envview_core::EnvironmentSource;
use envview_core::InMemorySecretStore;
use envview_core::SECRET_MASK;
use envview_core::SecretMap;
use envview_core::SecretStore;
use envview_core::StaticEnvironment;
use envview_core::aggregate;
use envview_core::fetch_secrets;
use envview_core::parse_feature_flags;

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Verifies the documented merge example end to end.
#[tokio::test]
async fn pipeline_builds_masked_sorted_view() {
    let env = StaticEnvironment::default()
        .with_var("A", "1")
        .with_var("FEATURE_FLAGS", "x, ,y,");
    let store = InMemorySecretStore::new().with_secret("A", "s");

    let flags = parse_feature_flags(env.get("FEATURE_FLAGS").as_deref());
    let secrets = fetch_secrets(Some(&store)).await.expect("fetch succeeds");
    let view = aggregate(env.snapshot(), &flags, &secrets);

    let rows: Vec<(&str, &str)> = view.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    assert_eq!(
        rows,
        vec![
            ("A", "1"),
            ("FEATURE_FLAGS", "x, ,y,"),
            ("KV_A", SECRET_MASK),
            ("PARSED_FEATURE_FLAGS", "x, y"),
        ]
    );
}

/// Verifies a failed fetch collapsed to empty leaves no secret rows.
#[tokio::test]
async fn collapsed_failure_drops_secret_rows() {
    let env = StaticEnvironment::default().with_var("HOME", "/root");
    let store = InMemorySecretStore::new().with_secret("ok", "1").with_failing_secret("broken");
    let handle: Option<&dyn SecretStore> = Some(&store);

    let secrets = fetch_secrets(handle).await.unwrap_or_else(|_| SecretMap::new());
    let view = aggregate(env.snapshot(), &[], &secrets);

    assert!(view.iter().all(|(key, _)| !key.starts_with("KV_")));
    assert_eq!(view.get("HOME"), Some("/root"));
}

/// Verifies repeated aggregation of unchanged inputs is identical.
#[tokio::test]
async fn repeated_views_are_identical() {
    let env: StaticEnvironment = [("B", "2"), ("A", "1")].into_iter().collect();
    let store = InMemorySecretStore::new().with_secret("s1", "v1").with_secret("s0", "v0");
    let first = aggregate(env.snapshot(), &[], &fetch_secrets(Some(&store)).await.unwrap());
    let second = aggregate(env.snapshot(), &[], &fetch_secrets(Some(&store)).await.unwrap());
    assert_eq!(first, second);
}
