// crates/envview-core/src/flags/tests.rs
// ============================================================================
// Module: Feature Flag Unit Tests
// Description: Unit coverage for feature flag parsing and joining.
// Purpose: Pin trimming, filtering, and ordering behavior.
// Dependencies: envview-core
// ============================================================================

//! ## Overview
//! Unit coverage for feature flag parsing and joining.

use super::join_feature_flags;
use super::parse_feature_flags;

#[test]
fn absent_or_empty_input_yields_no_flags() {
    assert!(parse_feature_flags(None).is_empty());
    assert!(parse_feature_flags(Some("")).is_empty());
    assert!(parse_feature_flags(Some("  ,  , ")).is_empty());
}

#[test]
fn pieces_are_trimmed_and_empties_dropped() {
    assert_eq!(parse_feature_flags(Some("a, b ,,c")), vec!["a", "b", "c"]);
}

#[test]
fn trailing_delimiter_adds_no_entry() {
    assert_eq!(parse_feature_flags(Some("beta,dark-mode,")), vec!["beta", "dark-mode"]);
}

#[test]
fn order_and_duplicates_are_preserved() {
    assert_eq!(parse_feature_flags(Some("z, a, z")), vec!["z", "a", "z"]);
}

#[test]
fn inner_whitespace_is_kept() {
    assert_eq!(parse_feature_flags(Some(" new checkout ,x")), vec!["new checkout", "x"]);
}

#[test]
fn join_uses_comma_space_and_empty_list_is_empty_string() {
    assert_eq!(join_feature_flags(&[]), "");
    let flags = vec!["a".to_string(), "b".to_string()];
    assert_eq!(join_feature_flags(&flags), "a, b");
}
