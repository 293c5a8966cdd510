// crates/envview-core/src/aggregate.rs
// ============================================================================
// Module: Variable Aggregation
// Description: Merge of environment, flags, and masked secret names.
// Purpose: Produce the sorted mapping handed to rendering.
// Dependencies: crate::{flags, secrets}
// ============================================================================

//! ## Overview
//! [`aggregate`] merges three sources in fixed precedence: the environment
//! snapshot, one synthetic key holding the joined feature flags, then one
//! prefixed key per secret name. Later sources overwrite earlier ones on key
//! collision. Secret values never enter the view; every secret row carries
//! [`SECRET_MASK`]. Keys are kept in lexicographic order so repeated renders
//! of unchanged configuration are identical.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::btree_map;

use crate::flags::join_feature_flags;
use crate::secrets::SecretMap;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Synthetic key holding the joined feature flag list.
pub const PARSED_FEATURE_FLAGS_KEY: &str = "PARSED_FEATURE_FLAGS";

/// Prefix applied to every secret name in the view.
pub const SECRET_KEY_PREFIX: &str = "KV_";

/// Fixed placeholder displayed in place of every secret value.
pub const SECRET_MASK: &str = "********";

// ============================================================================
// SECTION: Aggregated View
// ============================================================================

/// Sorted, merged configuration mapping ready for display.
///
/// # Invariants
/// - Keys are unique and iterate in ascending lexicographic order.
/// - Secret-derived entries always hold [`SECRET_MASK`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedView {
    /// Merged entries.
    entries: BTreeMap<String, String>,
}

impl AggregatedView {
    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the view has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.entries.iter()
    }

    /// Consumes the view and returns the underlying sorted map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a AggregatedView {
    type IntoIter = btree_map::Iter<'a, String, String>;
    type Item = (&'a String, &'a String);

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ============================================================================
// SECTION: Aggregation
// ============================================================================

/// Merges the environment snapshot, feature flags, and masked secret names.
///
/// Precedence on key collision is environment, then flags, then secrets.
#[must_use]
pub fn aggregate(
    snapshot: BTreeMap<String, String>,
    flags: &[String],
    secrets: &SecretMap,
) -> AggregatedView {
    let mut entries = snapshot;
    entries.insert(PARSED_FEATURE_FLAGS_KEY.to_string(), join_feature_flags(flags));
    for name in secrets.keys() {
        entries.insert(format!("{SECRET_KEY_PREFIX}{name}"), SECRET_MASK.to_string());
    }
    AggregatedView {
        entries,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::PARSED_FEATURE_FLAGS_KEY;
    use super::SECRET_MASK;
    use super::aggregate;
    use crate::secrets::SecretMap;
    use crate::secrets::SecretValue;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    fn secrets(pairs: &[(&str, &str)]) -> SecretMap {
        pairs.iter().map(|(k, v)| ((*k).to_string(), SecretValue::new(*v))).collect()
    }

    #[test]
    fn merges_all_three_sources() {
        let view = aggregate(map(&[("A", "1")]), &["x".to_string()], &secrets(&[("A", "s")]));
        let expected = map(&[("A", "1"), ("KV_A", SECRET_MASK), ("PARSED_FEATURE_FLAGS", "x")]);
        assert_eq!(view.into_inner(), expected);
    }

    #[test]
    fn empty_flags_still_produce_the_synthetic_key() {
        let view = aggregate(BTreeMap::new(), &[], &SecretMap::new());
        assert_eq!(view.len(), 1);
        assert_eq!(view.get(PARSED_FEATURE_FLAGS_KEY), Some(""));
    }

    #[test]
    fn flags_override_environment_and_secrets_override_flags() {
        let snapshot = map(&[("PARSED_FEATURE_FLAGS", "raw"), ("KV_token", "plain")]);
        let flags = vec!["a".to_string(), "b".to_string()];
        let view = aggregate(snapshot, &flags, &secrets(&[("token", "real")]));
        assert_eq!(view.get(PARSED_FEATURE_FLAGS_KEY), Some("a, b"));
        assert_eq!(view.get("KV_token"), Some(SECRET_MASK));
    }

    #[test]
    fn secret_values_never_reach_the_view() {
        let view = aggregate(
            BTreeMap::new(),
            &[],
            &secrets(&[("short", "x"), ("long", "a-much-longer-secret-value")]),
        );
        for (key, value) in &view {
            assert_ne!(value, "x", "{key} leaked a secret");
            assert_ne!(value, "a-much-longer-secret-value", "{key} leaked a secret");
        }
        assert_eq!(view.get("KV_short"), Some(SECRET_MASK));
        assert_eq!(view.get("KV_long"), Some(SECRET_MASK));
    }

    #[test]
    fn keys_are_sorted_regardless_of_insertion_order() {
        let snapshot: BTreeMap<String, String> =
            [("zeta", "1"), ("Alpha", "2"), ("beta", "3"), ("_x", "4")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
        let view = aggregate(snapshot, &[], &secrets(&[("b", "1"), ("a", "2")]));
        let keys: Vec<&String> = view.iter().map(|(key, _)| key).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(keys.first().map(|key| key.as_str()), Some("Alpha"));
    }
}
