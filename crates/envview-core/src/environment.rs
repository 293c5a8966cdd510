// crates/envview-core/src/environment.rs
// ============================================================================
// Module: Environment Sources
// Description: Injectable key/value view over process configuration.
// Purpose: Decouple environment reads from the live process state.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Every read of ambient configuration goes through [`EnvironmentSource`].
//! The server uses [`ProcessEnvironment`]; tests inject a fixed
//! [`StaticEnvironment`] instead of mutating process state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::ffi::OsString;

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Read-only source of string-keyed configuration values.
///
/// # Invariants
/// - Implementations never cache; each call reflects current state.
/// - Only valid UTF-8 names and values are returned.
pub trait EnvironmentSource: Send + Sync {
    /// Returns every variable currently visible to the source.
    fn snapshot(&self) -> BTreeMap<String, String>;

    /// Returns a single variable, or `None` when absent or not UTF-8.
    fn get(&self, key: &str) -> Option<String>;
}

// ============================================================================
// SECTION: Process Environment
// ============================================================================

/// Environment source backed by the live process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl EnvironmentSource for ProcessEnvironment {
    fn snapshot(&self) -> BTreeMap<String, String> {
        utf8_entries(std::env::vars_os())
    }

    fn get(&self, key: &str) -> Option<String> {
        std::env::var_os(key).and_then(|raw| raw.into_string().ok())
    }
}

/// Keeps entries whose name and value are both valid UTF-8.
fn utf8_entries(vars: impl Iterator<Item = (OsString, OsString)>) -> BTreeMap<String, String> {
    vars.filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

// ============================================================================
// SECTION: Static Environment
// ============================================================================

/// Environment source serving a fixed mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticEnvironment {
    /// Fixed variables returned by every read.
    vars: BTreeMap<String, String>,
}

impl StaticEnvironment {
    /// Creates a static source from an existing mapping.
    #[must_use]
    pub const fn new(vars: BTreeMap<String, String>) -> Self {
        Self {
            vars,
        }
    }

    /// Returns the source with one additional variable.
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl<K, V> FromIterator<(K, V)> for StaticEnvironment
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
    }
}

impl EnvironmentSource for StaticEnvironment {
    fn snapshot(&self) -> BTreeMap<String, String> {
        self.vars.clone()
    }

    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::EnvironmentSource;
    use super::ProcessEnvironment;
    use super::StaticEnvironment;
    use super::utf8_entries;

    #[test]
    fn static_environment_serves_fixed_vars() {
        let env: StaticEnvironment = [("A", "1"), ("B", "2")].into_iter().collect();
        let env = env.with_var("C", "3");
        assert_eq!(env.get("B").as_deref(), Some("2"));
        assert_eq!(env.get("missing"), None);
        let keys: Vec<String> = env.snapshot().into_keys().collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
    }

    #[test]
    fn process_environment_snapshot_matches_single_reads() {
        let env = ProcessEnvironment;
        let snapshot = env.snapshot();
        for (key, value) in &snapshot {
            assert_eq!(env.get(key).as_ref(), Some(value));
        }
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_entries_are_skipped() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let vars = [
            (OsString::from("KEEP"), OsString::from("yes")),
            (OsString::from_vec(vec![0xff]), OsString::from("bad-name")),
            (OsString::from("BAD_VALUE"), OsString::from_vec(vec![0x66, 0xff])),
        ];
        let snapshot = utf8_entries(vars.into_iter());
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("KEEP").map(String::as_str), Some("yes"));
    }
}
