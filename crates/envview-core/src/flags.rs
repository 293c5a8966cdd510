// crates/envview-core/src/flags.rs
// ============================================================================
// Module: Feature Flags
// Description: Parsing for comma-delimited feature flag strings.
// Purpose: Turn one configuration value into an ordered list of flag names.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Feature flags arrive as a single delimited string. Parsing splits on
//! [`FLAG_DELIMITER`], trims each piece, and drops empties. Malformed input
//! degrades to fewer flags and never fails. Order follows the source and
//! duplicates are kept.

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Delimiter separating flags in the raw configuration value.
pub const FLAG_DELIMITER: char = ',';

/// Separator used when joining parsed flags for display.
pub const FLAG_JOIN_SEPARATOR: &str = ", ";

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses a raw feature flag string into trimmed, non-empty flag names.
#[must_use]
pub fn parse_feature_flags(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    raw.split(FLAG_DELIMITER)
        .map(str::trim)
        .filter(|flag| !flag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Joins parsed flags into a single display string.
///
/// An empty list yields an empty string.
#[must_use]
pub fn join_feature_flags(flags: &[String]) -> String {
    flags.join(FLAG_JOIN_SEPARATOR)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
