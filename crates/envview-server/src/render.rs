// crates/envview-server/src/render.rs
// ============================================================================
// Module: Page Rendering
// Description: HTML rendering for the environment page.
// Purpose: Turn an aggregated view and flag list into an HTML document.
// Dependencies: envview-core
// ============================================================================

//! ## Overview
//! [`render_index`] is a pure function: the same view and flags always yield
//! the same document. Every interpolated string passes through
//! [`escape_html`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use envview_core::AggregatedView;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Document title and page heading.
pub const PAGE_TITLE: &str = "Environment Variables";

/// Shown in the flag section when no flags are set.
pub const NO_FLAGS_NOTICE: &str = "No feature flags enabled.";

/// Document head and opening body markup.
const PAGE_HEAD: &str = "<!doctype html>\n<html lang=\"en\">\n<head>\n  <meta \
                         charset=\"utf-8\"/>\n  <meta name=\"viewport\" \
                         content=\"width=device-width, initial-scale=1\"/>\n  <title>Environment \
                         Variables</title>\n  <style>\n    body { font-family: sans-serif; margin: \
                         2rem; }\n    table { border-collapse: collapse; width: 100%; }\n    th, \
                         td { border: 1px solid #ccc; padding: 0.4rem; text-align: left; \
                         vertical-align: top; }\n    td { font-family: monospace; word-break: \
                         break-all; }\n  </style>\n</head>\n<body>\n";

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders the environment page.
#[must_use]
pub fn render_index(view: &AggregatedView, flags: &[String]) -> String {
    let mut page = String::with_capacity(PAGE_HEAD.len() + view.len() * 64);
    page.push_str(PAGE_HEAD);
    page.push_str("  <h1>");
    page.push_str(&escape_html(PAGE_TITLE));
    page.push_str("</h1>\n  <section id=\"feature-flags\">\n    <h2>Feature Flags</h2>\n");
    if flags.is_empty() {
        page.push_str("    <p>");
        page.push_str(NO_FLAGS_NOTICE);
        page.push_str("</p>\n");
    } else {
        page.push_str("    <ul>\n");
        for flag in flags {
            page.push_str("      <li>");
            page.push_str(&escape_html(flag));
            page.push_str("</li>\n");
        }
        page.push_str("    </ul>\n");
    }
    page.push_str(
        "  </section>\n  <section id=\"variables\">\n    <table>\n      \
         <thead><tr><th>Name</th><th>Value</th></tr></thead>\n      <tbody>\n",
    );
    for (name, value) in view {
        page.push_str("        <tr><td>");
        page.push_str(&escape_html(name));
        page.push_str("</td><td>");
        page.push_str(&escape_html(value));
        page.push_str("</td></tr>\n");
    }
    page.push_str("      </tbody>\n    </table>\n  </section>\n</body>\n</html>\n");
    page
}

/// Escapes `& < > " '` for HTML text and attribute contexts.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use envview_core::SecretMap;
    use envview_core::aggregate;

    use super::NO_FLAGS_NOTICE;
    use super::escape_html;
    use super::render_index;

    /// Builds a view with no secrets.
    fn view(pairs: &[(&str, &str)], flags: &[String]) -> envview_core::AggregatedView {
        let snapshot: BTreeMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        aggregate(snapshot, flags, &SecretMap::new())
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn renders_rows_in_view_order() {
        let page = render_index(&view(&[("B", "2"), ("A", "1")], &[]), &[]);
        let a = page.find("<td>A</td>").unwrap_or(usize::MAX);
        let b = page.find("<td>B</td>").unwrap_or(0);
        assert!(a < b);
        assert!(page.contains("<title>Environment Variables</title>"));
        assert!(page.contains(NO_FLAGS_NOTICE));
    }

    #[test]
    fn lists_flags_when_present() {
        let flags = vec!["beta".to_string(), "<x>".to_string()];
        let page = render_index(&view(&[], &flags), &flags);
        assert!(page.contains("<li>beta</li>"));
        assert!(page.contains("<li>&lt;x&gt;</li>"));
        assert!(!page.contains(NO_FLAGS_NOTICE));
    }

    #[test]
    fn escapes_values_in_table() {
        let page = render_index(&view(&[("EVIL", "<script>alert(1)</script>")], &[]), &[]);
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
    }
}
