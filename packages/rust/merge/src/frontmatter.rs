//! Leading frontmatter detection and removal.
//!
//! A frontmatter block opens with a line of exactly `---` at the very start
//! of the document and ends at the next line of exactly `---`. Without an
//! opening delimiter at position 0, or without a closing one, the whole
//! document is body.

use std::sync::LazyLock;

use regex::Regex;

/// Matches a complete leading frontmatter block, closing delimiter included.
static FRONTMATTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A---\r?\n(?:.*?\r?\n)?---(?:\r?\n|\z)").expect("frontmatter regex")
});

/// Return the document with its leading frontmatter block removed.
pub fn strip_frontmatter(content: &str) -> &str {
    match FRONTMATTER_RE.find(content) {
        Some(m) => &content[m.end()..],
        None => content,
    }
}

/// Body of a template as it appears in the merged document: frontmatter
/// removed, leading and trailing whitespace trimmed.
pub fn normalize_body(content: &str) -> &str {
    strip_frontmatter(content).trim()
}
