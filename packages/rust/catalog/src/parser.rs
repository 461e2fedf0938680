//! Catalog directory-listing parser.
//!
//! The listing endpoint returns a JSON array of directory entries:
//! `[{ "name": "...", "download_url": "...", "size": 123, ... }]`.
//! Only files carrying the template suffix become [`Template`]s; everything
//! else (READMEs, sub-directories, other extensions) is ignored.

use std::cmp::Ordering;

use instructgen_shared::{InstructGenError, Result, Template};
use serde::Deserialize;
use tracing::debug;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One entry of the remote directory listing. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteEntry {
    /// File (or directory) name.
    pub name: String,
    /// Raw-content locator; `null` for directories.
    #[serde(default)]
    pub download_url: Option<String>,
    /// Byte count.
    #[serde(default)]
    pub size: u64,
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse a listing response body into sorted templates.
pub(crate) fn parse_listing(body: &str, suffix: &str) -> Result<Vec<Template>> {
    let entries: Vec<RemoteEntry> = serde_json::from_str(body).map_err(|e| {
        InstructGenError::catalog_fetch(format!("unexpected listing format: {e}"))
    })?;
    Ok(templates_from_entries(entries, suffix))
}

/// Keep the suffixed files, derive their names, then sort and de-duplicate.
pub fn templates_from_entries(entries: Vec<RemoteEntry>, suffix: &str) -> Vec<Template> {
    let total = entries.len();
    let templates: Vec<Template> = entries
        .into_iter()
        .filter_map(|entry| {
            let url = entry.download_url?;
            Template::from_file_name(&entry.name, suffix, url, entry.size)
        })
        .collect();

    debug!(total, matched = templates.len(), "filtered listing entries");
    sort_templates(templates)
}

/// Sort by name the way a root-locale collation does: character class
/// first (whitespace, punctuation, digits, letters), letters compared
/// case-insensitively, then lowercase before uppercase at the first case
/// difference. Entries with identical names collapse to the one that came
/// last in the listing.
pub fn sort_templates(mut templates: Vec<Template>) -> Vec<Template> {
    templates.sort_by(|a, b| compare_names(&a.name, &b.name));

    let mut out: Vec<Template> = Vec::with_capacity(templates.len());
    for template in templates {
        if out.last().is_some_and(|last| last.name == template.name) {
            debug!(name = %template.name, "duplicate template name, keeping the later entry");
            out.pop();
        }
        out.push(template);
    }
    out
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.chars()
        .map(primary_weight)
        .cmp(b.chars().map(primary_weight))
        // Primaries tie only on case differences; lowercase sorts higher in ASCII
        .then_with(|| b.cmp(a))
}

/// Case-blind collation weight of one character.
fn primary_weight(c: char) -> (u8, char) {
    let class = if c.is_whitespace() {
        0
    } else if c.is_alphabetic() {
        3
    } else if c.is_numeric() {
        2
    } else {
        1
    };
    (class, c.to_lowercase().next().unwrap_or(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUFFIX: &str = ".instructions.md";

    fn entry(name: &str, url: &str) -> RemoteEntry {
        RemoteEntry {
            name: name.into(),
            download_url: Some(url.into()),
            size: 10,
        }
    }

    #[test]
    fn parse_fixture_listing() {
        let body = std::fs::read_to_string("../../../fixtures/catalog/listing.json")
            .expect("read listing fixture");
        let templates = parse_listing(&body, SUFFIX).expect("parse listing");

        let names: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Azure-Functions", "python", "react"]);
        assert!(templates.iter().all(|t| t.file_name.ends_with(SUFFIX)));
        assert_eq!(templates[1].size, 1536);
        assert!(templates[2].download_url.ends_with("react.instructions.md"));
    }

    #[test]
    fn directories_without_download_url_are_skipped() {
        let body = r#"[{"name": "x.instructions.md", "download_url": null, "size": 0}]"#;
        assert!(parse_listing(body, SUFFIX).unwrap().is_empty());
    }

    #[test]
    fn missing_size_defaults_to_zero() {
        let body = r#"[{"name": "go.instructions.md", "download_url": "https://x/go"}]"#;
        let templates = parse_listing(body, SUFFIX).unwrap();
        assert_eq!(templates[0].size, 0);
    }

    #[test]
    fn non_array_body_is_a_catalog_error() {
        let err = parse_listing(r#"{"message": "API rate limit exceeded"}"#, SUFFIX).unwrap_err();
        assert!(matches!(err, InstructGenError::CatalogFetch { .. }));
        assert!(err.to_string().contains("unexpected listing format"));
    }

    #[test]
    fn sorting_is_case_normalized() {
        let templates = templates_from_entries(
            vec![
                entry("vue.instructions.md", "u1"),
                entry("Angular.instructions.md", "u2"),
                entry("bicep.instructions.md", "u3"),
            ],
            SUFFIX,
        );
        let names: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Angular", "bicep", "vue"]);
    }

    #[test]
    fn case_variants_are_both_kept_lowercase_first() {
        let templates = templates_from_entries(
            vec![
                entry("React.instructions.md", "upper"),
                entry("react.instructions.md", "lower"),
                entry("rEact.instructions.md", "mixed"),
            ],
            SUFFIX,
        );
        let names: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["react", "rEact", "React"]);
    }

    #[test]
    fn punctuation_sorts_before_digits_and_letters() {
        let templates = templates_from_entries(
            vec![
                entry("a1.instructions.md", "digit"),
                entry("ab.instructions.md", "letter"),
                entry("a_b.instructions.md", "underscore"),
                entry("a-b.instructions.md", "hyphen"),
                entry("a.instructions.md", "prefix"),
            ],
            SUFFIX,
        );
        let names: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names[0], "a");
        assert_eq!(&names[3..], ["a1", "ab"]);
        assert!(names[1..3].contains(&"a_b") && names[1..3].contains(&"a-b"));
    }

    #[test]
    fn identical_names_keep_the_last_entry() {
        let templates = templates_from_entries(
            vec![
                entry("rust.instructions.md", "first"),
                entry("go.instructions.md", "go"),
                entry("rust.instructions.md", "second"),
            ],
            SUFFIX,
        );
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[1].name, "rust");
        assert_eq!(templates[1].download_url, "second");
    }
}
