//! Deterministic merging of instruction templates into one document.
//!
//! [`merge_templates`] takes the selected templates and their raw contents
//! (aligned by index), strips each template's frontmatter, and emits a
//! single Markdown document: a fixed header, then one `## <name>` section per
//! template in selection order. The output depends only on its inputs, so
//! merging the same inputs twice yields byte-identical text.

mod frontmatter;
mod stats;

use instructgen_shared::{InstructGenError, Result, Template};
use tracing::{debug, instrument};

pub use frontmatter::{normalize_body, strip_frontmatter};
pub use stats::{MergeStats, OutputStats, count_words, generate_merge_stats, reading_time_minutes};

/// Title line opening every merged document.
pub const DOCUMENT_TITLE: &str = "# Copilot Instructions";

/// Separator between header and sections: exactly one blank line.
const SECTION_SEPARATOR: &str = "\n\n";

/// Merge `contents[i]` under the heading of `templates[i]`, in order.
///
/// Fails with [`InstructGenError::MergeInputMismatch`] when the two slices
/// differ in length.
#[instrument(skip_all, fields(templates = templates.len()))]
pub fn merge_templates<S: AsRef<str>>(templates: &[Template], contents: &[S]) -> Result<String> {
    if templates.len() != contents.len() {
        return Err(InstructGenError::MergeInputMismatch {
            templates: templates.len(),
            contents: contents.len(),
        });
    }

    let mut parts = Vec::with_capacity(templates.len() + 1);
    parts.push(build_header(templates));

    for (template, content) in templates.iter().zip(contents) {
        let body = normalize_body(content.as_ref());
        debug!(template = %template.name, body_len = body.len(), "adding section");
        parts.push(build_section(&template.name, body));
    }

    let mut document = parts.join(SECTION_SEPARATOR);
    document.push('\n');

    debug!(len = document.len(), "merge complete");
    Ok(document)
}

/// Fixed document header with the generation marker.
fn build_header(templates: &[Template]) -> String {
    let names: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
    let noun = if templates.len() == 1 { "template" } else { "templates" };
    format!(
        "{DOCUMENT_TITLE}\n\n<!-- Generated by instructgen from {} {noun}: {} -->",
        templates.len(),
        names.join(", ")
    )
}

/// One section: level-2 heading with the template name, then the body.
fn build_section(name: &str, body: &str) -> String {
    if body.is_empty() {
        format!("## {name}")
    } else {
        format!("## {name}\n\n{body}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(name: &str) -> Template {
        Template {
            name: name.into(),
            file_name: format!("{name}.instructions.md"),
            download_url: format!("https://raw.example.com/{name}.instructions.md"),
            size: 0,
        }
    }

    #[test]
    fn two_templates_in_selection_order() {
        let templates = vec![template("python"), template("react")];
        let merged = merge_templates(&templates, &["# P\nbody1", "# R\nbody2"]).unwrap();

        let python = merged.find("## python\n\n# P\nbody1").expect("python section");
        let react = merged.find("## react\n\n# R\nbody2").expect("react section");
        assert!(python < react);
        assert!(merged.starts_with(DOCUMENT_TITLE));

        let stats = generate_merge_stats(&templates, &merged);
        assert_eq!(stats.template_count, 2);
    }

    #[test]
    fn exact_layout() {
        let merged = merge_templates(&[template("go"), template("rust")], &["A", "B\n\nC"]).unwrap();
        assert_eq!(
            merged,
            "# Copilot Instructions\n\n\
             <!-- Generated by instructgen from 2 templates: go, rust -->\n\n\
             ## go\n\nA\n\n\
             ## rust\n\nB\n\nC\n"
        );
    }

    #[test]
    fn frontmatter_is_not_carried_into_output() {
        let merged =
            merge_templates(&[template("python")], &["---\nfoo: bar\n---\nBODY"]).unwrap();
        assert!(merged.contains("## python\n\nBODY\n"));
        assert!(!merged.contains("foo: bar"));
        assert!(merged.ends_with("BODY\n"));
    }

    #[test]
    fn bodies_are_trimmed_but_inner_whitespace_kept() {
        let merged = merge_templates(&[template("a")], &["\n\n  line one\n\n\n   indented  \n\n"]).unwrap();
        assert!(merged.contains("## a\n\nline one\n\n\n   indented\n"));
    }

    #[test]
    fn empty_body_yields_bare_heading() {
        let merged = merge_templates(&[template("a"), template("b")], &["---\nx: 1\n---\n", "B"]).unwrap();
        assert!(merged.contains("## a\n\n## b\n\nB\n"));
    }

    #[test]
    fn merge_is_idempotent() {
        let templates = vec![template("a"), template("b")];
        let contents = vec!["---\nk: v\n---\nalpha".to_string(), "beta".to_string()];
        let first = merge_templates(&templates, &contents).unwrap();
        let second = merge_templates(&templates, &contents).unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn order_changes_output_but_not_section_set() {
        let (a, b) = (template("a"), template("b"));
        let forward = merge_templates(&[a.clone(), b.clone()], &["ca", "cb"]).unwrap();
        let reverse = merge_templates(&[b, a], &["cb", "ca"]).unwrap();
        assert_ne!(forward, reverse);

        let sections = |doc: &str| {
            let mut s: Vec<String> = doc
                .split("\n\n## ")
                .skip(1)
                .map(|s| s.trim_end().to_string())
                .collect();
            s.sort();
            s
        };
        assert_eq!(sections(&forward), sections(&reverse));
        assert_eq!(sections(&forward), vec!["a\n\nca", "b\n\ncb"]);
    }

    #[test]
    fn mismatched_lengths_fail() {
        let err = merge_templates(&[template("a"), template("b")], &["only one"]).unwrap_err();
        assert!(matches!(
            err,
            InstructGenError::MergeInputMismatch {
                templates: 2,
                contents: 1
            }
        ));
    }

    #[test]
    fn single_template_header_is_singular() {
        let merged = merge_templates(&[template("a")], &["x"]).unwrap();
        assert!(merged.contains("from 1 template: a -->"));
    }
}
