//! Core domain types: catalog templates and the user's selection.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// A remotely hosted instruction-document fragment available for selection.
///
/// Serialized in camelCase so persisted listings match the
/// `{ name, fileName, downloadUrl, size }` record shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Display key, the file name with the catalog suffix removed.
    pub name: String,
    /// Original remote file name (e.g. `python.instructions.md`).
    pub file_name: String,
    /// Locator for fetching the raw content.
    pub download_url: String,
    /// Byte count reported by the catalog (informational).
    #[serde(default)]
    pub size: u64,
}

impl Template {
    /// Build a template from a remote file name, deriving `name` by stripping
    /// `suffix`. Returns `None` when the file name does not carry the suffix.
    pub fn from_file_name(
        file_name: &str,
        suffix: &str,
        download_url: impl Into<String>,
        size: u64,
    ) -> Option<Self> {
        let name = file_name.strip_suffix(suffix)?;
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            file_name: file_name.to_string(),
            download_url: download_url.into(),
            size,
        })
    }

    /// Case-insensitive substring match against the template name.
    ///
    /// A blank search term matches every template.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim();
        term.is_empty() || self.name.to_lowercase().contains(&term.to_lowercase())
    }
}

/// Filter a listing down to the templates whose name matches `term`.
pub fn filter_templates<'a>(templates: &'a [Template], term: &str) -> Vec<&'a Template> {
    templates.iter().filter(|t| t.matches(term)).collect()
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// The user-chosen, ordered set of templates to merge.
///
/// Unique by `name`; insertion order decides merge and section order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    templates: Vec<Template>,
}

impl Selection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a template. Returns `false` (and leaves the selection unchanged)
    /// when a template with the same name is already selected.
    pub fn add(&mut self, template: Template) -> bool {
        if self.contains(&template.name) {
            return false;
        }
        self.templates.push(template);
        true
    }

    /// Remove the template with the given name. Returns whether one was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.templates.len();
        self.templates.retain(|t| t.name != name);
        self.templates.len() != before
    }

    /// Whether a template with this name is selected.
    pub fn contains(&self, name: &str) -> bool {
        self.templates.iter().any(|t| t.name == name)
    }

    /// Drop every selected template.
    pub fn clear(&mut self) {
        self.templates.clear();
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Selected templates in selection order.
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Selected names in selection order.
    pub fn names(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Template> {
        self.templates.iter()
    }
}

impl FromIterator<Template> for Selection {
    fn from_iter<I: IntoIterator<Item = Template>>(iter: I) -> Self {
        let mut selection = Self::new();
        for template in iter {
            selection.add(template);
        }
        selection
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = &'a Template;
    type IntoIter = std::slice::Iter<'a, Template>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
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
            size: 100,
        }
    }

    #[test]
    fn from_file_name_strips_suffix() {
        let t = Template::from_file_name(
            "python.instructions.md",
            ".instructions.md",
            "https://raw.example.com/python.instructions.md",
            42,
        )
        .expect("suffix present");
        assert_eq!(t.name, "python");
        assert_eq!(t.file_name, "python.instructions.md");
        assert_eq!(t.size, 42);
    }

    #[test]
    fn from_file_name_rejects_other_files() {
        assert!(Template::from_file_name("README.md", ".instructions.md", "u", 1).is_none());
        assert!(Template::from_file_name(".instructions.md", ".instructions.md", "u", 1).is_none());
    }

    #[test]
    fn template_serializes_camel_case() {
        let json = serde_json::to_value(template("react")).expect("serialize");
        assert_eq!(json["name"], "react");
        assert_eq!(json["fileName"], "react.instructions.md");
        assert!(json["downloadUrl"].is_string());
        assert_eq!(json["size"], 100);
    }

    #[test]
    fn search_is_case_insensitive() {
        let templates = vec![template("Python"), template("react"), template("azure-functions")];
        let hits = filter_templates(&templates, "PY");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Python");

        assert_eq!(filter_templates(&templates, "   ").len(), 3);
        assert!(filter_templates(&templates, "golang").is_empty());
    }

    #[test]
    fn selection_keeps_insertion_order_and_uniqueness() {
        let mut sel = Selection::new();
        assert!(sel.add(template("react")));
        assert!(sel.add(template("python")));
        assert!(!sel.add(template("react")));

        assert_eq!(sel.names(), vec!["react", "python"]);
        assert_eq!(sel.len(), 2);
    }

    #[test]
    fn selection_remove_and_clear() {
        let mut sel: Selection = ["a", "b", "c"].into_iter().map(template).collect();
        assert!(sel.remove("b"));
        assert!(!sel.remove("b"));
        assert_eq!(sel.names(), vec!["a", "c"]);

        sel.clear();
        assert!(sel.is_empty());
    }
}
