//! Summary statistics for a merged document.

use instructgen_shared::Template;
use serde::Serialize;

/// Reading speed used for the time estimate.
const WORDS_PER_MINUTE: usize = 200;

/// Read-only summary of a merge. Always derived from the merged text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeStats {
    /// Number of merged templates.
    pub template_count: usize,
    /// Merged template names, in merge order.
    pub templates: Vec<String>,
    /// Measurements of the merged output.
    pub output_stats: OutputStats,
}

/// Size measurements of the merged output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputStats {
    /// Line count.
    pub lines: usize,
    /// Whitespace-delimited token count.
    pub words: usize,
    /// Unicode scalar count.
    pub characters: usize,
    /// Estimated reading time in whole minutes, at least 1.
    pub estimated_reading_time: usize,
}

/// Derive statistics for `merged_content` produced from `templates`.
pub fn generate_merge_stats(templates: &[Template], merged_content: &str) -> MergeStats {
    let words = count_words(merged_content);
    MergeStats {
        template_count: templates.len(),
        templates: templates.iter().map(|t| t.name.clone()).collect(),
        output_stats: OutputStats {
            lines: merged_content.lines().count(),
            words,
            characters: merged_content.chars().count(),
            estimated_reading_time: reading_time_minutes(words),
        },
    }
}

/// Count whitespace-delimited tokens.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// `ceil(words / 200)` minutes, never less than one.
pub fn reading_time_minutes(words: usize) -> usize {
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(name: &str) -> Template {
        Template {
            name: name.into(),
            file_name: format!("{name}.instructions.md"),
            download_url: String::new(),
            size: 0,
        }
    }

    fn text_with(words: usize, lines: usize) -> String {
        let per_line = words / lines;
        (0..lines)
            .map(|_| vec!["word"; per_line].join(" "))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn fifty_words_on_ten_lines() {
        let content = text_with(50, 10);
        let stats = generate_merge_stats(&[template("a")], &content);
        assert_eq!(stats.output_stats.lines, 10);
        assert_eq!(stats.output_stats.words, 50);
        assert_eq!(stats.output_stats.estimated_reading_time, 1);
    }

    #[test]
    fn six_hundred_words_take_three_minutes() {
        let content = text_with(600, 20);
        let stats = generate_merge_stats(&[template("a"), template("b")], &content);
        assert_eq!(stats.output_stats.words, 600);
        assert_eq!(stats.output_stats.estimated_reading_time, 3);
        assert_eq!(stats.template_count, 2);
        assert_eq!(stats.templates, vec!["a", "b"]);
    }

    #[test]
    fn reading_time_rounds_up_with_floor_of_one() {
        assert_eq!(reading_time_minutes(0), 1);
        assert_eq!(reading_time_minutes(200), 1);
        assert_eq!(reading_time_minutes(201), 2);
    }

    #[test]
    fn words_split_on_any_whitespace() {
        assert_eq!(count_words("  a\tb\n\nc  "), 3);
        assert_eq!(count_words(""), 0);
    }

    #[test]
    fn stats_serialize_camel_case() {
        let stats = generate_merge_stats(&[template("a")], "one two\nthree");
        let json = serde_json::to_value(&stats).expect("serialize");
        assert_eq!(json["templateCount"], 1);
        assert_eq!(json["outputStats"]["lines"], 2);
        assert_eq!(json["outputStats"]["estimatedReadingTime"], 1);
    }
}
