//! Labeled-section extraction from issue-form markdown.
//!
//! Issue bodies produced by the tracker's issue forms look like:
//!
//! ```text
//! ### 📂 Affected Component
//!
//! Diverter
//!
//! ### 🔧 Component Status
//!
//! Intermittent error
//! ```
//!
//! The heading may carry decorative glyphs before the label and is matched
//! case-insensitively. Most sections capture the next non-blank line; the
//! description captures a block ending at the next heading or blank line.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// The labeled sections the parser knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    AffectedComponent,
    ComponentStatus,
    IssueCategory,
    Clarity,
    Description,
    StartTime,
    BotOperationalStatus,
    Priority,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::AffectedComponent,
        Section::ComponentStatus,
        Section::IssueCategory,
        Section::Clarity,
        Section::Description,
        Section::StartTime,
        Section::BotOperationalStatus,
        Section::Priority,
    ];

    /// Heading text as written in the issue form.
    pub fn label(&self) -> &'static str {
        match self {
            Section::AffectedComponent => "Affected Component",
            Section::ComponentStatus => "Component Status",
            Section::IssueCategory => "Issue Category",
            Section::Clarity => "Clarity of the Issue",
            Section::Description => "Issue Description",
            Section::StartTime => "Issue Start Time",
            Section::BotOperationalStatus => "Bot Operational Status",
            Section::Priority => "Priority",
        }
    }

    /// Whether the section spans multiple lines.
    fn is_block(&self) -> bool {
        matches!(self, Section::Description)
    }
}

/// Captured section text keyed by section. Missing sections are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionMap {
    values: HashMap<Section, String>,
}

impl SectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, section: Section, value: impl Into<String>) {
        self.values.insert(section, value.into());
    }

    pub fn get(&self, section: Section) -> Option<&str> {
        self.values.get(&section).map(String::as_str)
    }

    /// Section text, or `default` when the section is missing.
    pub fn get_or<'a>(&'a self, section: Section, default: &'a str) -> &'a str {
        self.get(section).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Turns an issue body into a section map.
///
/// Callers only see the map, so the matching strategy can be replaced without
/// touching the record builder.
pub trait SectionExtractor: Send + Sync {
    fn extract(&self, body: &str) -> SectionMap;
}

// Optional decorative glyphs (emoji, punctuation) between `###` and the label.
const GLYPHS: &str = r"(?:[^\p{L}\p{N}\s]\s*)*";

static SECTION_REGEXES: LazyLock<Vec<(Section, Regex)>> = LazyLock::new(|| {
    Section::ALL
        .iter()
        .map(|section| {
            let label = regex::escape(section.label());
            let pattern = if section.is_block() {
                format!(r"(?is)###\s*{GLYPHS}{label}\s*\n\s*(.+)")
            } else {
                format!(r"(?i)###\s*{GLYPHS}{label}\s*\n\s*(.+)")
            };
            (*section, Regex::new(&pattern).unwrap())
        })
        .collect()
});

/// Regex-driven extractor matching the issue-form heading layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexSectionExtractor;

impl RegexSectionExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl SectionExtractor for RegexSectionExtractor {
    fn extract(&self, body: &str) -> SectionMap {
        let body = body.replace("\r\n", "\n");
        let mut map = SectionMap::new();

        for (section, regex) in SECTION_REGEXES.iter() {
            let Some(captured) = regex.captures(&body).and_then(|c| c.get(1)) else {
                continue;
            };
            let text = if section.is_block() {
                truncate_block(captured.as_str())
            } else {
                captured.as_str()
            };
            let text = text.trim();
            // An empty section runs straight into the next heading.
            if !text.is_empty() && !text.starts_with("###") {
                map.insert(*section, text);
            }
        }

        map
    }
}

/// Cut a block capture at the next heading or blank line.
fn truncate_block(text: &str) -> &str {
    let end = [text.find("\n###"), text.find("\n\n")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(text.len());
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(body: &str) -> SectionMap {
        RegexSectionExtractor::new().extract(body)
    }

    #[test]
    fn test_plain_heading_captures_next_line() {
        let map = extract("### Affected Component\nDiverter\n");
        assert_eq!(map.get(Section::AffectedComponent), Some("Diverter"));
    }

    #[test]
    fn test_blank_lines_between_heading_and_value_are_skipped() {
        let map = extract("### Component Status\n\n\n  Intermittent error  \n");
        assert_eq!(map.get(Section::ComponentStatus), Some("Intermittent error"));
    }

    #[test]
    fn test_heading_with_emoji_glyph() {
        let map = extract("### 📂 Affected Component\n\nDrive Motor\n\n### ⏰ Issue Start Time\n\n2024-03-01 10:00");
        assert_eq!(map.get(Section::AffectedComponent), Some("Drive Motor"));
        assert_eq!(map.get(Section::StartTime), Some("2024-03-01 10:00"));
    }

    #[test]
    fn test_heading_with_variation_selector_glyph() {
        let map = extract("### ⚙️ Component Status\nNon-functional");
        assert_eq!(map.get(Section::ComponentStatus), Some("Non-functional"));
    }

    #[test]
    fn test_empty_section_does_not_take_next_heading() {
        let map = extract("### Affected Component\n\n### Component Status\nJammed\n\n### Issue Description\n\n### Priority\nP2");
        assert_eq!(map.get(Section::AffectedComponent), None);
        assert_eq!(map.get(Section::ComponentStatus), Some("Jammed"));
        assert_eq!(map.get(Section::Description), None);
        assert_eq!(map.get(Section::Priority), Some("P2"));
    }

    #[test]
    fn test_heading_is_case_insensitive() {
        let map = extract("### clarity of the issue\nClear");
        assert_eq!(map.get(Section::Clarity), Some("Clear"));
    }

    #[test]
    fn test_crlf_body_is_normalized() {
        let map = extract("### Issue Category\r\n\r\nMechanical\r\n\r\n### Priority\r\n\r\nP1 - High\r\n");
        assert_eq!(map.get(Section::IssueCategory), Some("Mechanical"));
        assert_eq!(map.get(Section::Priority), Some("P1 - High"));
    }

    #[test]
    fn test_description_stops_at_blank_line() {
        let body = "### Issue Description\n\nBelt slips at exit.\nHappens twice an hour.\n\nExtra notes";
        let map = extract(body);
        assert_eq!(
            map.get(Section::Description),
            Some("Belt slips at exit.\nHappens twice an hour.")
        );
    }

    #[test]
    fn test_description_stops_at_next_heading() {
        let body = "### Issue Description\nSensor blind\n### Issue Start Time\nyesterday";
        let map = extract(body);
        assert_eq!(map.get(Section::Description), Some("Sensor blind"));
        assert_eq!(map.get(Section::StartTime), Some("yesterday"));
    }

    #[test]
    fn test_description_runs_to_end_of_body() {
        let map = extract("### Issue Description\nLast line of the body");
        assert_eq!(map.get(Section::Description), Some("Last line of the body"));
    }

    #[test]
    fn test_missing_sections_are_absent() {
        let map = extract("Just some free text with no headings.");
        assert!(map.is_empty());
        assert_eq!(map.get_or(Section::AffectedComponent, "Unknown"), "Unknown");
    }

    #[test]
    fn test_empty_body() {
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_heading_at_end_of_body_has_no_value() {
        let map = extract("### Affected Component\n");
        assert_eq!(map.get(Section::AffectedComponent), None);
    }

    #[test]
    fn test_full_issue_form() {
        let body = "\
### 🤖 Bot Operational Status

Degraded

### 📂 Affected Component

Station Reader

### 🔧 Component Status

Intermittent (misses every 10th scan)

### Issue Category

Electrical

### Clarity of the Issue

Unclear

### Priority

P2";
        let map = extract(body);
        assert_eq!(map.len(), 6);
        assert_eq!(map.get(Section::BotOperationalStatus), Some("Degraded"));
        assert_eq!(map.get(Section::AffectedComponent), Some("Station Reader"));
        assert_eq!(
            map.get(Section::ComponentStatus),
            Some("Intermittent (misses every 10th scan)")
        );
        assert_eq!(map.get(Section::IssueCategory), Some("Electrical"));
        assert_eq!(map.get(Section::Clarity), Some("Unclear"));
        assert_eq!(map.get(Section::Priority), Some("P2"));
    }
}
