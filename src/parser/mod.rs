//! Issue parsing: raw tracker issues to typed `IssueRecord`s.
//!
//! Parsing is total. Every field the issue form may leave out falls back to a
//! sentinel (`"Unknown"`, empty string, `P3`, `Operational`, `Healthy`), so a
//! malformed issue still renders.

mod sections;
mod types;

pub use sections::{RegexSectionExtractor, Section, SectionExtractor, SectionMap};
pub use types::{IssueRecord, IssueState, OperationalStatus, Priority, Severity, UNKNOWN};

use regex::Regex;
use std::sync::LazyLock;

use crate::github::RawIssue;

static ENTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").unwrap());

static ENTITY_PREFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]+\]\s*").unwrap());

static PRIORITY_LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|[^a-z0-9])p([0-3])(?:$|[^0-9])").unwrap());

static PRIORITY_SECTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^p([0-3])").unwrap());

const LABEL_BOT_DOWN: &str = "bot-down";
const LABEL_BOT_DEGRADED: &str = "bot-degraded";

/// How a page derives the entity an issue belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRule {
    /// `[B7] Jam at exit` belongs to `B7`.
    Bracketed,
    /// Every issue belongs to one fixed entity; a matching `[name]` title
    /// prefix is stripped.
    Fixed(&'static str),
}

/// Entity name used by the infeed pages.
pub const INFEED_ENTITY: &str = "Infeed";

/// Builds `IssueRecord`s from raw issues.
pub struct IssueParser {
    extractor: Box<dyn SectionExtractor>,
    entity_rule: EntityRule,
}

impl IssueParser {
    /// Parser using the regex section extractor.
    pub fn new(entity_rule: EntityRule) -> Self {
        Self::with_extractor(entity_rule, Box::new(RegexSectionExtractor::new()))
    }

    pub fn with_extractor(entity_rule: EntityRule, extractor: Box<dyn SectionExtractor>) -> Self {
        Self {
            extractor,
            entity_rule,
        }
    }

    pub fn entity_rule(&self) -> EntityRule {
        self.entity_rule
    }

    /// Parse one raw issue.
    pub fn parse(&self, issue: &RawIssue) -> IssueRecord {
        let raw_title = issue.title.as_deref().unwrap_or_default();
        let body = issue.body.as_deref().unwrap_or_default();
        let sections = self.extractor.extract(body);
        let labels: Vec<String> = issue.labels.iter().map(|l| l.name.to_lowercase()).collect();

        let (entity_id, title) = split_title(raw_title, self.entity_rule);
        let component_status = sections.get_or(Section::ComponentStatus, UNKNOWN).to_string();
        let severity = Severity::from_component_status(&component_status);

        IssueRecord {
            entity_id,
            component: sections.get_or(Section::AffectedComponent, UNKNOWN).to_string(),
            component_status,
            category: sections.get_or(Section::IssueCategory, UNKNOWN).to_string(),
            clarity: sections.get_or(Section::Clarity, UNKNOWN).to_string(),
            description: sections.get_or(Section::Description, "").to_string(),
            issue_time: sections.get_or(Section::StartTime, "").to_string(),
            priority: resolve_priority(&labels, &sections),
            operational_status: resolve_operational_status(&labels, &sections),
            title,
            number: issue.number,
            url: issue.html_url.clone(),
            state: if issue.state.eq_ignore_ascii_case("closed") {
                IssueState::Closed
            } else {
                IssueState::Open
            },
            created_at: issue.created_at,
            closed_at: issue.closed_at,
            updated_at: issue.updated_at,
            severity,
        }
    }

    /// Parse a whole fetch result, preserving order.
    pub fn parse_all(&self, issues: &[RawIssue]) -> Vec<IssueRecord> {
        issues.iter().map(|issue| self.parse(issue)).collect()
    }
}

/// Split a title into its entity id and display title.
pub fn split_title(title: &str, rule: EntityRule) -> (String, String) {
    match rule {
        EntityRule::Bracketed => {
            let entity = ENTITY_REGEX
                .captures(title)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| UNKNOWN.to_string());
            let display = ENTITY_PREFIX_REGEX.replace(title, "").trim().to_string();
            (entity, display)
        }
        EntityRule::Fixed(name) => {
            let display = match ENTITY_PREFIX_REGEX.find(title) {
                Some(m)
                    if m.as_str()
                        .trim_end()
                        .trim_start_matches('[')
                        .trim_end_matches(']')
                        .eq_ignore_ascii_case(name) =>
                {
                    format!("{}{}", &title[..m.start()], &title[m.end()..])
                }
                _ => title.to_string(),
            };
            (name.to_string(), display.trim().to_string())
        }
    }
}

/// Label `p[0-3]` first, then a `Priority` section starting with `P[0-3]`,
/// then `P3`.
fn resolve_priority(labels: &[String], sections: &SectionMap) -> Priority {
    let from_label = labels.iter().find_map(|name| {
        PRIORITY_LABEL_REGEX
            .captures(name)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().chars().next())
            .and_then(Priority::from_digit)
    });
    if let Some(priority) = from_label {
        return priority;
    }

    sections
        .get(Section::Priority)
        .and_then(|text| PRIORITY_SECTION_REGEX.captures(text))
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().chars().next())
        .and_then(Priority::from_digit)
        .unwrap_or_default()
}

/// `bot-down` / `bot-degraded` labels first, then the reported status text.
fn resolve_operational_status(labels: &[String], sections: &SectionMap) -> OperationalStatus {
    if labels.iter().any(|l| l == LABEL_BOT_DOWN) {
        return OperationalStatus::Down;
    }
    if labels.iter().any(|l| l == LABEL_BOT_DEGRADED) {
        return OperationalStatus::Degraded;
    }

    match sections.get(Section::BotOperationalStatus) {
        Some(text) => {
            let text = text.to_lowercase();
            if text.contains("down") {
                OperationalStatus::Down
            } else if text.contains("degraded") {
                OperationalStatus::Degraded
            } else {
                OperationalStatus::Operational
            }
        }
        None => OperationalStatus::Operational,
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    fn parse(issue: &RawIssue) -> IssueRecord {
        IssueParser::new(EntityRule::Bracketed).parse(issue)
    }

    // ── End-to-end record ────────────────────────────────────────────

    #[test]
    fn test_parse_jam_at_exit() {
        let issue = raw_issue(
            7,
            "[B7] Jam at exit",
            "### Affected Component\nDiverter\n### Component Status\nIntermittent error",
            &["robot-issue", "p1"],
        );
        let record = parse(&issue);
        assert_eq!(record.entity_id, "B7");
        assert_eq!(record.title, "Jam at exit");
        assert_eq!(record.component, "Diverter");
        assert_eq!(record.component_status, "Intermittent error");
        assert_eq!(record.priority, Priority::P1);
        assert_eq!(record.severity, Severity::Degraded);
        assert_eq!(record.state, IssueState::Open);
        assert_eq!(record.number, 7);
        assert_eq!(record.url, "https://github.com/acme/ops/issues/7");
    }

    // ── Sentinels ────────────────────────────────────────────────────

    #[test]
    fn test_missing_sections_fall_back_to_sentinels() {
        let record = parse(&raw_issue(1, "No prefix here", "free text only", &[]));
        assert_eq!(record.entity_id, UNKNOWN);
        assert_eq!(record.title, "No prefix here");
        assert_eq!(record.component, UNKNOWN);
        assert_eq!(record.component_status, UNKNOWN);
        assert_eq!(record.category, UNKNOWN);
        assert_eq!(record.clarity, UNKNOWN);
        assert_eq!(record.description, "");
        assert_eq!(record.issue_time, "");
        assert_eq!(record.priority, Priority::P3);
        assert_eq!(record.operational_status, OperationalStatus::Operational);
        assert_eq!(record.severity, Severity::Healthy);
    }

    #[test]
    fn test_null_title_and_body() {
        let mut issue = raw_issue(2, "", "", &[]);
        issue.title = None;
        issue.body = None;
        let record = parse(&issue);
        assert_eq!(record.entity_id, UNKNOWN);
        assert_eq!(record.title, "");
        assert_eq!(record.component, UNKNOWN);
    }

    // ── Priority ─────────────────────────────────────────────────────

    #[test]
    fn test_priority_label_wins_over_section() {
        let issue = raw_issue(3, "[B1] x", "### Priority\nP0 - Critical", &["P2"]);
        assert_eq!(parse(&issue).priority, Priority::P2);
    }

    #[test]
    fn test_priority_label_is_case_normalized() {
        let issue = raw_issue(3, "[B1] x", "", &["robot-issue", "P0"]);
        assert_eq!(parse(&issue).priority, Priority::P0);
    }

    #[test]
    fn test_priority_falls_back_to_section() {
        let issue = raw_issue(3, "[B1] x", "### Priority\n\np1 - high", &["robot-issue"]);
        assert_eq!(parse(&issue).priority, Priority::P1);
    }

    #[test]
    fn test_priority_section_must_start_with_token() {
        let issue = raw_issue(3, "[B1] x", "### Priority\nHigh (P1)", &[]);
        assert_eq!(parse(&issue).priority, Priority::P3);
    }

    #[test]
    fn test_priority_ignores_labels_without_token() {
        let issue = raw_issue(3, "[B1] x", "", &["top3-issue", "p9"]);
        assert_eq!(parse(&issue).priority, Priority::P3);
    }

    #[test]
    fn test_priority_label_with_suffix_or_prefix() {
        let issue = raw_issue(3, "[B1] x", "", &["p1_urgent"]);
        assert_eq!(parse(&issue).priority, Priority::P1);
        let issue = raw_issue(4, "[B1] x", "", &["priority:P0"]);
        assert_eq!(parse(&issue).priority, Priority::P0);
        let issue = raw_issue(5, "[B1] x", "", &["p10"]);
        assert_eq!(parse(&issue).priority, Priority::P3);
    }

    #[test]
    fn test_first_matching_priority_label_wins() {
        let issue = raw_issue(3, "[B1] x", "", &["p2", "p0"]);
        assert_eq!(parse(&issue).priority, Priority::P2);
    }

    // ── Operational status ───────────────────────────────────────────

    #[test]
    fn test_bot_down_label_wins_over_section() {
        let issue = raw_issue(4, "[B2] x", "### Bot Operational Status\nOperational", &["bot-down"]);
        assert_eq!(parse(&issue).operational_status, OperationalStatus::Down);
    }

    #[test]
    fn test_bot_down_label_wins_over_degraded_label() {
        let issue = raw_issue(4, "[B2] x", "", &["Bot-Degraded", "BOT-DOWN"]);
        assert_eq!(parse(&issue).operational_status, OperationalStatus::Down);
    }

    #[test]
    fn test_operational_status_from_section() {
        let down = raw_issue(4, "[B2] x", "### Bot Operational Status\nBot is DOWN", &[]);
        let degraded = raw_issue(5, "[B2] x", "### Bot Operational Status\nDegraded", &[]);
        assert_eq!(parse(&down).operational_status, OperationalStatus::Down);
        assert_eq!(parse(&degraded).operational_status, OperationalStatus::Degraded);
    }

    // ── Titles and entities ──────────────────────────────────────────

    #[test]
    fn test_split_title_bracketed_strips_first_prefix_only() {
        let (entity, title) = split_title("[B12]   Motor [hot] again", EntityRule::Bracketed);
        assert_eq!(entity, "B12");
        assert_eq!(title, "Motor [hot] again");
    }

    #[test]
    fn test_split_title_fixed_strips_matching_prefix() {
        let (entity, title) = split_title("[infeed] Belt torn", EntityRule::Fixed(INFEED_ENTITY));
        assert_eq!(entity, "Infeed");
        assert_eq!(title, "Belt torn");
    }

    #[test]
    fn test_split_title_fixed_keeps_other_prefix() {
        let (entity, title) = split_title("[B3] Belt torn", EntityRule::Fixed(INFEED_ENTITY));
        assert_eq!(entity, "Infeed");
        assert_eq!(title, "[B3] Belt torn");
    }

    // ── Misc fields ──────────────────────────────────────────────────

    #[test]
    fn test_closed_state_and_timestamps() {
        let record = parse(&closed_issue(9, "[B4] x", "", 90));
        assert_eq!(record.state, IssueState::Closed);
        assert_eq!(record.closed_at, Some(at(90)));
        assert_eq!(record.created_at, at(0));
    }

    #[test]
    fn test_custom_extractor_is_used() {
        struct Fixed;
        impl SectionExtractor for Fixed {
            fn extract(&self, _body: &str) -> SectionMap {
                let mut map = SectionMap::new();
                map.insert(Section::AffectedComponent, "AFC");
                map.insert(Section::ComponentStatus, "Completely down");
                map
            }
        }
        let parser = IssueParser::with_extractor(EntityRule::Bracketed, Box::new(Fixed));
        let record = parser.parse(&raw_issue(1, "[B1] x", "ignored", &[]));
        assert_eq!(record.component, "AFC");
        assert_eq!(record.severity, Severity::Critical);
    }

    #[test]
    fn test_parse_all_preserves_order() {
        let issues = vec![
            raw_issue(1, "[B1] a", &body("AFC", "Working"), &[]),
            raw_issue(2, "[B2] b", &body("Diverter", "Degraded"), &[]),
        ];
        let records = IssueParser::new(EntityRule::Bracketed).parse_all(&issues);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].entity_id, "B1");
        assert_eq!(records[1].severity, Severity::Degraded);
    }
}
