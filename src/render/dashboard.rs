//! Live robot status board.

use chrono::{DateTime, Utc};

use super::html::{empty_panel, escape, issue_details, issue_link, stat_card};
use crate::aggregate::{IssueCounts, group_by_entity};
use crate::parser::IssueRecord;

pub fn render_dashboard(records: &[IssueRecord], now: DateTime<Utc>) -> String {
    if records.is_empty() {
        return empty_panel(
            "no-issues",
            "All Systems Operational",
            "No open robot issues found. All bots are running smoothly!",
        );
    }

    let counts = IssueCounts::from_records(records);
    let mut html = String::from(r#"<div class="stats">"#);
    html.push_str(&stat_card("Total Issues", counts.total, None));
    html.push_str(&stat_card("Operational", counts.operational, Some("operational")));
    html.push_str(&stat_card("Degraded", counts.degraded, Some("degraded")));
    html.push_str(&stat_card("Down", counts.down, Some("down")));
    html.push_str(&stat_card("Critical (P0)", counts.critical(), Some("down")));
    html.push_str("</div>");

    for group in group_by_entity(records) {
        html.push_str(&format!(
            r#"<section class="bot-group {status}"><h2 class="bot-group-header"><span class="bot-id">{id}</span><span class="status-badge {status}">{label}</span><span class="issue-count">{n} issue{s}</span></h2><div class="bot-grid">"#,
            status = group.status.as_str(),
            id = escape(group.entity_id),
            label = group.status.as_str().to_uppercase(),
            n = group.issues.len(),
            s = if group.issues.len() == 1 { "" } else { "s" },
        ));
        for issue in &group.issues {
            html.push_str(&issue_card(issue, now));
        }
        html.push_str("</div></section>");
    }
    html
}

fn issue_card(issue: &IssueRecord, now: DateTime<Utc>) -> String {
    let status = issue.operational_status.as_str();
    let rows = issue_details(issue, now);

    format!(
        r#"<div class="bot-card {status}"><div class="bot-header"><div class="issue-title">{title}</div><div class="status-badge {status}">{label}</div></div><div class="issue-info">{rows}{link}</div></div>"#,
        status = status,
        title = escape(&issue.title),
        label = status.to_uppercase(),
        rows = rows,
        link = issue_link(&issue.url, issue.number, "issue-link"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::test_support::*;
    use crate::parser::{EntityRule, IssueParser};

    fn records() -> Vec<IssueRecord> {
        let parser = IssueParser::new(EntityRule::Bracketed);
        parser.parse_all(&[
            raw_issue(1, "[B1] Slow belt", &body("Drive Motor", "Working"), &["p2"]),
            raw_issue(2, "[B2] Dead board", &body("Motherboard", "Non-functional"), &["p0", "bot-down"]),
            raw_issue(3, "[B1] Flicker", &body("LCD Display", "Intermittent error"), &["bot-degraded"]),
        ])
    }

    #[test]
    fn test_empty_shows_all_operational() {
        let html = render_dashboard(&[], at(0));
        assert!(html.contains("All Systems Operational"));
    }

    #[test]
    fn test_stats_and_group_order() {
        let html = render_dashboard(&records(), at(90));
        assert!(html.contains("<h3>Total Issues</h3><div class=\"number\">3</div>"));
        assert!(html.contains("<h3>Down</h3><div class=\"number\">1</div>"));
        assert!(html.contains("<h3>Critical (P0)</h3><div class=\"number\">1</div>"));

        // B2 is down, so its group comes before B1 (degraded)
        let b2 = html.find(r#"<span class="bot-id">B2</span>"#).unwrap();
        let b1 = html.find(r#"<span class="bot-id">B1</span>"#).unwrap();
        assert!(b2 < b1);
        assert!(html.contains("2 issues"));
    }

    #[test]
    fn test_card_fields() {
        let html = render_dashboard(&records(), at(90));
        assert!(html.contains("Dead board"));
        assert!(html.contains(r#"<span class="priority-badge p0">P0</span>"#));
        assert!(html.contains("1 hour 30m"));
        assert!(html.contains("View Issue #2"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let parser = IssueParser::new(EntityRule::Bracketed);
        let records = parser.parse_all(&[raw_issue(1, "[B1] <script>x</script>", "", &[])]);
        let html = render_dashboard(&records, at(1));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
