//! Live infeed status board.

use chrono::{DateTime, Utc};

use super::html::{empty_panel, escape, issue_details, issue_link, stat_card};
use crate::aggregate::IssueCounts;
use crate::parser::{IssueRecord, Priority};

/// Card class keyed on priority: P0 reads as down, P1 as degraded.
pub fn priority_status_class(priority: Priority) -> &'static str {
    match priority {
        Priority::P0 => "down",
        Priority::P1 => "degraded",
        _ => "operational",
    }
}

/// Badge text: the component status up to any parenthetical, upper-cased.
pub fn status_badge(component_status: &str) -> String {
    component_status
        .split('(')
        .next()
        .unwrap_or_default()
        .trim()
        .to_uppercase()
}

pub fn render_infeed(records: &[IssueRecord], now: DateTime<Utc>) -> String {
    if records.is_empty() {
        return empty_panel(
            "no-issues",
            "All Infeed Systems Operational",
            "No open infeed issues found",
        );
    }

    let counts = IssueCounts::from_records(records);
    let mut html = String::from(r#"<div class="stats">"#);
    html.push_str(&stat_card("Total Issues", counts.total, None));
    html.push_str(&stat_card("Critical", counts.priority(Priority::P0), Some("down")));
    html.push_str(&stat_card("High", counts.priority(Priority::P1), Some("degraded")));
    html.push_str(&stat_card("Medium", counts.priority(Priority::P2), None));
    html.push_str(&stat_card("Low", counts.priority(Priority::P3), Some("operational")));
    html.push_str(r#"</div><div class="bot-grid">"#);

    for issue in records {
        html.push_str(&issue_card(issue, now));
    }
    html.push_str("</div>");
    html
}

fn issue_card(issue: &IssueRecord, now: DateTime<Utc>) -> String {
    let class = priority_status_class(issue.priority);
    let rows = issue_details(issue, now);

    format!(
        r#"<div class="bot-card {class}"><div class="bot-header"><div class="bot-id">{title}</div><div class="status-badge {class}">{badge}</div></div><div class="issue-info">{rows}{link}</div></div>"#,
        class = class,
        title = escape(&issue.title),
        badge = escape(&status_badge(&issue.component_status)),
        rows = rows,
        link = issue_link(&issue.url, issue.number, "issue-link"),
    )
}
