//! Maintenance history pages (robot and infeed).

use super::html::{empty_panel, escape, history_date, issue_link, priority_badge, select};
use crate::aggregate::{IssueCounts, average_resolution, resolution_time, sort_by_updated_desc};
use crate::filter::{FilterOptions, FilterState};
use crate::page::PageKind;
use crate::parser::IssueRecord;

/// Filter bar. Submits to the page's `/view` route, which re-renders from
/// memory without refetching.
pub fn filter_form(kind: PageKind, options: &FilterOptions, filter: &FilterState) -> String {
    let states: Vec<String> = options.states.iter().map(|s| s.as_str().to_string()).collect();
    let first = if kind.is_infeed() {
        select("category", "All Categories", &options.categories, filter.category.as_deref())
    } else {
        select("bot", "All Bots", &options.entities, filter.entity())
    };

    format!(
        r#"<form method="get" action="/{slug}/view" class="filters">{first}{component}{state}<button class="btn" type="submit">Apply</button></form>"#,
        slug = kind.slug(),
        first = first,
        component = select("component", "All Components", &options.components, filter.component.as_deref()),
        state = select("state", "All States", &states, filter.state.as_deref()),
    )
}

fn summary_item(label: &str, value: &str, color: Option<&str>) -> String {
    let style = color
        .map(|c| format!(r#" style="color: {};""#, c))
        .unwrap_or_default();
    format!(
        r#"<div class="bot-stat-item"><div class="label">{}</div><div class="value"{}>{}</div></div>"#,
        label,
        style,
        escape(value)
    )
}

/// Totals block for a set of issues.
pub fn summary(heading: &str, issues: &[&IssueRecord]) -> String {
    let counts = IssueCounts::from_records(issues.iter().copied());
    let avg = average_resolution(issues.iter().copied());

    format!(
        r#"<div class="bot-summary"><h3>📊 {heading}</h3><div class="bot-stats">{total}{open}{resolved}{critical}{avg}</div></div>"#,
        heading = escape(heading),
        total = summary_item("Total Issues", &counts.total.to_string(), None),
        open = summary_item("Open", &counts.open.to_string(), Some("#dc3545")),
        resolved = summary_item("Resolved", &counts.closed.to_string(), Some("#28a745")),
        critical = summary_item("Critical (P0)", &counts.critical().to_string(), Some("#dc3545")),
        avg = summary_item("Avg Resolution", &avg, Some("#667eea")),
    )
}

fn detail(label: &str, value: &str) -> String {
    format!(
        r#"<div class="detail-item"><span class="detail-label">{}</span><span class="detail-value">{}</span></div>"#,
        label,
        escape(value)
    )
}

fn history_card(issue: &IssueRecord, show_entity: bool) -> String {
    let state_badge = if issue.is_closed() {
        "✅ Resolved"
    } else {
        "🔴 Open"
    };
    let entity_badge = if show_entity {
        format!(r#"<span class="bot-badge">{}</span>"#, escape(&issue.entity_id))
    } else {
        format!(r#"<span class="category-badge">{}</span>"#, escape(&issue.category))
    };
    let last = match (issue.is_closed(), issue.closed_at) {
        (true, Some(closed)) => detail("Resolved", &history_date(closed)),
        _ => detail("Last Updated", &history_date(issue.updated_at)),
    };
    let resolution = resolution_time(issue)
        .map(|t| format!(r#"<div class="resolution-time">⏱️ Resolution Time: {}</div>"#, t))
        .unwrap_or_default();

    format!(
        r#"<div class="history-card {state}"><div class="history-header"><div class="history-title"><h3>{title}</h3></div><div class="history-meta">{entity}<span class="state-badge {state}">{state_badge}</span>{priority}</div></div><div class="history-details">{component}{status}{created}{last}</div>{resolution}{link}</div>"#,
        state = issue.state.as_str(),
        title = escape(&issue.title),
        entity = entity_badge,
        state_badge = state_badge,
        priority = priority_badge(issue.priority),
        component = detail("Component", &issue.component),
        status = detail("Status", &issue.component_status),
        created = detail("Created", &history_date(issue.created_at)),
        last = last,
        resolution = resolution,
        link = issue_link(&issue.url, issue.number, "issue-link"),
    )
}

/// History body: filters, optional summary, then cards newest first.
///
/// The robot page only summarises when a bot is selected; the infeed page
/// always summarises the filtered set.
pub fn render_history(kind: PageKind, records: &[IssueRecord], filter: &FilterState) -> String {
    let options = FilterOptions::from_records(records);
    let mut filtered = filter.apply(records);

    let mut html = filter_form(kind, &options, filter);

    if kind.is_infeed() {
        html.push_str(&summary("Infeed Summary", &filtered));
    } else if let Some(entity) = filter.entity() {
        html.push_str(&summary(&format!("{} Summary", entity), &filtered));
    }

    if filtered.is_empty() {
        html.push_str(&empty_panel(
            "no-history",
            "📭 No History Found",
            "No issues match the selected filters",
        ));
        return html;
    }

    sort_by_updated_desc(&mut filtered);
    html.push_str(r#"<div class="history-grid">"#);
    for issue in filtered {
        html.push_str(&history_card(issue, !kind.is_infeed()));
    }
    html.push_str("</div>");
    html
}
