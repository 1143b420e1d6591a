//! Per-bot component health grid.

use chrono::{DateTime, Utc};

use super::html::{escape, issue_link, loading_panel, severity_label, stat_card};
use crate::aggregate::{ComponentHealth, component_breakdown, entity_health, fleet_summary, time_since};
use crate::entities::EntitySelection;
use crate::parser::IssueRecord;
use crate::store::SavedSelection;

/// Longest description shown in a component detail block.
const DESCRIPTION_PREVIEW: usize = 150;

pub const NO_BOTS_MESSAGE: &str = "Configure bots above to view health status";

/// Range and manual selection forms, pre-filled from the saved selection.
pub fn selection_form(saved: &SavedSelection) -> String {
    format!(
        r#"<div class="bot-config">
<form method="post" action="/bot-health/range" class="range-form">
<label>From B<input type="number" name="start" min="0" value="{start}"></label>
<label>To B<input type="number" name="end" min="0" value="{end}"></label>
<button class="btn" type="submit">Load Range</button>
</form>
<form method="post" action="/bot-health/manual" class="manual-form">
<label>Bot IDs<input type="text" name="manual" placeholder="B1, B2, 7" value="{manual}"></label>
<button class="btn" type="submit">Load Bots</button>
</form>
</div>"#,
        start = saved.start,
        end = saved.end,
        manual = escape(&saved.manual),
    )
}

fn truncate_description(description: &str) -> String {
    if description.chars().count() > DESCRIPTION_PREVIEW {
        let head: String = description.chars().take(DESCRIPTION_PREVIEW).collect();
        format!("{}...", head)
    } else {
        description.to_string()
    }
}

fn component_row(health: &ComponentHealth<'_>, now: DateTime<Utc>) -> String {
    let status = health.status.as_str();
    let Some(issue) = health.issue else {
        return format!(
            r#"<div class="component-item"><span class="component-name">{}</span><span class="component-health {}">{}</span></div>"#,
            escape(health.component),
            status,
            severity_label(health.status)
        );
    };

    let description = if issue.description.is_empty() {
        String::new()
    } else {
        format!(
            r#"<div class="issue-popup-row description"><strong>Description:</strong><br>{}</div>"#,
            escape(&truncate_description(&issue.description))
        )
    };

    format!(
        r#"<details class="component-item has-issue"><summary><span class="component-name">{name}</span><span class="component-health {status}">{label}</span></summary><div class="issue-popup"><h4>{title}</h4><div class="issue-popup-row"><strong>Status:</strong> {component_status}</div><div class="issue-popup-row"><strong>Priority:</strong> {priority}</div><div class="issue-popup-row"><strong>Category:</strong> {category}</div><div class="issue-popup-row"><strong>Clarity:</strong> {clarity}</div><div class="issue-popup-row"><strong>Duration:</strong> {duration}</div>{description}{link}</div></details>"#,
        name = escape(health.component),
        status = status,
        label = severity_label(health.status),
        title = escape(&issue.title),
        component_status = escape(&issue.component_status),
        priority = issue.priority.as_str().to_uppercase(),
        category = escape(&issue.category),
        clarity = escape(&issue.clarity),
        duration = time_since(issue.created_at, now),
        description = description,
        link = issue_link(&issue.url, issue.number, "issue-popup-link"),
    )
}

/// Grid body below the selection form.
pub fn render_health_grid(
    records: &[IssueRecord],
    entities: &EntitySelection,
    components: &[String],
    now: DateTime<Utc>,
) -> String {
    if entities.is_empty() {
        return format!(r#"<div class="loading">{}</div>"#, NO_BOTS_MESSAGE);
    }

    let healths: Vec<_> = entities
        .ids()
        .iter()
        .map(|id| (id, entity_health(records, id, components)))
        .collect();
    let summary = fleet_summary(healths.iter().map(|(_, h)| h));

    let mut html = String::from(r#"<div class="stats">"#);
    html.push_str(&stat_card("Bots", summary.total, None));
    html.push_str(&stat_card("Healthy", summary.healthy, Some("operational")));
    html.push_str(&stat_card("Degraded", summary.degraded, Some("degraded")));
    html.push_str(&stat_card("Critical", summary.critical, Some("down")));
    html.push_str(r#"</div><div class="health-grid">"#);

    for (id, health) in &healths {
        let status = health.status.as_str();
        html.push_str(&format!(
            r#"<div class="bot-health-card {status}"><div class="bot-health-header"><div class="bot-health-id">{id}</div><div class="bot-health-status {status}">{label}</div><div class="bot-health-summary">{healthy} / {total} subsystems healthy</div></div><div class="component-list">"#,
            status = status,
            id = escape(id),
            label = status.to_uppercase(),
            healthy = health.healthy_count,
            total = health.total_components,
        ));
        for component in component_breakdown(records, id, components) {
            html.push_str(&component_row(&component, now));
        }
        html.push_str("</div></div>");
    }
    html.push_str("</div>");
    html
}

/// Full page body: form, then grid, loading or error panel.
pub fn render_health(saved: &SavedSelection, content: &str) -> String {
    format!("{}<div id=\"healthCards\">{}</div>", selection_form(saved), content)
}

/// Placeholder shown while the first load for a non-empty selection runs.
pub fn health_loading() -> String {
    loading_panel("Loading bot health data...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::test_support::*;
    use crate::parser::{EntityRule, IssueParser};

    fn components() -> Vec<String> {
        vec!["Diverter".to_string(), "AFC".to_string(), "Motherboard".to_string()]
    }

    #[test]
    fn test_no_bots_message() {
        let html = render_health_grid(&[], &EntitySelection::default(), &components(), at(0));
        assert!(html.contains(NO_BOTS_MESSAGE));
    }

    #[test]
    fn test_grid_cards_and_rows() {
        let parser = IssueParser::new(EntityRule::Bracketed);
        let records = parser.parse_all(&[
            raw_issue(1, "[B7] Jam at exit", &body("Diverter", "Intermittent error"), &["p1"]),
            raw_issue(2, "[B8] Board dead", &body("motherboard", "Non-functional"), &["p0"]),
        ]);
        let entities = EntitySelection::from_range(7, 9).unwrap();
        let html = render_health_grid(&records, &entities, &components(), at(30));

        assert!(html.contains(r#"<div class="bot-health-card degraded"><div class="bot-health-header"><div class="bot-health-id">B7</div>"#));
        assert!(html.contains(r#"<div class="bot-health-card critical"><div class="bot-health-header"><div class="bot-health-id">B8</div>"#));
        assert!(html.contains(r#"<div class="bot-health-card healthy"><div class="bot-health-header"><div class="bot-health-id">B9</div>"#));
        assert!(html.contains("2 / 3 subsystems healthy"));
        assert!(html.contains("3 / 3 subsystems healthy"));
        assert!(html.contains("🟡 DEGRADED"));
        assert!(html.contains("🔴 CRITICAL"));
        assert!(html.contains("<h4>Jam at exit</h4>"));
        assert!(html.contains("<strong>Priority:</strong> P1"));
        assert!(html.contains("30 minutes"));
        assert!(html.contains("<h3>Critical</h3><div class=\"number\">1</div>"));
    }

    #[test]
    fn test_long_description_is_truncated() {
        let long = "x".repeat(200);
        let body = format!(
            "### Affected Component\nAFC\n### Component Status\nDegraded\n### Issue Description\n{}\n",
            long
        );
        let parser = IssueParser::new(EntityRule::Bracketed);
        let records = parser.parse_all(&[raw_issue(1, "[B1] AFC slow", &body, &[])]);
        let html = render_health_grid(&records, &EntitySelection::new(vec!["B1".into()]), &components(), at(0));
        let expected = format!("{}...", "x".repeat(150));
        assert!(html.contains(&expected));
        assert!(!html.contains(&"x".repeat(151)));
    }

    #[test]
    fn test_form_prefills_saved_selection() {
        let saved = SavedSelection {
            start: 3,
            end: 12,
            manual: "B1, \"B2\"".into(),
            bot_ids: vec![],
        };
        let html = render_health(&saved, "");
        assert!(html.contains(r#"name="start" min="0" value="3""#));
        assert!(html.contains(r#"name="end" min="0" value="12""#));
        assert!(html.contains("B1, &quot;B2&quot;"));
        assert!(html.contains(r#"action="/bot-health/manual""#));
    }
}
