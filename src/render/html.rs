//! Shared HTML building blocks: escaping, the page shell, and the panels
//! every page uses (loading, error, empty, stat cards).

use chrono::{DateTime, Utc};

use crate::aggregate::time_since;
use crate::page::PageKind;
use crate::parser::{IssueRecord, Priority, Severity};

/// Escape text for use in element content and quoted attribute values.
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Short date used on live cards, e.g. `Mar 1, 08:05 AM`.
pub fn card_date(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %I:%M %p").to_string()
}

/// Date with year used on history cards, e.g. `Mar 1, 2024, 08:05 AM`.
pub fn history_date(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y, %I:%M %p").to_string()
}

/// Lowercase class/label for a priority badge (`p0` … `p3`).
pub fn priority_class(priority: Priority) -> &'static str {
    priority.as_str()
}

pub fn priority_badge(priority: Priority) -> String {
    format!(
        r#"<span class="priority-badge {}">{}</span>"#,
        priority_class(priority),
        priority.as_str().to_uppercase()
    )
}

pub fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Healthy => "🟢 HEALTHY",
        Severity::Degraded => "🟡 DEGRADED",
        Severity::Critical => "🔴 CRITICAL",
    }
}

/// CSS class fragment derived from free text (badge modifiers).
pub fn class_token(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

pub fn stat_card(label: &str, value: usize, modifier: Option<&str>) -> String {
    let class = match modifier {
        Some(m) => format!("stat-card {}", m),
        None => "stat-card".to_string(),
    };
    format!(
        r#"<div class="{}"><h3>{}</h3><div class="number">{}</div></div>"#,
        class,
        escape(label),
        value
    )
}

pub fn issue_row(label: &str, value_html: &str) -> String {
    format!(
        r#"<div class="issue-row"><span class="issue-label">{}:</span>{}</div>"#,
        escape(label),
        value_html
    )
}

pub fn issue_value(value: &str) -> String {
    format!(r#"<span class="issue-value">{}</span>"#, escape(value))
}

pub fn issue_link(url: &str, number: i64, class: &str) -> String {
    format!(
        r#"<a href="{}" target="_blank" rel="noopener" class="{}">View Issue #{} →</a>"#,
        escape(url),
        class,
        number
    )
}

/// Detail rows shared by the live dashboard and infeed cards.
pub fn issue_details(issue: &IssueRecord, now: DateTime<Utc>) -> String {
    let started = if issue.issue_time.is_empty() {
        card_date(issue.created_at)
    } else {
        issue.issue_time.clone()
    };
    let badge = |kind: &str, text: &str| {
        format!(
            r#"<span class="{}-badge {}">{}</span>"#,
            kind,
            class_token(text),
            escape(text)
        )
    };

    [
        issue_row("Component", &issue_value(&issue.component)),
        issue_row("Category", &badge("category", &issue.category)),
        issue_row("Status", &issue_value(&issue.component_status)),
        issue_row("Clarity", &badge("clarity", &issue.clarity)),
        issue_row("Priority", &priority_badge(issue.priority)),
        issue_row("Started", &issue_value(&started)),
        issue_row("Duration", &issue_value(&time_since(issue.created_at, now))),
    ]
    .concat()
}

pub fn loading_panel(message: &str) -> String {
    format!(
        r#"<div class="loading"><div class="loading-spinner"></div>{}</div>"#,
        escape(message)
    )
}

/// Error panel with a "Try Again" button that reruns the page's load.
pub fn error_panel(kind: PageKind, message: &str) -> String {
    format!(
        r#"<div class="error"><strong>⚠️ Error:</strong> {}<br><br><form method="post" action="/{}/refresh"><button class="btn" type="submit">Try Again</button></form></div>"#,
        escape(message),
        kind.slug()
    )
}

pub fn empty_panel(class: &str, heading: &str, detail: &str) -> String {
    format!(
        r#"<div class="{}"><h2>{}</h2><p>{}</p></div>"#,
        class,
        escape(heading),
        escape(detail)
    )
}

/// `<option>` list with the current selection marked. The first entry is
/// always the "all" option with an empty value.
pub fn select(name: &str, all_label: &str, values: &[String], selected: Option<&str>) -> String {
    let mut html = format!(
        r#"<label class="filter"><span>{}</span><select name="{}"><option value="">{}</option>"#,
        escape(&title_case(name)),
        escape(name),
        escape(all_label)
    );
    for value in values {
        let marker = if selected == Some(value.as_str()) {
            " selected"
        } else {
            ""
        };
        html.push_str(&format!(
            r#"<option value="{v}"{marker}>{v}</option>"#,
            v = escape(value),
            marker = marker
        ));
    }
    html.push_str("</select></label>");
    html
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Everything the shell needs besides the page body.
#[derive(Debug, Clone)]
pub struct Shell<'a> {
    pub kind: PageKind,
    pub repo_url: &'a str,
    pub repo_slug: &'a str,
    pub last_updated: Option<DateTime<Utc>>,
    pub auto_refresh: bool,
    /// Blocking message shown above the body (e.g. a rejected bot selection)
    pub notice: Option<&'a str>,
}

fn nav(current: PageKind) -> String {
    PageKind::ALL
        .iter()
        .map(|kind| {
            let class = if *kind == current { " class=\"active\"" } else { "" };
            format!(r#"<a href="{}"{}>{}</a>"#, kind.path(), class, kind.title())
        })
        .collect::<Vec<_>>()
        .join("")
}

/// Wrap a page body in the common layout.
pub fn layout(shell: &Shell<'_>, body: &str) -> String {
    let last_updated = match shell.last_updated {
        Some(at) => format!("Last updated: {} UTC", history_date(at)),
        None => "Last updated: never".to_string(),
    };
    let (toggle_label, toggle_class) = if shell.auto_refresh {
        ("Disable Auto-Refresh", "btn active")
    } else {
        ("Enable Auto-Refresh", "btn")
    };
    let notice = shell
        .notice
        .map(|n| format!(r#"<div class="notice">{}</div>"#, escape(n)))
        .unwrap_or_default();
    let slug = shell.kind.slug();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/assets/style.css">
</head>
<body>
<div class="container">
<header>
<h1>{title}</h1>
<nav>{nav}</nav>
<div class="header-info">
<a id="repoLink" href="{repo_url}" target="_blank" rel="noopener">{repo_slug}</a>
<span id="lastUpdated">{last_updated}</span>
</div>
<div class="controls">
<form method="post" action="/{slug}/refresh"><button class="btn" type="submit">Refresh</button></form>
<form method="post" action="/{slug}/auto-refresh"><button class="{toggle_class}" type="submit">{toggle_label}</button></form>
</div>
</header>
{notice}
<main id="content">
{body}
</main>
</div>
</body>
</html>
"#,
        title = escape(shell.kind.title()),
        nav = nav(shell.kind),
        repo_url = escape(shell.repo_url),
        repo_slug = escape(shell.repo_slug),
        last_updated = last_updated,
        slug = slug,
        toggle_class = toggle_class,
        toggle_label = toggle_label,
        notice = notice,
        body = body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<b onclick="x">Tom & Jerry's</b>"#),
            "&lt;b onclick=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/b&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_date_formats() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 14, 5, 0).unwrap();
        assert_eq!(card_date(at), "Mar 1, 02:05 PM");
        assert_eq!(history_date(at), "Mar 1, 2024, 02:05 PM");
    }

    #[test]
    fn test_select_marks_selected_and_escapes() {
        let values = vec!["B1".to_string(), "<B2>".to_string()];
        let html = select("bot", "All Bots", &values, Some("B1"));
        assert!(html.contains(r#"<option value="">All Bots</option>"#));
        assert!(html.contains(r#"<option value="B1" selected>B1</option>"#));
        assert!(html.contains("&lt;B2&gt;"));
        assert!(!html.contains("<B2>"));
    }

    #[test]
    fn test_error_panel_retries_same_page() {
        let html = error_panel(PageKind::InfeedHistory, "Error loading data: boom");
        assert!(html.contains(r#"action="/infeed-history/refresh""#));
        assert!(html.contains("Try Again"));
        assert!(html.contains("Error loading data: boom"));
    }

    #[test]
    fn test_layout_contains_controls() {
        let shell = Shell {
            kind: PageKind::Infeed,
            repo_url: "https://github.com/acme/ops",
            repo_slug: "acme/ops",
            last_updated: None,
            auto_refresh: true,
            notice: Some("No valid bot IDs found"),
        };
        let html = layout(&shell, "<p>body</p>");
        assert!(html.contains("<title>Infeed Status</title>"));
        assert!(html.contains(r#"href="https://github.com/acme/ops""#));
        assert!(html.contains("Disable Auto-Refresh"));
        assert!(html.contains(r#"action="/infeed/auto-refresh""#));
        assert!(html.contains(r#"<div class="notice">No valid bot IDs found</div>"#));
        assert!(html.contains("<p>body</p>"));
        assert!(html.contains("Last updated: never"));
    }

    #[test]
    fn test_class_token() {
        assert_eq!(class_token("Mechanical Jam"), "mechanical-jam");
        assert_eq!(class_token("a\"b"), "a-b");
    }
}
