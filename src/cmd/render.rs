//! One-shot page render (`msort-health render`).

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;

use msort_health::config::HealthConfig;
use msort_health::filter::FilterState;
use msort_health::page::{LoadOutcome, PageController, PageKind};
use msort_health::render::{RenderContext, render_page};
use msort_health::store::{SavedSelection, SelectionStore};
use msort_health::aggregate::entity_health;
use msort_health::ui::icons::{self, CHECK, FILE};

/// Controller for `kind` against the configured repository. The health grid
/// gets the saved bot selection.
pub fn page_for(config: &HealthConfig, kind: PageKind) -> Result<(Arc<PageController>, SavedSelection)> {
    let page = Arc::new(PageController::new(kind, Arc::new(config.fetcher()), config));
    let store = SelectionStore::in_dir(&config.state_dir());
    let saved = store
        .load()
        .with_context(|| format!("Failed to read bot selection from {}", store.path().display()))?;
    if kind == PageKind::BotHealth {
        page.set_entities(saved.selection());
    }
    Ok((page, saved))
}

pub fn render_html(config: &HealthConfig, page: &PageController, saved: &SavedSelection) -> String {
    let ctx = RenderContext {
        repo_url: config.repo_url(),
        repo_slug: config.repo_slug(),
        now: Utc::now(),
        saved: saved.clone(),
        notice: None,
    };
    render_page(page, &ctx)
}

pub fn write_html(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))
}

/// One status line per selected bot on stderr.
fn print_fleet(page: &PageController) {
    let state = page.snapshot();
    for id in state.entities.ids() {
        let health = entity_health(&state.records, id, page.components());
        eprintln!(
            "{}{:<6} {}/{} subsystems healthy",
            icons::severity(health.status),
            id,
            health.healthy_count,
            health.total_components
        );
    }
}

pub async fn cmd_render(
    config: &HealthConfig,
    kind: PageKind,
    filter: FilterState,
    output: Option<&Path>,
) -> Result<()> {
    let (page, saved) = page_for(config, kind)?;
    page.set_filter(filter);

    let outcome = page
        .load()
        .await
        .with_context(|| format!("Failed to load issues for {}", config.repo_slug()))?;
    if outcome == LoadOutcome::Skipped {
        tracing::info!("no bots selected; run 'msort-health bots range' or 'bots manual' first");
    } else if kind == PageKind::BotHealth {
        print_fleet(&page);
    }

    let html = render_html(config, &page, &saved);
    match output {
        Some(path) => {
            write_html(path, &html)?;
            eprintln!("{}{}Wrote {} to {}", CHECK, FILE, kind, path.display());
        }
        None => print!("{}", html),
    }
    Ok(())
}
