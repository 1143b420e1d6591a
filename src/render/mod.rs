//! HTML rendering for the dashboard pages.
//!
//! | Module      | Page                                  |
//! |-------------|---------------------------------------|
//! | `dashboard` | Live robot status board               |
//! | `infeed`    | Live infeed status board              |
//! | `health`    | Per-bot component health grid         |
//! | `history`   | Robot and infeed maintenance history  |
//! | `html`      | Escaping, shell, shared panels        |
//!
//! Renderers are pure functions of a page snapshot; nothing here fetches.

pub mod dashboard;
pub mod health;
pub mod history;
pub mod html;
pub mod infeed;

use chrono::{DateTime, Utc};

use crate::page::{PageController, PageKind, PageState};
use crate::store::SavedSelection;

pub use html::escape;

/// Inputs to a page render that don't live in the page state.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub repo_url: String,
    pub repo_slug: String,
    pub now: DateTime<Utc>,
    /// Pre-fills the health grid's selection form
    pub saved: SavedSelection,
    pub notice: Option<String>,
}

/// Page body for a state snapshot, without the shell.
pub fn render_body(kind: PageKind, state: &PageState, components: &[String], ctx: &RenderContext) -> String {
    if kind == PageKind::BotHealth {
        let grid = if state.entities.is_empty() {
            health::render_health_grid(&[], &state.entities, components, ctx.now)
        } else if let Some(error) = &state.error {
            html::error_panel(kind, error)
        } else if !state.loaded {
            health::health_loading()
        } else {
            health::render_health_grid(&state.records, &state.entities, components, ctx.now)
        };
        return health::render_health(&ctx.saved, &grid);
    }

    if let Some(error) = &state.error {
        return html::error_panel(kind, error);
    }
    if !state.loaded {
        return html::loading_panel(kind.loading_message());
    }

    match kind {
        PageKind::Dashboard => dashboard::render_dashboard(&state.records, ctx.now),
        PageKind::Infeed => infeed::render_infeed(&state.records, ctx.now),
        _ => history::render_history(kind, &state.records, &state.filter),
    }
}

/// Full HTML document for a page.
pub fn render_page(page: &PageController, ctx: &RenderContext) -> String {
    let state = page.snapshot();
    let body = render_body(page.kind(), &state, page.components(), ctx);
    let shell = html::Shell {
        kind: page.kind(),
        repo_url: &ctx.repo_url,
        repo_slug: &ctx.repo_slug,
        last_updated: state.last_updated,
        auto_refresh: page.auto_refresh().is_enabled(),
        notice: ctx.notice.as_deref(),
    };
    html::layout(&shell, &body)
}
