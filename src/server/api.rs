use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;

use crate::config::HealthConfig;
use crate::entities::EntitySelection;
use crate::errors::SelectionError;
use crate::filter::FilterState;
use crate::github::IssueSource;
use crate::page::{PageController, PageKind};
use crate::render::{RenderContext, render_page};
use crate::store::{SavedSelection, SelectionStore};

use super::assets::asset_handler;

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pages: [Arc<PageController>; 5],
    store: SelectionStore,
    saved: Mutex<SavedSelection>,
    repo_url: String,
    repo_slug: String,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Build one controller per page and restore the saved bot selection.
    pub fn new(config: &HealthConfig, source: Arc<dyn IssueSource>, store: SelectionStore) -> Self {
        let pages = PageKind::ALL.map(|kind| Arc::new(PageController::new(kind, source.clone(), config)));

        let saved = store.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring unreadable bot selection");
            SavedSelection::default()
        });
        pages[PageKind::BotHealth as usize].set_entities(saved.selection());

        Self {
            pages,
            store,
            saved: Mutex::new(saved),
            repo_url: config.repo_url(),
            repo_slug: config.repo_slug(),
        }
    }

    pub fn page(&self, kind: PageKind) -> &Arc<PageController> {
        &self.pages[kind as usize]
    }

    pub fn saved(&self) -> SavedSelection {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn render(&self, kind: PageKind, notice: Option<String>) -> String {
        let ctx = RenderContext {
            repo_url: self.repo_url.clone(),
            repo_slug: self.repo_slug.clone(),
            now: Utc::now(),
            saved: self.saved(),
            notice,
        };
        render_page(self.page(kind), &ctx)
    }

    /// Apply a new bot selection, persist it, and reload the grid.
    async fn select(&self, selection: EntitySelection, saved: SavedSelection) -> Result<(), ApiError> {
        self.store
            .save(&saved)
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        *self.saved.lock().unwrap_or_else(PoisonError::into_inner) = saved;

        let page = self.page(PageKind::BotHealth);
        tracing::info!(bots = selection.len(), "bot selection updated");
        page.set_entities(selection);
        // Failures are recorded in the page state and rendered there.
        let _ = page.load().await;
        Ok(())
    }
}

// ── Request payload types ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RangeForm {
    pub start: u32,
    pub end: u32,
}

#[derive(Deserialize)]
pub struct ManualForm {
    #[serde(default)]
    pub manual: String,
}

// ── Error type ────────────────────────────────────────────────────────

pub enum ApiError {
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

fn page_kind(slug: &str) -> Result<PageKind, ApiError> {
    PageKind::from_slug(slug).ok_or_else(|| ApiError::NotFound(format!("No page named '{}'", slug)))
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/health", get(health))
        .route("/", get(dashboard))
        .route("/assets/{*file}", get(asset_handler))
        .route("/bot-health/range", post(select_range))
        .route("/bot-health/manual", post(select_manual))
        .route("/{page}", get(show_page))
        .route("/{page}/view", get(view_page))
        .route("/{page}/refresh", post(refresh_page))
        .route("/{page}/auto-refresh", post(toggle_auto_refresh))
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Fetch, then render. History pages take their filter from the query.
async fn load_and_render(state: &SharedState, kind: PageKind, filter: FilterState) -> Html<String> {
    let page = state.page(kind);
    if kind.is_history() {
        page.set_filter(filter);
    }
    let _ = page.load().await;
    Html(state.render(kind, None))
}

async fn dashboard(State(state): State<SharedState>) -> Html<String> {
    load_and_render(&state, PageKind::Dashboard, FilterState::default()).await
}

async fn show_page(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
    Query(filter): Query<FilterState>,
) -> Result<Html<String>, ApiError> {
    let kind = page_kind(&slug)?;
    Ok(load_and_render(&state, kind, filter).await)
}

/// Re-render from the records already in memory.
async fn view_page(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
    Query(filter): Query<FilterState>,
) -> Result<Html<String>, ApiError> {
    let kind = page_kind(&slug)?;
    state.page(kind).set_filter(filter);
    Ok(Html(state.render(kind, None)))
}

async fn refresh_page(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Redirect, ApiError> {
    let kind = page_kind(&slug)?;
    let _ = state.page(kind).load().await;
    Ok(Redirect::to(&back_to(kind)))
}

async fn toggle_auto_refresh(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Redirect, ApiError> {
    let kind = page_kind(&slug)?;
    let enabled = state.page(kind).toggle_auto_refresh();
    tracing::info!(page = %kind, enabled, "auto-refresh toggled");
    Ok(Redirect::to(&back_to(kind)))
}

/// Where a POST redirects to. History pages return to their in-memory view
/// so the current filter survives.
fn back_to(kind: PageKind) -> String {
    if kind.is_history() {
        format!("/{}/view", kind.slug())
    } else {
        kind.path()
    }
}

fn rejected(state: &SharedState, err: SelectionError) -> Response {
    tracing::debug!(error = %err, "rejected bot selection");
    (
        StatusCode::BAD_REQUEST,
        Html(state.render(PageKind::BotHealth, Some(err.to_string()))),
    )
        .into_response()
}

async fn select_range(State(state): State<SharedState>, Form(form): Form<RangeForm>) -> Response {
    let selection = match EntitySelection::from_range(form.start, form.end) {
        Ok(selection) => selection,
        Err(e) => return rejected(&state, e),
    };
    let saved = SavedSelection {
        start: form.start,
        end: form.end,
        bot_ids: selection.ids().to_vec(),
        ..state.saved()
    };
    match state.select(selection, saved).await {
        Ok(()) => Redirect::to(&PageKind::BotHealth.path()).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn select_manual(State(state): State<SharedState>, Form(form): Form<ManualForm>) -> Response {
    let selection = match EntitySelection::from_manual(&form.manual) {
        Ok(selection) => selection,
        Err(e) => return rejected(&state, e),
    };
    let saved = SavedSelection {
        manual: form.manual,
        bot_ids: selection.ids().to_vec(),
        ..state.saved()
    };
    match state.select(selection, saved).await {
        Ok(()) => Redirect::to(&PageKind::BotHealth.path()).into_response(),
        Err(e) => e.into_response(),
    }
}
