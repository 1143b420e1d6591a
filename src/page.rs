//! Page controllers.
//!
//! One `PageController` exists per page kind. It owns the page's fetched
//! records, filter, bot selection and auto-refresh timer, and runs the
//! fetch → parse → store cycle. Rendering reads a snapshot of that state.
//!
//! Overlapping loads (a manual reload racing a timer tick) are ordered by a
//! generation counter: each load takes the next generation before fetching,
//! and a result is only applied if no newer load has started since.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use crate::config::HealthConfig;
use crate::entities::EntitySelection;
use crate::errors::FetchError;
use crate::filter::FilterState;
use crate::github::{IssueQuery, IssueSource, StateFilter};
use crate::parser::{EntityRule, INFEED_ENTITY, IssueParser, IssueRecord};
use crate::refresh::AutoRefresh;

/// The dashboard pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageKind {
    /// Live robot status board
    Dashboard,
    /// Live infeed status board
    Infeed,
    /// Per-bot component health grid
    BotHealth,
    /// Robot issue history with filters
    History,
    /// Infeed issue history with filters
    InfeedHistory,
}

impl PageKind {
    pub const ALL: [PageKind; 5] = [
        PageKind::Dashboard,
        PageKind::Infeed,
        PageKind::BotHealth,
        PageKind::History,
        PageKind::InfeedHistory,
    ];

    /// URL path segment and CLI name.
    pub fn slug(&self) -> &'static str {
        match self {
            PageKind::Dashboard => "dashboard",
            PageKind::Infeed => "infeed",
            PageKind::BotHealth => "bot-health",
            PageKind::History => "history",
            PageKind::InfeedHistory => "infeed-history",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.slug() == slug)
    }

    /// Path the page is served at.
    pub fn path(&self) -> String {
        match self {
            PageKind::Dashboard => "/".to_string(),
            other => format!("/{}", other.slug()),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            PageKind::Dashboard => "Robot Status Dashboard",
            PageKind::Infeed => "Infeed Status",
            PageKind::BotHealth => "Bot Health",
            PageKind::History => "Maintenance History",
            PageKind::InfeedHistory => "Infeed History",
        }
    }

    pub fn loading_message(&self) -> &'static str {
        match self {
            PageKind::Dashboard => "Loading robot status...",
            PageKind::Infeed => "Loading infeed issues...",
            PageKind::BotHealth => "Loading bot health data...",
            PageKind::History => "Loading maintenance history...",
            PageKind::InfeedHistory => "Loading infeed issue history...",
        }
    }

    pub fn is_infeed(&self) -> bool {
        matches!(self, PageKind::Infeed | PageKind::InfeedHistory)
    }

    pub fn is_history(&self) -> bool {
        matches!(self, PageKind::History | PageKind::InfeedHistory)
    }

    pub fn entity_rule(&self) -> EntityRule {
        if self.is_infeed() {
            EntityRule::Fixed(INFEED_ENTITY)
        } else {
            EntityRule::Bracketed
        }
    }

    /// The listing request this page issues.
    pub fn query(&self, config: &HealthConfig) -> IssueQuery {
        let label = if self.is_infeed() {
            &config.labels.infeed
        } else {
            &config.labels.robot
        };
        let state = if self.is_history() {
            StateFilter::All
        } else {
            StateFilter::Open
        };
        IssueQuery::new(label.clone(), state)
    }
}

impl std::fmt::Display for PageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl std::str::FromStr for PageKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slug(&s.to_lowercase()).ok_or_else(|| {
            let valid: Vec<&str> = Self::ALL.iter().map(|k| k.slug()).collect();
            anyhow::anyhow!("Invalid page '{}'. Valid values: {}", s, valid.join(", "))
        })
    }
}

/// Mutable per-page state.
#[derive(Debug, Clone, Default)]
pub struct PageState {
    /// Records from the most recent successful load
    pub records: Vec<IssueRecord>,
    pub filter: FilterState,
    pub entities: EntitySelection,
    pub last_updated: Option<DateTime<Utc>>,
    /// Message of the most recent failed load; cleared on success
    pub error: Option<String>,
    /// Whether any load has completed successfully
    pub loaded: bool,
}

/// Result of one load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Records were replaced.
    Loaded { count: usize },
    /// A newer load started while this one was in flight; result dropped.
    Superseded,
    /// Nothing to load (health grid without configured bots).
    Skipped,
}

pub struct PageController {
    kind: PageKind,
    source: Arc<dyn IssueSource>,
    parser: IssueParser,
    query: IssueQuery,
    components: Vec<String>,
    state: RwLock<PageState>,
    generation: AtomicU64,
    auto_refresh: AutoRefresh,
}

impl PageController {
    pub fn new(kind: PageKind, source: Arc<dyn IssueSource>, config: &HealthConfig) -> Self {
        Self {
            kind,
            source,
            parser: IssueParser::new(kind.entity_rule()),
            query: kind.query(config),
            components: config.health.components.clone(),
            state: RwLock::new(PageState::default()),
            generation: AtomicU64::new(0),
            auto_refresh: AutoRefresh::new(config.refresh_interval()),
        }
    }

    pub fn kind(&self) -> PageKind {
        self.kind
    }

    pub fn query(&self) -> &IssueQuery {
        &self.query
    }

    /// Components tracked on the health grid.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn auto_refresh(&self) -> &AutoRefresh {
        &self.auto_refresh
    }

    /// Copy of the current state for rendering.
    pub fn snapshot(&self) -> PageState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut PageState) -> R) -> R {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Replace the filter. Re-rendering uses the records already in memory.
    pub fn set_filter(&self, filter: FilterState) {
        self.with_state(|s| s.filter = filter.normalized());
    }

    pub fn set_entities(&self, entities: EntitySelection) {
        self.with_state(|s| s.entities = entities);
    }

    pub fn entities(&self) -> EntitySelection {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entities
            .clone()
    }

    /// Run one fetch → parse cycle and store the result.
    pub async fn load(&self) -> Result<LoadOutcome, FetchError> {
        if self.kind == PageKind::BotHealth && self.entities().is_empty() {
            return Ok(LoadOutcome::Skipped);
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let started = Instant::now();
        let result = self.source.fetch(&self.query).await;

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(page = %self.kind, generation, "discarding superseded load");
            return Ok(LoadOutcome::Superseded);
        }

        match result {
            Ok(issues) => {
                state.records = self.parser.parse_all(&issues);
                state.last_updated = Some(Utc::now());
                state.error = None;
                state.loaded = true;
                let count = state.records.len();
                tracing::info!(
                    page = %self.kind,
                    count,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "loaded issues"
                );
                Ok(LoadOutcome::Loaded { count })
            }
            Err(e) => {
                tracing::warn!(page = %self.kind, error = %e, "failed to load issues");
                state.error = Some(format!("Error loading data: {}", e));
                Err(e)
            }
        }
    }

    /// Toggle the page's auto-refresh timer. Returns the new enabled state.
    pub fn toggle_auto_refresh(self: &Arc<Self>) -> bool {
        let page = Arc::downgrade(self);
        self.auto_refresh.toggle(move || {
            let page = page.clone();
            async move {
                if let Some(page) = page.upgrade() {
                    tracing::debug!(page = %page.kind, "auto-refresh tick");
                    // Failures are already recorded in the page state.
                    let _ = page.load().await;
                }
            }
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::parser::test_support::*;
    use std::time::Duration;

    #[test]
    fn test_page_kind_queries() {
        let config = HealthConfig::default();
        let q = PageKind::Dashboard.query(&config);
        assert_eq!(q.labels, vec!["robot-issue"]);
        assert_eq!(q.state, StateFilter::Open);
        let q = PageKind::InfeedHistory.query(&config);
        assert_eq!(q.labels, vec!["infeed-issue"]);
        assert_eq!(q.state, StateFilter::All);
        assert_eq!(PageKind::History.query(&config).state, StateFilter::All);
        assert_eq!(PageKind::BotHealth.query(&config).state, StateFilter::Open);
    }

    #[test]
    fn test_page_kind_slugs_round_trip() {
        for kind in PageKind::ALL {
            assert_eq!(kind.slug().parse::<PageKind>().unwrap(), kind);
        }
        assert_eq!(PageKind::Dashboard.path(), "/");
        assert_eq!(PageKind::BotHealth.path(), "/bot-health");
        assert!("graphs".parse::<PageKind>().is_err());
    }

    #[tokio::test]
    async fn test_load_replaces_records() {
        let page = controller(
            PageKind::Dashboard,
            FakeSource::sequence(vec![
                Ok(vec![raw_issue(1, "[B1] a", "", &[]), raw_issue(2, "[B2] b", "", &[])]),
                Ok(vec![raw_issue(3, "[B3] c", "", &[])]),
            ]),
        );
        assert_eq!(page.load().await.unwrap(), LoadOutcome::Loaded { count: 2 });
        assert_eq!(page.load().await.unwrap(), LoadOutcome::Loaded { count: 1 });

        let state = page.snapshot();
        assert!(state.loaded);
        assert!(state.last_updated.is_some());
        assert_eq!(state.records.len(), 1);
        assert_eq!(state.records[0].entity_id, "B3");
    }

    #[tokio::test]
    async fn test_load_error_is_recorded_then_cleared() {
        let page = controller(
            PageKind::Infeed,
            FakeSource::sequence(vec![Err(503), Ok(vec![raw_issue(1, "[Infeed] belt", "", &[])])]),
        );
        let err = page.load().await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        let state = page.snapshot();
        assert!(!state.loaded);
        assert_eq!(
            state.error.as_deref(),
            Some("Error loading data: GitHub API error: 503 Service Unavailable")
        );

        page.load().await.unwrap();
        let state = page.snapshot();
        assert!(state.error.is_none());
        assert_eq!(state.records[0].entity_id, "Infeed");
        assert_eq!(state.records[0].title, "belt");
    }

    #[tokio::test]
    async fn test_bot_health_without_entities_skips_fetch() {
        let source = FakeSource::new(vec![]);
        let page = controller(PageKind::BotHealth, source);
        assert_eq!(page.load().await.unwrap(), LoadOutcome::Skipped);

        page.set_entities(EntitySelection::from_range(1, 2).unwrap());
        assert_eq!(page.load().await.unwrap(), LoadOutcome::Loaded { count: 0 });
    }

    #[tokio::test]
    async fn test_filter_change_does_not_refetch() {
        let source = Arc::new(FakeSource::new(vec![
            raw_issue(1, "[B1] a", "", &[]),
            raw_issue(2, "[B2] b", "", &[]),
        ]));
        let mut config = HealthConfig::default();
        config.repo.owner = "acme".into();
        let page = PageController::new(PageKind::History, source.clone(), &config);
        page.load().await.unwrap();

        page.set_filter(FilterState {
            entity: Some("B2".into()),
            component: Some(String::new()),
            ..Default::default()
        });
        let state = page.snapshot();
        assert_eq!(state.filter.entity(), Some("B2"));
        assert_eq!(state.filter.component, None);
        assert_eq!(state.filter.apply(&state.records).len(), 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(source.queries.lock().unwrap()[0].state, StateFilter::All);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_early_load_does_not_overwrite_newer() {
        let page = controller(
            PageKind::Dashboard,
            FakeSource::sequence(vec![
                Ok(vec![raw_issue(1, "[OLD] slow", "", &[])]),
                Ok(vec![raw_issue(2, "[NEW] fast", "", &[])]),
            ])
            .with_delays(vec![Duration::from_secs(5), Duration::from_secs(1)]),
        );

        let slow = {
            let page = page.clone();
            tokio::spawn(async move { page.load().await })
        };
        tokio::task::yield_now().await;
        let fast = page.load().await.unwrap();
        let slow = slow.await.unwrap().unwrap();

        assert_eq!(fast, LoadOutcome::Loaded { count: 1 });
        assert_eq!(slow, LoadOutcome::Superseded);
        assert_eq!(page.snapshot().records[0].entity_id, "NEW");
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_reloads_on_interval() {
        let source = Arc::new(FakeSource::new(vec![raw_issue(1, "[B1] a", "", &[])]));
        let mut config = HealthConfig::default();
        config.refresh.interval_secs = 30;
        let page = Arc::new(PageController::new(PageKind::Dashboard, source.clone(), &config));

        assert!(page.toggle_auto_refresh());
        assert!(page.auto_refresh().is_enabled());
        tokio::time::sleep(Duration::from_secs(65)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        assert!(!page.toggle_auto_refresh());
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
