//! Local page server.
//!
//! | Module   | Purpose                                              |
//! |----------|------------------------------------------------------|
//! | `api`    | `AppState`, route table, page and selection handlers |
//! | `assets` | Embedded stylesheet (`rust-embed`)                   |

pub mod api;
pub mod assets;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::config::HealthConfig;
use crate::github::IssueSource;
use crate::store::SelectionStore;
use crate::ui::icons::GLOBE;

pub use api::{AppState, SharedState};

/// Configuration for the page server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub dev_mode: bool,
}

impl ServerConfig {
    pub fn from_config(config: &HealthConfig) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            dev_mode: false,
        }
    }
}

pub fn build_router(state: SharedState) -> Router {
    api::api_router().with_state(state)
}

/// Run the page server until Ctrl+C.
pub async fn start_server(config: &HealthConfig, server: ServerConfig) -> Result<()> {
    let source: Arc<dyn IssueSource> = Arc::new(config.fetcher());
    let state_dir = config.state_dir();
    let state = Arc::new(AppState::new(config, source, SelectionStore::in_dir(&state_dir)));

    let mut app = build_router(state);
    if server.dev_mode {
        app = app.layer(CorsLayer::permissive());
    }

    let host = if server.dev_mode { "0.0.0.0" } else { server.host.as_str() };
    let addr = format!("{}:{}", host, server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let local_addr = listener.local_addr()?;
    let url = format!("http://{}", local_addr);
    tracing::info!(%url, repo = %config.repo_slug(), state_dir = %state_dir.display(), "page server listening");
    println!("{}msort-health dashboards running at {}", GLOBE, url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("page server stopped");
    println!("Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    println!("\nShutting down...");
}
