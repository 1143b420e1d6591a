//! Auto-refreshing render loop (`msort-health watch`).

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use msort_health::config::HealthConfig;
use msort_health::page::PageKind;
use msort_health::refresh::AutoRefresh;
use msort_health::ui::icons::REFRESH;

use super::render::{page_for, render_html, write_html};

pub async fn cmd_watch(config: &HealthConfig, kind: PageKind, output: &Path) -> Result<()> {
    let (page, saved) = page_for(config, kind)?;

    // Errors are kept in the page state and rendered as the error panel.
    let _ = page.load().await;
    write_html(output, &render_html(config, &page, &saved))?;

    let refresh = AutoRefresh::new(config.refresh_interval());
    eprintln!(
        "{}Watching {} every {}s, writing {} (Ctrl+C to stop)",
        REFRESH,
        kind,
        refresh.interval().as_secs(),
        output.display()
    );

    let config = config.clone();
    let output: PathBuf = output.to_path_buf();
    refresh.start(move || {
        let page = page.clone();
        let config = config.clone();
        let saved = saved.clone();
        let output = output.clone();
        async move {
            let _ = page.load().await;
            if let Err(e) = write_html(&output, &render_html(&config, &page, &saved)) {
                tracing::warn!(error = %e, "failed to write page");
            }
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;
    refresh.stop();
    eprintln!("\nStopped.");
    Ok(())
}
