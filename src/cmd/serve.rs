//! Page server command (`msort-health serve`).

use anyhow::Result;

use msort_health::config::HealthConfig;
use msort_health::server::{ServerConfig, start_server};

pub async fn cmd_serve(config: &HealthConfig, port: Option<u16>, open: bool, dev: bool) -> Result<()> {
    let mut server = ServerConfig::from_config(config);
    if let Some(port) = port {
        server.port = port;
    }
    server.dev_mode = dev;

    // Skip in dev mode (usually inside a container)
    if open && !dev {
        let url = format!("http://localhost:{}", server.port);
        tokio::spawn(async move {
            // Small delay to let the server start binding
            tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
            if let Err(e) = open::that(&url) {
                tracing::warn!(error = %e, "failed to open browser");
            }
        });
    }

    start_server(config, server).await
}
