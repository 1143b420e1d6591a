//! CLI command implementations.
//!
//! Each submodule owns one `Commands` variant:
//!
//! | Module   | Commands handled |
//! |----------|------------------|
//! | `serve`  | `Serve`          |
//! | `render` | `Render`         |
//! | `watch`  | `Watch`          |
//! | `bots`   | `Bots`           |
//! | `config` | `Config`         |

pub mod bots;
pub mod config;
pub mod render;
pub mod serve;
pub mod watch;

use anyhow::Result;
use std::path::{Path, PathBuf};

use msort_health::config::{CONFIG_FILE, HealthConfig};

pub use bots::cmd_bots;
pub use config::cmd_config;
pub use render::cmd_render;
pub use serve::cmd_serve;
pub use watch::cmd_watch;

/// Config file named on the command line, or `./msort-health.toml`.
pub fn config_path(cli: &super::Cli) -> PathBuf {
    cli.config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

/// Load the config file (defaults when absent) with environment overrides.
pub fn load_config(path: &Path) -> Result<HealthConfig> {
    let config = HealthConfig::load_or_default(path)?.with_env()?;
    for warning in config.validate() {
        tracing::warn!(config = %path.display(), "{}", warning);
    }
    Ok(config)
}
