use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use msort_health::logging::{self, LogFormat, LogOptions};
use msort_health::page::PageKind;

mod cmd;

#[derive(Parser)]
#[command(name = "msort-health")]
#[command(version, about = "Robot and infeed health dashboards built from GitHub issue reports")]
pub struct Cli {
    /// Path to msort-health.toml (defaults to ./msort-health.toml)
    #[arg(long, global = true, env = "MSORT_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Human)]
    pub log_format: LogFormat,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the dashboard pages over HTTP
    Serve {
        /// Port to serve on (overrides [server] port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Open the dashboard in a browser after the server starts
        #[arg(long)]
        open: bool,

        /// Dev mode: bind all interfaces and allow any CORS origin
        #[arg(long)]
        dev: bool,
    },
    /// Fetch once and write a page as HTML
    Render {
        /// dashboard, infeed, bot-health, history or infeed-history
        page: PageKind,

        /// Only issues for this bot (history)
        #[arg(long)]
        bot: Option<String>,

        /// Only issues for this component (history pages)
        #[arg(long)]
        component: Option<String>,

        /// Only issues in this category (infeed history)
        #[arg(long)]
        category: Option<String>,

        /// Only open or closed issues (history pages)
        #[arg(long)]
        state: Option<String>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Re-render a page to a file on every refresh interval until Ctrl+C
    Watch {
        page: PageKind,

        #[arg(short, long)]
        output: PathBuf,

        /// Refresh interval in seconds (overrides [refresh] interval_secs)
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Manage the bot selection shown on the health grid
    Bots {
        #[command(subcommand)]
        command: BotsCommands,
    },
    /// View, validate or create the configuration file
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum BotsCommands {
    /// Select B<start> through B<end>
    Range { start: u32, end: u32 },
    /// Select a list of bots, e.g. `B1 B5 8` or `"B1, B2"`
    Manual { ids: Vec<String> },
    /// Show the saved selection
    Show,
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Validate the configuration file
    Validate,
    /// Create a default msort-health.toml
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let _log_guard = logging::init(&LogOptions {
        verbose: cli.verbose,
        format: cli.log_format,
        file: cli.log_file.clone(),
    })?;

    let config_path = cmd::config_path(&cli);

    match &cli.command {
        Commands::Serve { port, open, dev } => {
            let config = cmd::load_config(&config_path)?;
            cmd::cmd_serve(&config, *port, *open, *dev).await?;
        }
        Commands::Render {
            page,
            bot,
            component,
            category,
            state,
            output,
        } => {
            let config = cmd::load_config(&config_path)?;
            let filter = msort_health::filter::FilterState {
                entity: bot.clone(),
                component: component.clone(),
                category: category.clone(),
                state: state.clone(),
            };
            cmd::cmd_render(&config, *page, filter, output.as_deref()).await?;
        }
        Commands::Watch {
            page,
            output,
            interval,
        } => {
            let mut config = cmd::load_config(&config_path)?;
            if let Some(secs) = interval {
                config.refresh.interval_secs = *secs;
            }
            cmd::cmd_watch(&config, *page, output).await?;
        }
        Commands::Bots { command } => {
            let config = cmd::load_config(&config_path)?;
            cmd::cmd_bots(&config, command.clone())?;
        }
        Commands::Config { command } => {
            cmd::cmd_config(&config_path, command.clone())?;
        }
    }

    Ok(())
}
