//! Configuration view and validation commands (`msort-health config`).

use anyhow::Result;
use std::path::Path;

use msort_health::config::{
    ENV_API_BASE, ENV_AUTO_REFRESH_INTERVAL, ENV_REPO_NAME, ENV_REPO_OWNER, HealthConfig,
};
use msort_health::ui::icons::{CHECK, WARN};

use super::super::ConfigCommands;

pub fn cmd_config(config_path: &Path, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("msort-health Configuration");
            println!("==========================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No config file at {}; using defaults.", config_path.display());
            }
            println!();

            let config = HealthConfig::load_or_default(config_path)?.with_env()?;
            println!("Effective values (with env overrides):");
            println!();
            print!("{}", toml::to_string_pretty(&config)?);
            println!();
            println!("state_dir (resolved) = {}", config.state_dir().display());
            println!();
            println!(
                "Environment overrides: {}, {}, {}, {}",
                ENV_REPO_OWNER, ENV_REPO_NAME, ENV_API_BASE, ENV_AUTO_REFRESH_INTERVAL
            );
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            let config = HealthConfig::load_or_default(config_path)?.with_env()?;
            let warnings = config.validate();

            if warnings.is_empty() {
                println!("{}Configuration is valid.", CHECK);
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  {}{}", WARN, warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("Config file already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }
            if let Some(parent) = config_path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }

            HealthConfig::default().save(config_path)?;

            println!("{}Created {}", CHECK, config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [repo] owner, name, api_base");
            println!("  - [labels] robot, infeed");
            println!("  - [refresh] interval_secs");
            println!("  - [health] components, state_dir");
            println!("  - [server] host, port");
            println!();
        }
    }

    Ok(())
}
