//! Configuration for msort-health.
//!
//! Settings are read from `msort-health.toml` and layered file → environment →
//! CLI. Every section is optional; a missing file yields the defaults.
//!
//! # Configuration File Format
//!
//! ```toml
//! [repo]
//! owner = "acme"
//! name = "msort-ops"
//! api_base = "https://api.github.com"
//!
//! [labels]
//! robot = "robot-issue"
//! infeed = "infeed-issue"
//!
//! [refresh]
//! interval_secs = 60
//!
//! [health]
//! components = ["Motherboard", "Diverter"]
//! state_dir = "/var/lib/msort-health"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8088
//! ```
//!
//! Environment overrides: `MSORT_REPO_OWNER`, `MSORT_REPO_NAME`,
//! `MSORT_API_BASE`, `MSORT_AUTO_REFRESH_INTERVAL` (seconds).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::github::{DEFAULT_API_BASE, GitHubFetcher, repo_html_url};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "msort-health.toml";

pub const ENV_REPO_OWNER: &str = "MSORT_REPO_OWNER";
pub const ENV_REPO_NAME: &str = "MSORT_REPO_NAME";
pub const ENV_API_BASE: &str = "MSORT_API_BASE";
pub const ENV_AUTO_REFRESH_INTERVAL: &str = "MSORT_AUTO_REFRESH_INTERVAL";

/// Components tracked on every bot's health card.
pub const DEFAULT_COMPONENTS: &[&str] = &[
    "Motherboard",
    "Station Reader",
    "WTM Reader",
    "AFC",
    "Drive Motor",
    "Diverter",
    "Electromagnet",
    "LCD Display",
    "Indicator Light",
    "Panel Button",
    "Panel Button LED",
    "Power Supply",
    "Wiring/Connectors",
    "Sensors",
    "Other",
];

/// Repository whose issue tracker is polled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoSection {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Default for RepoSection {
    fn default() -> Self {
        Self {
            owner: String::new(),
            name: String::new(),
            api_base: default_api_base(),
        }
    }
}

/// Issue labels that select robot and infeed reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelsSection {
    #[serde(default = "default_robot_label")]
    pub robot: String,
    #[serde(default = "default_infeed_label")]
    pub infeed: String,
}

fn default_robot_label() -> String {
    "robot-issue".to_string()
}

fn default_infeed_label() -> String {
    "infeed-issue".to_string()
}

impl Default for LabelsSection {
    fn default() -> Self {
        Self {
            robot: default_robot_label(),
            infeed: default_infeed_label(),
        }
    }
}

/// Auto-refresh timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshSection {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_interval_secs() -> u64 {
    60
}

impl Default for RefreshSection {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

/// Health grid settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSection {
    #[serde(default = "default_components")]
    pub components: Vec<String>,
    /// Where the bot selection is persisted (defaults to the user data dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
}

fn default_components() -> Vec<String> {
    DEFAULT_COMPONENTS.iter().map(|c| c.to_string()).collect()
}

impl Default for HealthSection {
    fn default() -> Self {
        Self {
            components: default_components(),
            state_dir: None,
        }
    }
}

/// Page server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8088
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Parsed `msort-health.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthConfig {
    #[serde(default)]
    pub repo: RepoSection,
    #[serde(default)]
    pub labels: LabelsSection,
    #[serde(default)]
    pub refresh: RefreshSection,
    #[serde(default)]
    pub health: HealthSection,
    #[serde(default)]
    pub server: ServerSection,
}

impl HealthConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse msort-health.toml")
    }

    /// Load from `path`, or return defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize msort-health.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Apply process environment overrides.
    pub fn with_env(self) -> Result<Self> {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(owner) = lookup(ENV_REPO_OWNER) {
            self.repo.owner = owner;
        }
        if let Some(name) = lookup(ENV_REPO_NAME) {
            self.repo.name = name;
        }
        if let Some(base) = lookup(ENV_API_BASE) {
            self.repo.api_base = base;
        }
        if let Some(interval) = lookup(ENV_AUTO_REFRESH_INTERVAL) {
            self.refresh.interval_secs = interval.trim().parse().with_context(|| {
                format!(
                    "{} must be a whole number of seconds, got '{}'",
                    ENV_AUTO_REFRESH_INTERVAL, interval
                )
            })?;
        }
        Ok(self)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_secs)
    }

    /// Directory holding the persisted bot selection.
    pub fn state_dir(&self) -> PathBuf {
        self.health.state_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("msort-health"))
                .unwrap_or_else(|| PathBuf::from(".msort-health"))
        })
    }

    /// Browser URL of the tracked repository.
    pub fn repo_url(&self) -> String {
        repo_html_url(&self.repo.owner, &self.repo.name)
    }

    /// Issue source for the configured repository.
    pub fn fetcher(&self) -> GitHubFetcher {
        GitHubFetcher::new(&self.repo.api_base, &self.repo.owner, &self.repo.name)
    }

    /// `owner/name` slug.
    pub fn repo_slug(&self) -> String {
        format!("{}/{}", self.repo.owner, self.repo.name)
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.repo.owner.trim().is_empty() {
            warnings.push(format!(
                "repo.owner is not set (set it in {} or {})",
                CONFIG_FILE, ENV_REPO_OWNER
            ));
        }
        if self.repo.name.trim().is_empty() {
            warnings.push(format!(
                "repo.name is not set (set it in {} or {})",
                CONFIG_FILE, ENV_REPO_NAME
            ));
        }
        if !self.repo.api_base.starts_with("http://") && !self.repo.api_base.starts_with("https://")
        {
            warnings.push(format!(
                "repo.api_base '{}' should be an http(s) URL",
                self.repo.api_base
            ));
        }
        if self.refresh.interval_secs == 0 {
            warnings.push("refresh.interval_secs must be greater than zero".to_string());
        }
        if self.health.components.is_empty() {
            warnings.push("health.components is empty; every bot will show as healthy".to_string());
        }

        warnings
    }
}
