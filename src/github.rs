//! GitHub issue-listing client.
//!
//! Every page load issues exactly one unauthenticated request against
//! `GET {api_base}/repos/{owner}/{repo}/issues`, filtered by label and state and
//! capped at one page of 100 results. There is no retry and no pagination.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::{Deserialize, Serialize};

use crate::errors::FetchError;

/// Media type requested from the REST API.
pub const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Default REST API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// GitHub's page size cap; the dashboards never look past the first page.
pub const PER_PAGE: u32 = 100;

const USER_AGENT_VALUE: &str = concat!("msort-health/", env!("CARGO_PKG_VERSION"));

/// A label attached to an issue (subset of fields).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLabel {
    pub name: String,
}

/// A GitHub issue as returned by the listing endpoint (subset of fields).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawIssue {
    pub number: i64,
    pub title: Option<String>,
    pub body: Option<String>,
    #[serde(default)]
    pub labels: Vec<RawLabel>,
    pub html_url: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    /// Pull requests also come through the issues endpoint; filter them out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Value>,
}

/// Which issue states to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateFilter {
    Open,
    All,
}

impl StateFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateFilter::Open => "open",
            StateFilter::All => "all",
        }
    }
}

/// Label and state filter for one listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueQuery {
    pub labels: Vec<String>,
    pub state: StateFilter,
}

impl IssueQuery {
    pub fn new(label: impl Into<String>, state: StateFilter) -> Self {
        Self {
            labels: vec![label.into()],
            state,
        }
    }

    /// Query-string pairs sent with the request.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("labels", self.labels.join(",")),
            ("state", self.state.as_str().to_string()),
            ("per_page", PER_PAGE.to_string()),
        ]
    }
}

/// Anything that can produce a raw issue list for a query.
#[async_trait]
pub trait IssueSource: Send + Sync {
    async fn fetch(&self, query: &IssueQuery) -> Result<Vec<RawIssue>, FetchError>;
}

/// Issue source backed by the GitHub REST API.
pub struct GitHubFetcher {
    client: reqwest::Client,
    api_base: String,
    owner: String,
    repo: String,
}

impl GitHubFetcher {
    pub fn new(
        api_base: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Issue-listing endpoint for the configured repository.
    pub fn issues_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/issues",
            self.api_base.trim_end_matches('/'),
            self.owner,
            self.repo
        )
    }
}

/// Browser URL of a repository, used for the page header link.
pub fn repo_html_url(owner: &str, repo: &str) -> String {
    format!("https://github.com/{}/{}", owner, repo)
}

#[async_trait]
impl IssueSource for GitHubFetcher {
    async fn fetch(&self, query: &IssueQuery) -> Result<Vec<RawIssue>, FetchError> {
        let url = self.issues_url();
        tracing::debug!(%url, labels = %query.labels.join(","), state = query.state.as_str(), "fetching issues");

        let resp = self
            .client
            .get(&url)
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .query(&query.params())
            .send()
            .await
            .map_err(FetchError::Network)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let issues: Vec<RawIssue> = resp.json().await.map_err(FetchError::Decode)?;
        Ok(issues
            .into_iter()
            .filter(|i| i.pull_request.is_none())
            .collect())
    }
}
