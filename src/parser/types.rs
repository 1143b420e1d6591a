//! Typed issue records derived from raw tracker issues.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel for any labeled field that could not be found.
pub const UNKNOWN: &str = "Unknown";

/// Issue priority, `P0` being the most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    P0,
    P1,
    P2,
    #[default]
    P3,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::P0, Priority::P1, Priority::P2, Priority::P3];

    /// Map a priority digit (`0`–`3`) to a priority.
    pub fn from_digit(digit: char) -> Option<Self> {
        match digit {
            '0' => Some(Priority::P0),
            '1' => Some(Priority::P1),
            '2' => Some(Priority::P2),
            '3' => Some(Priority::P3),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::P0 => "p0",
            Priority::P1 => "p1",
            Priority::P2 => "p2",
            Priority::P3 => "p3",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health classification derived from the free-text component status.
///
/// Variant order is the severity order, so `max()` yields the worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Healthy,
    Degraded,
    Critical,
}

impl Severity {
    /// Classify a component status description.
    pub fn from_component_status(status: &str) -> Self {
        let status = status.to_lowercase();
        if status.contains("non-functional") || status.contains("completely down") {
            Severity::Critical
        } else if status.contains("intermittent")
            || status.contains("degraded")
            || status.contains("error")
        {
            Severity::Degraded
        } else {
            Severity::Healthy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Healthy => "healthy",
            Severity::Degraded => "degraded",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a bot is still running, as reported by the issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationalStatus {
    #[default]
    Operational,
    Degraded,
    Down,
}

impl OperationalStatus {
    /// Sort rank for the live dashboard: down first, operational last.
    pub fn rank(&self) -> u8 {
        match self {
            OperationalStatus::Down => 0,
            OperationalStatus::Degraded => 1,
            OperationalStatus::Operational => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationalStatus::Operational => "operational",
            OperationalStatus::Degraded => "degraded",
            OperationalStatus::Down => "down",
        }
    }
}

impl std::fmt::Display for OperationalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Open/closed state of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
        }
    }
}

impl std::fmt::Display for IssueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IssueState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(IssueState::Open),
            "closed" => Ok(IssueState::Closed),
            _ => anyhow::bail!("Invalid issue state '{}'. Valid values: open, closed", s),
        }
    }
}

/// One parsed issue report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRecord {
    /// Bot identifier from the `[ID]` title prefix, or the page's fixed entity
    pub entity_id: String,
    pub component: String,
    pub component_status: String,
    pub category: String,
    pub clarity: String,
    /// Free-text description block; empty when absent
    pub description: String,
    /// Reporter-supplied start time, verbatim; empty when absent
    pub issue_time: String,
    pub priority: Priority,
    pub operational_status: OperationalStatus,
    /// Title with the entity prefix stripped
    pub title: String,
    pub number: i64,
    pub url: String,
    pub state: IssueState,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub severity: Severity,
}

impl IssueRecord {
    pub fn is_open(&self) -> bool {
        self.state == IssueState::Open
    }

    pub fn is_closed(&self) -> bool {
        self.state == IssueState::Closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_non_functional_is_critical() {
        assert_eq!(
            Severity::from_component_status("Non-functional (stopped)"),
            Severity::Critical
        );
        assert_eq!(
            Severity::from_component_status("Completely down"),
            Severity::Critical
        );
    }

    #[test]
    fn test_severity_non_functional_wins_over_degraded() {
        assert_eq!(
            Severity::from_component_status("Degraded, now non-functional"),
            Severity::Critical
        );
    }

    #[test]
    fn test_severity_degraded_keywords() {
        for status in ["Intermittent", "Degraded performance", "Error on startup"] {
            assert_eq!(Severity::from_component_status(status), Severity::Degraded);
        }
    }

    #[test]
    fn test_severity_other_text_is_healthy() {
        assert_eq!(Severity::from_component_status("Unknown"), Severity::Healthy);
        assert_eq!(Severity::from_component_status("Working"), Severity::Healthy);
        assert_eq!(Severity::from_component_status(""), Severity::Healthy);
    }

    #[test]
    fn test_severity_ordering_is_worst_last() {
        assert!(Severity::Critical > Severity::Degraded);
        assert!(Severity::Degraded > Severity::Healthy);
        let worst = [Severity::Healthy, Severity::Critical, Severity::Degraded]
            .into_iter()
            .max();
        assert_eq!(worst, Some(Severity::Critical));
    }

    #[test]
    fn test_priority_from_digit() {
        assert_eq!(Priority::from_digit('0'), Some(Priority::P0));
        assert_eq!(Priority::from_digit('3'), Some(Priority::P3));
        assert_eq!(Priority::from_digit('4'), None);
        assert_eq!(Priority::default(), Priority::P3);
    }

    #[test]
    fn test_operational_status_rank() {
        assert!(OperationalStatus::Down.rank() < OperationalStatus::Degraded.rank());
        assert!(OperationalStatus::Degraded.rank() < OperationalStatus::Operational.rank());
    }

    #[test]
    fn test_issue_state_from_str() {
        assert_eq!("open".parse::<IssueState>().unwrap(), IssueState::Open);
        assert_eq!("CLOSED".parse::<IssueState>().unwrap(), IssueState::Closed);
        assert!("merged".parse::<IssueState>().is_err());
    }

    #[test]
    fn test_priority_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Priority::P1).unwrap(), "\"p1\"");
        assert_eq!(serde_json::to_string(&Severity::Degraded).unwrap(), "\"degraded\"");
    }
}
