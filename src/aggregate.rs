//! Aggregation over parsed issue records.
//!
//! Everything here is a pure function over an in-memory record slice: entity
//! worst-of health, fleet and issue counts, average resolution time, the
//! history sort and the live dashboard grouping.

use chrono::{DateTime, Utc};

use crate::parser::{IssueRecord, OperationalStatus, Priority, Severity};

/// Health of one tracked component on one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentHealth<'a> {
    pub component: &'a str,
    pub status: Severity,
    /// The most severe matching issue, if any
    pub issue: Option<&'a IssueRecord>,
}

/// Overall health of one entity across the tracked components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityHealth {
    pub status: Severity,
    pub healthy_count: usize,
    pub total_components: usize,
}

/// Look up a component's health for an entity.
///
/// Components compare case-insensitively. With several matching issues the
/// worst severity wins; ties keep the first one encountered.
pub fn component_health<'a>(
    records: &'a [IssueRecord],
    entity_id: &str,
    component: &'a str,
) -> ComponentHealth<'a> {
    let wanted = component.to_lowercase();
    let mut worst: Option<&IssueRecord> = None;

    for record in records
        .iter()
        .filter(|r| r.entity_id == entity_id && r.component.to_lowercase() == wanted)
    {
        if worst.is_none_or(|current| record.severity > current.severity) {
            worst = Some(record);
        }
    }

    ComponentHealth {
        component,
        status: worst.map(|r| r.severity).unwrap_or_default(),
        issue: worst,
    }
}

/// Health of every tracked component for an entity, in component order.
pub fn component_breakdown<'a>(
    records: &'a [IssueRecord],
    entity_id: &str,
    components: &'a [String],
) -> Vec<ComponentHealth<'a>> {
    components
        .iter()
        .map(|c| component_health(records, entity_id, c))
        .collect()
}

/// Worst-of status across the tracked components.
pub fn entity_health(records: &[IssueRecord], entity_id: &str, components: &[String]) -> EntityHealth {
    let breakdown = component_breakdown(records, entity_id, components);
    EntityHealth {
        status: breakdown
            .iter()
            .map(|h| h.status)
            .max()
            .unwrap_or_default(),
        healthy_count: breakdown
            .iter()
            .filter(|h| h.status == Severity::Healthy)
            .count(),
        total_components: components.len(),
    }
}

/// Number of entities in each overall state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FleetSummary {
    pub total: usize,
    pub healthy: usize,
    pub degraded: usize,
    pub critical: usize,
}

pub fn fleet_summary<'a>(healths: impl IntoIterator<Item = &'a EntityHealth>) -> FleetSummary {
    healths
        .into_iter()
        .fold(FleetSummary::default(), |mut summary, health| {
            summary.total += 1;
            match health.status {
                Severity::Healthy => summary.healthy += 1,
                Severity::Degraded => summary.degraded += 1,
                Severity::Critical => summary.critical += 1,
            }
            summary
        })
}

/// Raw issue counts by state, priority and reported bot status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IssueCounts {
    pub total: usize,
    pub open: usize,
    pub closed: usize,
    by_priority: [usize; 4],
    pub operational: usize,
    pub degraded: usize,
    pub down: usize,
}

impl IssueCounts {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a IssueRecord>) -> Self {
        let mut counts = Self::default();
        for record in records {
            counts.total += 1;
            if record.is_closed() {
                counts.closed += 1;
            } else {
                counts.open += 1;
            }
            counts.by_priority[record.priority as usize] += 1;
            match record.operational_status {
                OperationalStatus::Operational => counts.operational += 1,
                OperationalStatus::Degraded => counts.degraded += 1,
                OperationalStatus::Down => counts.down += 1,
            }
        }
        counts
    }

    pub fn priority(&self, priority: Priority) -> usize {
        self.by_priority[priority as usize]
    }

    /// Critical issues, i.e. `P0`.
    pub fn critical(&self) -> usize {
        self.priority(Priority::P0)
    }
}

/// Mean open-to-close time in whole minutes over closed records.
pub fn average_resolution_minutes<'a>(
    records: impl IntoIterator<Item = &'a IssueRecord>,
) -> Option<i64> {
    let durations: Vec<f64> = records
        .into_iter()
        .filter(|r| r.is_closed())
        .filter_map(|r| r.closed_at.map(|closed| closed - r.created_at))
        .map(|d| d.num_milliseconds().max(0) as f64 / 60_000.0)
        .collect();

    if durations.is_empty() {
        return None;
    }
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;
    Some(mean.round() as i64)
}

/// `"<h>h <m>m"`, `"<m>m"`, or `"N/A"`.
pub fn format_average_resolution(minutes: Option<i64>) -> String {
    match minutes {
        None => "N/A".to_string(),
        Some(minutes) => {
            let minutes = minutes.max(0);
            let hours = minutes / 60;
            let mins = minutes % 60;
            if hours > 0 {
                format!("{}h {}m", hours, mins)
            } else {
                format!("{}m", mins)
            }
        }
    }
}

pub fn average_resolution<'a>(records: impl IntoIterator<Item = &'a IssueRecord>) -> String {
    format_average_resolution(average_resolution_minutes(records))
}

/// Most recently updated first. Stable for equal timestamps.
pub fn sort_by_updated_desc(records: &mut [&IssueRecord]) {
    records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

/// Issues of one entity on the live dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityGroup<'a> {
    pub entity_id: &'a str,
    /// Worst reported status among the group's issues
    pub status: OperationalStatus,
    pub issues: Vec<&'a IssueRecord>,
}

/// Group records by entity and order groups down, degraded, operational.
///
/// Groups keep first-encounter order within the same status.
pub fn group_by_entity(records: &[IssueRecord]) -> Vec<EntityGroup<'_>> {
    let mut groups: Vec<EntityGroup<'_>> = Vec::new();

    for record in records {
        match groups.iter_mut().find(|g| g.entity_id == record.entity_id) {
            Some(group) => {
                if record.operational_status.rank() < group.status.rank() {
                    group.status = record.operational_status;
                }
                group.issues.push(record);
            }
            None => groups.push(EntityGroup {
                entity_id: &record.entity_id,
                status: record.operational_status,
                issues: vec![record],
            }),
        }
    }

    groups.sort_by_key(|g| g.status.rank());
    groups
}

fn plural(n: i64, unit: &str) -> String {
    format!("{} {}{}", n, unit, if n != 1 { "s" } else { "" })
}

/// Human duration since `from`: `"2 days 3h"`, `"1 hour 5m"`, `"12 minutes"`.
pub fn time_since(from: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - from).num_minutes().max(0);
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{} {}h", plural(days, "day"), hours % 24)
    } else if hours > 0 {
        format!("{} {}m", plural(hours, "hour"), minutes % 60)
    } else {
        plural(minutes, "minute")
    }
}

/// Open-to-close duration for a closed record; `None` while open.
pub fn resolution_time(record: &IssueRecord) -> Option<String> {
    if !record.is_closed() {
        return None;
    }
    let closed = record.closed_at?;
    let minutes = (closed - record.created_at).num_minutes().max(0);
    let hours = minutes / 60;
    let days = hours / 24;

    Some(if days > 0 {
        format!("{} {}h {}m", plural(days, "day"), hours % 24, minutes % 60)
    } else if hours > 0 {
        format!("{} {}m", plural(hours, "hour"), minutes % 60)
    } else {
        plural(minutes, "minute")
    })
}
