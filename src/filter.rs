//! Client-side filtering over an already-fetched record set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::parser::{IssueRecord, IssueState};

/// Selected filter values. `None` (or an empty string from a form) means no
/// constraint on that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default, alias = "bot")]
    pub entity: Option<String>,
    #[serde(default)]
    pub component: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

fn selected(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl FilterState {
    /// Drop empty selections so they compare equal to "no constraint".
    pub fn normalized(self) -> Self {
        Self {
            entity: self.entity.filter(|v| !v.is_empty()),
            component: self.component.filter(|v| !v.is_empty()),
            category: self.category.filter(|v| !v.is_empty()),
            state: self.state.filter(|v| !v.is_empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        selected(&self.entity).is_none()
            && selected(&self.component).is_none()
            && selected(&self.category).is_none()
            && selected(&self.state).is_none()
    }

    /// Selected entity, if any.
    pub fn entity(&self) -> Option<&str> {
        selected(&self.entity)
    }

    /// Exact, case-sensitive match on every selected dimension.
    pub fn matches(&self, record: &IssueRecord) -> bool {
        if let Some(entity) = selected(&self.entity)
            && record.entity_id != entity
        {
            return false;
        }
        if let Some(component) = selected(&self.component)
            && record.component != component
        {
            return false;
        }
        if let Some(category) = selected(&self.category)
            && record.category != category
        {
            return false;
        }
        if let Some(state) = selected(&self.state)
            && record.state.as_str() != state
        {
            return false;
        }
        true
    }

    pub fn apply<'a>(&self, records: &'a [IssueRecord]) -> Vec<&'a IssueRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Distinct values offered by the filter drop-downs, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub entities: Vec<String>,
    pub components: Vec<String>,
    pub categories: Vec<String>,
    pub states: Vec<IssueState>,
}

impl FilterOptions {
    pub fn from_records(records: &[IssueRecord]) -> Self {
        let distinct = |f: fn(&IssueRecord) -> &str| -> Vec<String> {
            records
                .iter()
                .map(f)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(String::from)
                .collect()
        };

        Self {
            entities: distinct(|r| r.entity_id.as_str()),
            components: distinct(|r| r.component.as_str()),
            categories: distinct(|r| r.category.as_str()),
            states: vec![IssueState::Open, IssueState::Closed],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::test_support::*;
    use crate::parser::{EntityRule, IssueParser};

    fn sample() -> Vec<IssueRecord> {
        let mut with_category = raw_issue(
            3,
            "[B2] c",
            "### Affected Component\nDiverter\n### Issue Category\nMechanical",
            &[],
        );
        with_category.updated_at = at(5);
        IssueParser::new(EntityRule::Bracketed).parse_all(&[
            raw_issue(1, "[B1] a", &body("Diverter", "Degraded"), &[]),
            closed_issue(2, "[B1] b", &body("AFC", "Non-functional"), 60),
            with_category,
        ])
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let records = sample();
        let filter = FilterState::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&records).len(), 3);
    }

    #[test]
    fn test_empty_strings_mean_no_constraint() {
        let records = sample();
        let filter = FilterState {
            entity: Some(String::new()),
            component: Some(String::new()),
            category: None,
            state: Some(String::new()),
        };
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&records).len(), 3);
        assert_eq!(filter.normalized(), FilterState::default());
    }

    #[test]
    fn test_filters_combine() {
        let records = sample();
        let filter = FilterState {
            entity: Some("B1".into()),
            state: Some("open".into()),
            ..Default::default()
        };
        let matched = filter.apply(&records);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].number, 1);
    }

    #[test]
    fn test_filter_by_category() {
        let records = sample();
        let filter = FilterState {
            category: Some("Mechanical".into()),
            ..Default::default()
        };
        let matched = filter.apply(&records);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].number, 3);
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let records = sample();
        let filter = FilterState {
            component: Some("diverter".into()),
            ..Default::default()
        };
        assert!(filter.apply(&records).is_empty());
    }

    #[test]
    fn test_zero_matches_is_empty_not_error() {
        let records = sample();
        let filter = FilterState {
            entity: Some("B99".into()),
            ..Default::default()
        };
        assert!(filter.apply(&records).is_empty());
        assert!(filter.apply(&[]).is_empty());
    }

    #[test]
    fn test_filter_options_are_sorted_and_distinct() {
        let options = FilterOptions::from_records(&sample());
        assert_eq!(options.entities, vec!["B1", "B2"]);
        assert_eq!(options.components, vec!["AFC", "Diverter"]);
        assert_eq!(options.categories, vec!["Mechanical", "Unknown"]);
        assert_eq!(options.states.len(), 2);
    }

    #[test]
    fn test_filter_state_deserializes_bot_alias() {
        let filter: FilterState = serde_json::from_str(r#"{"bot":"B7"}"#).unwrap();
        assert_eq!(filter.entity(), Some("B7"));
    }
}
