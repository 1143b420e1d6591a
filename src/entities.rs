//! Bot selection for the health grid.
//!
//! Bots are named `B<number>`. A selection is built either from an inclusive
//! numeric range or from a free-form list such as `"B1, B5 8"`.

use regex::Regex;
use std::sync::LazyLock;

use crate::errors::SelectionError;

static BOT_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^B\d+$").unwrap());

static SEPARATOR_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,\s]+").unwrap());

/// Default range shown before anything has been saved.
pub const DEFAULT_RANGE: (u32, u32) = (1, 20);

/// Upper bound on the number of bots in one selection.
pub const MAX_BOTS: usize = 200;

/// An ordered list of bot ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitySelection {
    ids: Vec<String>,
}

impl EntitySelection {
    pub fn new(ids: Vec<String>) -> Self {
        Self { ids }
    }

    /// `B{start}` through `B{end}` inclusive.
    pub fn from_range(start: u32, end: u32) -> Result<Self, SelectionError> {
        if start > end {
            return Err(SelectionError::InvalidRange { start, end });
        }
        let count = u64::from(end) - u64::from(start) + 1;
        if count > MAX_BOTS as u64 {
            return Err(SelectionError::TooManyBots {
                count,
                max: MAX_BOTS,
            });
        }
        Ok(Self {
            ids: (start..=end).map(|i| format!("B{}", i)).collect(),
        })
    }

    /// Parse a comma/whitespace separated list. Bare numbers get a `B`
    /// prefix; anything that is not `B<digits>` afterwards is dropped.
    pub fn from_manual(input: &str) -> Result<Self, SelectionError> {
        if input.trim().is_empty() {
            return Err(SelectionError::EmptyInput);
        }

        let ids: Vec<String> = SEPARATOR_REGEX
            .split(input)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| {
                if id.starts_with('B') {
                    id.to_string()
                } else {
                    format!("B{}", id)
                }
            })
            .filter(|id| BOT_ID_REGEX.is_match(id))
            .collect();

        if ids.is_empty() {
            return Err(SelectionError::NoValidIds);
        }
        if ids.len() > MAX_BOTS {
            return Err(SelectionError::TooManyBots {
                count: ids.len() as u64,
                max: MAX_BOTS,
            });
        }
        Ok(Self { ids })
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn into_ids(self) -> Vec<String> {
        self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}
