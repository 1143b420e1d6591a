//! Persisted bot selection for the health grid.
//!
//! The only state the dashboards keep between runs: the range inputs, the
//! manual list, and the bot ids last generated from them, stored as one JSON
//! blob (`bot-health.json`) in the state directory.

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::entities::{DEFAULT_RANGE, EntitySelection};
use crate::errors::StoreError;

/// File name of the persisted selection inside the state directory.
pub const SELECTION_FILE: &str = "bot-health.json";

/// Shape of the persisted selection blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSelection {
    #[serde(default = "default_start")]
    pub start: u32,
    #[serde(default = "default_end")]
    pub end: u32,
    #[serde(default)]
    pub manual: String,
    #[serde(default, rename = "botIds")]
    pub bot_ids: Vec<String>,
}

fn default_start() -> u32 {
    DEFAULT_RANGE.0
}

fn default_end() -> u32 {
    DEFAULT_RANGE.1
}

impl Default for SavedSelection {
    fn default() -> Self {
        Self {
            start: default_start(),
            end: default_end(),
            manual: String::new(),
            bot_ids: Vec::new(),
        }
    }
}

impl SavedSelection {
    pub fn selection(&self) -> EntitySelection {
        EntitySelection::new(self.bot_ids.clone())
    }
}

/// Reads and writes the selection blob.
#[derive(Debug, Clone)]
pub struct SelectionStore {
    path: PathBuf,
}

impl SelectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<state_dir>/bot-health.json`.
    pub fn in_dir(state_dir: &Path) -> Self {
        Self::new(state_dir.join(SELECTION_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved selection. A missing file yields the defaults.
    pub fn load(&self) -> Result<SavedSelection, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SavedSelection::default());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&content).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    /// Persist the selection. Writers are serialized on a lock file and the
    /// blob is replaced by rename, so readers see either the old or the new
    /// content.
    pub fn save(&self, saved: &SavedSelection) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(saved).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        let lock = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.sibling(".lock"))
            .map_err(io_err)?;
        lock.lock_exclusive().map_err(io_err)?;

        let tmp = self.sibling(".tmp");
        let result = std::fs::File::create(&tmp)
            .and_then(|mut file| {
                file.write_all(content.as_bytes())?;
                file.sync_all()
            })
            .and_then(|_| std::fs::rename(&tmp, &self.path));
        if result.is_err() {
            let _ = std::fs::remove_file(&tmp);
        }
        let _ = FileExt::unlock(&lock);
        result.map_err(io_err)?;

        tracing::debug!(path = %self.path.display(), bots = saved.bot_ids.len(), "saved bot selection");
        Ok(())
    }
}
