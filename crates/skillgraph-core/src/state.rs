use crate::classifier::Action;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// What the orchestrator last put in front of a human. Used only to avoid
/// re-notifying when nothing changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorState {
    pub last_run: DateTime<Utc>,
    pub pending_count: usize,
    pub titles: Vec<String>,
}

impl OrchestratorState {
    pub fn from_review(review: &[Action], now: DateTime<Utc>) -> Self {
        Self {
            last_run: now,
            pending_count: review.len(),
            titles: review.iter().map(|a| a.title.clone()).collect(),
        }
    }

    pub fn title_set(&self) -> BTreeSet<&str> {
        self.titles.iter().map(String::as_str).collect()
    }

    /// Same review items as `review`, ignoring order.
    pub fn matches(&self, review: &[Action]) -> bool {
        let current: BTreeSet<&str> = review.iter().map(|a| a.title.as_str()).collect();
        self.title_set() == current
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    /// Load the previous state. Missing or unreadable state means "no previous run".
    pub fn load(path: &Path) -> Option<Self> {
        let data = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&data) {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::warn!("discarding unreadable state {}: {e}", path.display());
                None
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }
}
