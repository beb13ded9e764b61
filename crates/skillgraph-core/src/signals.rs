use crate::cache::CacheSnapshot;
use crate::types::{entry_key, Rank};
use crate::usage::UsageMap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

/// An active entry that has gone unused for longer than the staleness window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleEntry {
    /// Name as installed in the active root (may carry a leading `_`).
    pub name: String,
    pub rank: Rank,
    pub last_used: Option<DateTime<Utc>>,
}

impl StaleEntry {
    pub fn last_used_label(&self) -> String {
        match self.last_used {
            Some(at) => at.format("%Y-%m-%d").to_string(),
            None => "never".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Signals {
    pub undefined_combos: Vec<String>,
    pub stale: Vec<StaleEntry>,
}

impl Signals {
    pub fn collect(
        snap: &CacheSnapshot,
        usage: &UsageMap,
        now: DateTime<Utc>,
        stale_after: chrono::Duration,
    ) -> Self {
        Self {
            undefined_combos: undefined_combos(snap),
            stale: stale_entries(snap, usage, now, stale_after),
        }
    }
}

/// Active entries whose descriptor is known but declares no `combos:` list.
/// Entries without a descriptor in the pool are left out: nothing could be written
/// for them.
pub fn undefined_combos(snap: &CacheSnapshot) -> Vec<String> {
    snap.active
        .iter()
        .filter(|name| {
            snap.meta
                .get(entry_key(name))
                .is_some_and(|meta| !meta.has_combos)
        })
        .cloned()
        .collect()
}

/// Active entries never used, or last used more than `stale_after` ago. Sorted by
/// name and deduplicated by key, so `_pdf` and `pdf` count once.
pub fn stale_entries(
    snap: &CacheSnapshot,
    usage: &UsageMap,
    now: DateTime<Utc>,
    stale_after: chrono::Duration,
) -> Vec<StaleEntry> {
    let mut seen = HashSet::new();
    let mut stale = Vec::new();
    for name in &snap.active {
        let key = entry_key(name);
        if !seen.insert(key) {
            continue;
        }
        let last_used = usage.get(key).and_then(|u| u.last_used_at);
        let is_stale = match last_used {
            None => true,
            Some(at) => now - at > stale_after,
        };
        if is_stale {
            stale.push(StaleEntry {
                name: name.clone(),
                rank: snap.meta.get(key).map(|m| m.rank).unwrap_or_default(),
                last_used,
            });
        }
    }
    stale
}
