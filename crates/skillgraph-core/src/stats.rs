use crate::cache::CacheSnapshot;
use crate::signals::{stale_entries, StaleEntry};
use crate::types::{entry_key, Rank, Rarity, Strength};
use crate::usage::UsageMap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankRow {
    pub rank: Rank,
    pub active: usize,
    pub parked: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogStats {
    pub total: usize,
    pub active: usize,
    /// Non-empty ranks only, highest first (UR before N, S before C).
    pub distribution: Vec<RankRow>,
    pub long_unused: Vec<StaleEntry>,
    pub downgrade_candidates: Vec<StaleEntry>,
}

pub fn collect(
    snap: &CacheSnapshot,
    usage: &UsageMap,
    now: DateTime<Utc>,
    stale_after: chrono::Duration,
) -> CatalogStats {
    let active_keys: BTreeSet<&str> = snap.active.iter().map(|n| entry_key(n)).collect();

    let mut distribution = Vec::new();
    for rarity in Rarity::all().iter().rev() {
        for strength in Strength::all().iter().rev() {
            let rank = Rank::new(*rarity, *strength);
            let (active, parked) = snap
                .meta
                .iter()
                .filter(|(_, m)| m.rank == rank)
                .fold((0, 0), |(a, p), (name, _)| {
                    if active_keys.contains(entry_key(name)) {
                        (a + 1, p)
                    } else {
                        (a, p + 1)
                    }
                });
            if active + parked > 0 {
                distribution.push(RankRow {
                    rank,
                    active,
                    parked,
                });
            }
        }
    }

    let long_unused = stale_entries(snap, usage, now, stale_after);
    let downgrade_candidates = long_unused
        .iter()
        .filter(|e| e.rank.rarity.is_high())
        .cloned()
        .collect();

    CatalogStats {
        total: snap.meta.len(),
        active: active_keys.len(),
        distribution,
        long_unused,
        downgrade_candidates,
    }
}
