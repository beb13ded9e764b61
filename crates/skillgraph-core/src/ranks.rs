//! Usage-driven strength promotion.
//!
//! Frequently used entries earn a strength floor: 5 uses → B, 10 → A, 20 → S.
//! Strength is only ever raised and rarity is never touched.

use crate::cache::MetadataCache;
use crate::descriptor;
use crate::io;
use crate::types::{Rank, Strength};
use crate::usage::UsageMap;
use serde::Serialize;

const THRESHOLDS: &[(u64, Strength)] = &[(20, Strength::S), (10, Strength::A), (5, Strength::B)];

pub fn strength_floor(count: u64) -> Option<Strength> {
    THRESHOLDS
        .iter()
        .find(|(min, _)| count >= *min)
        .map(|(_, strength)| *strength)
}

/// The rank `current` should be raised to for `count` uses, if any.
pub fn promoted(current: Rank, count: u64) -> Option<Rank> {
    let floor = strength_floor(count)?;
    (floor > current.strength).then(|| current.with_strength(floor))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankUpdate {
    pub name: String,
    pub from: Rank,
    pub to: Rank,
    pub count: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RankReport {
    pub upgraded: Vec<RankUpdate>,
    pub skipped: Vec<String>,
    pub errors: Vec<String>,
    pub dry_run: bool,
}

/// Promote every entry whose usage count earns a higher strength. The cache is
/// invalidated when any descriptor was rewritten.
pub fn update_ranks(cache: &MetadataCache, usage: &UsageMap, dry_run: bool) -> RankReport {
    let layout = cache.layout();
    let mut report = RankReport {
        dry_run,
        ..Default::default()
    };

    for (name, record) in usage {
        let count = record.count;
        if strength_floor(count).is_none() {
            report
                .skipped
                .push(format!("{name} (count={count}, below threshold)"));
            continue;
        }

        let path = layout.descriptor_path(name);
        if !path.is_file() {
            report.skipped.push(format!("{name} (no descriptor)"));
            continue;
        }
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                report.errors.push(format!("{name}: read error: {e}"));
                continue;
            }
        };
        let current: Rank = match descriptor::declared_rank(&text).map(str::parse::<Rank>) {
            Some(Ok(rank)) => rank,
            Some(Err(e)) => {
                report.skipped.push(format!("{name} ({e})"));
                continue;
            }
            None => {
                report.skipped.push(format!("{name} (no rank line)"));
                continue;
            }
        };
        let Some(target) = promoted(current, count) else {
            report
                .skipped
                .push(format!("{name} (count={count}, {current} already enough)"));
            continue;
        };

        if !dry_run {
            let Some(updated) = descriptor::write_rank(&text, target) else {
                report.errors.push(format!("{name}: rank line not rewritten"));
                continue;
            };
            if let Err(e) = io::atomic_write(&path, updated.as_bytes()) {
                report
                    .errors
                    .push(format!("{name}: {e} (count={count}, wanted {target})"));
                continue;
            }
            tracing::info!("{name}: {current} → {target} (count={count})");
        }
        report.upgraded.push(RankUpdate {
            name: name.clone(),
            from: current,
            to: target,
            count,
        });
    }

    if !dry_run && !report.upgraded.is_empty() {
        cache.invalidate();
    }
    report
}
