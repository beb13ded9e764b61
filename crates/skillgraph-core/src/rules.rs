use crate::classifier::{EvalContext, Rule};
use crate::config::PolicyConfig;
use crate::paths::DESCRIPTOR_FILE;
use crate::signals::StaleEntry;
use crate::types::{entry_key, Rarity, Risk};

// ---------------------------------------------------------------------------
// Selection helpers
// ---------------------------------------------------------------------------

fn is_common(entry: &StaleEntry) -> bool {
    entry.rank.rarity == Rarity::N
}

fn is_high_tier(entry: &StaleEntry) -> bool {
    entry.rank.rarity.is_high()
}

fn parking_limit(policy: &PolicyConfig) -> usize {
    policy.max_parking
}

fn downgrade_limit(policy: &PolicyConfig) -> usize {
    policy.max_downgrade
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

fn parking_title(entry: &StaleEntry) -> String {
    format!("Parking candidate: `{}` [{}]", entry.name, entry.rank)
}

fn parking_detail(ctx: &EvalContext, entry: &StaleEntry) -> String {
    format!(
        "Last used: {} (unused for over {} days, rank N)",
        entry.last_used_label(),
        ctx.policy.stale_days
    )
}

/// Removing the active link parks the entry; its descriptor stays in the pool.
fn parking_command(ctx: &EvalContext, entry: &StaleEntry) -> String {
    format!("rm {}", ctx.layout.active_entry_path(&entry.name).display())
}

fn downgrade_title(entry: &StaleEntry) -> String {
    format!(
        "Downgrade candidate: `{}` [{} → {}]",
        entry.name,
        entry.rank,
        entry.rank.downgraded()
    )
}

fn downgrade_detail(ctx: &EvalContext, entry: &StaleEntry) -> String {
    format!(
        "Last used: {} (high-rank entry unused for over {} days)",
        entry.last_used_label(),
        ctx.policy.stale_days
    )
}

fn downgrade_command(ctx: &EvalContext, entry: &StaleEntry) -> String {
    let descriptor = ctx
        .layout
        .pool_dir
        .join(entry_key(&entry.name))
        .join(DESCRIPTOR_FILE);
    format!(
        "# change the rank in {DESCRIPTOR_FILE}:\n# {} → {}\n${{EDITOR:-vi}} {}",
        entry.rank,
        entry.rank.downgraded(),
        descriptor.display()
    )
}

// ---------------------------------------------------------------------------
// Default rule set
// ---------------------------------------------------------------------------

pub fn default_rules() -> Vec<Rule> {
    vec![
        // 1. Common entries gone quiet: deactivating is reversible, but a human confirms
        Rule {
            id: "park_stale_common",
            risk: Risk::Medium,
            selects: is_common,
            limit: parking_limit,
            title: parking_title,
            detail: parking_detail,
            command: Some(parking_command),
        },
        // 2. High-tier entries gone quiet: changing a rank is a judgment call
        Rule {
            id: "downgrade_stale_high_tier",
            risk: Risk::High,
            selects: is_high_tier,
            limit: downgrade_limit,
            title: downgrade_title,
            detail: downgrade_detail,
            command: Some(downgrade_command),
        },
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;
    use crate::paths::CatalogLayout;
    use crate::signals::Signals;
    use chrono::{Duration, TimeZone, Utc};
    use std::path::Path;

    fn stale(name: &str, rank: &str, days_ago: Option<i64>) -> StaleEntry {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        StaleEntry {
            name: name.to_string(),
            rank: rank.parse().unwrap(),
            last_used: days_ago.map(|d| now - Duration::days(d)),
        }
    }

    fn classify(signals: &Signals, policy: &PolicyConfig) -> crate::classifier::Classification {
        let layout = CatalogLayout::under(Path::new("/home/u"));
        let ctx = EvalContext {
            signals,
            layout: &layout,
            policy,
        };
        Classifier::new(default_rules()).classify(&ctx)
    }

    #[test]
    fn stale_high_tier_is_a_high_downgrade() {
        let signals = Signals {
            undefined_combos: vec![],
            stale: vec![stale("X", "SR-B", Some(45))],
        };
        let c = classify(&signals, &PolicyConfig::default());
        assert_eq!(c.review.len(), 1);
        let action = &c.review[0];
        assert_eq!(action.risk, Risk::High);
        assert_eq!(action.title, "Downgrade candidate: `X` [SR-B → R-B]");
        assert_eq!(
            action.detail,
            "Last used: 2026-04-17 (high-rank entry unused for over 30 days)"
        );
        let cmd = action.command.as_deref().unwrap();
        assert!(cmd.contains("# SR-B → R-B"));
        assert!(cmd.ends_with("/home/u/.agents/skills/X/SKILL.md"));
        assert!(!c.needs_generation());
    }

    #[test]
    fn never_used_common_is_a_medium_park() {
        let signals = Signals {
            undefined_combos: vec![],
            stale: vec![stale("Y", "N-C", None)],
        };
        let c = classify(&signals, &PolicyConfig::default());
        assert_eq!(c.review.len(), 1);
        assert_eq!(c.review[0].risk, Risk::Medium);
        assert_eq!(c.review[0].title, "Parking candidate: `Y` [N-C]");
        assert_eq!(
            c.review[0].command.as_deref(),
            Some("rm /home/u/.claude/skills/Y")
        );
        assert_eq!(c.count(Risk::High), 0);
    }

    #[test]
    fn rare_entries_are_left_alone() {
        let signals = Signals {
            undefined_combos: vec![],
            stale: vec![stale("r", "R-S", None)],
        };
        assert!(classify(&signals, &PolicyConfig::default()).review.is_empty());
    }

    #[test]
    fn limits_take_first_in_signal_order() {
        let mut stale_list: Vec<StaleEntry> = (0..10)
            .map(|i| stale(&format!("n{i}"), "N-B", None))
            .collect();
        stale_list.extend((0..7).map(|i| stale(&format!("u{i}"), "UR-A", Some(90))));
        let signals = Signals {
            undefined_combos: vec!["n0".to_string()],
            stale: stale_list,
        };
        let c = classify(&signals, &PolicyConfig::default());
        assert_eq!(c.count(Risk::Medium), 8);
        assert_eq!(c.count(Risk::High), 5);
        assert_eq!(c.review[0].title, "Parking candidate: `n0` [N-B]");
        assert_eq!(c.review[7].title, "Parking candidate: `n7` [N-B]");
        assert_eq!(c.review[8].title, "Downgrade candidate: `u0` [UR-A → SR-A]");
        assert!(c.needs_generation());
    }

    #[test]
    fn underscore_entry_downgrade_points_at_pool_key() {
        let signals = Signals {
            undefined_combos: vec![],
            stale: vec![stale("_core", "UR-S", None)],
        };
        let c = classify(&signals, &PolicyConfig::default());
        assert!(c.review[0]
            .command
            .as_deref()
            .unwrap()
            .ends_with(".agents/skills/core/SKILL.md"));
    }
}
