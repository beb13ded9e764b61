//! Mermaid rendering of the cross-reference graph, coloured by rarity tier.

use crate::cache::CacheSnapshot;
use crate::types::{entry_key, Rarity};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

const MOST_CITED: usize = 5;

fn tier_style(tier: Rarity) -> Option<&'static str> {
    match tier {
        Rarity::UR => Some("fill:#FFD700,color:#000"),
        Rarity::SR => Some("fill:#C0C0C0,color:#000"),
        Rarity::R => Some("fill:#CD7F32,color:#fff"),
        Rarity::N => None,
    }
}

/// A Mermaid-safe node id.
pub fn node_id(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn active_keys(snap: &CacheSnapshot) -> BTreeSet<&str> {
    snap.active.iter().map(|n| entry_key(n)).collect()
}

/// `graph LR` over every entry, or only SR/UR ones when `high_only`. Active
/// entries get a heavy border; edges run from citing entry to cited entry.
pub fn render_graph(snap: &CacheSnapshot, high_only: bool) -> String {
    let nodes: Vec<(&str, Rarity)> = snap
        .meta
        .iter()
        .map(|(name, meta)| (name.as_str(), meta.rank.rarity))
        .filter(|(_, tier)| !high_only || tier.is_high())
        .collect();

    let mut lines = vec!["graph LR".to_string()];
    if nodes.is_empty() {
        lines.push("    %% no entries to display".to_string());
        return lines.join("\n");
    }

    let active = active_keys(snap);
    let shown: BTreeSet<&str> = nodes.iter().map(|(name, _)| *name).collect();

    for (name, _) in &nodes {
        let id = node_id(name);
        if active.contains(name) {
            lines.push(format!("    {id}[[\"{name}\"]]"));
        } else {
            lines.push(format!("    {id}[\"{name}\"]"));
        }
    }
    lines.push(String::new());

    for (name, _) in &nodes {
        let targets = snap.cross_refs.get(*name).into_iter().flatten();
        for target in targets.filter(|t| shown.contains(t.as_str())) {
            lines.push(format!("    {} --> {}", node_id(name), node_id(target)));
        }
    }
    lines.push(String::new());

    for (name, tier) in &nodes {
        let width = if active.contains(name) { "stroke-width:3px" } else { "stroke-width:1px" };
        let style = match tier_style(*tier) {
            Some(fill) => format!("{fill},{width}"),
            None => width.to_string(),
        };
        lines.push(format!("    style {} {style}", node_id(name)));
    }
    lines.join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierCount {
    pub tier: Rarity,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapStats {
    pub total: usize,
    pub active: usize,
    /// UR first, every tier listed.
    pub tiers: Vec<TierCount>,
    /// Declared cross-references, all of them.
    pub edges: usize,
    pub most_cited: Vec<(String, usize)>,
}

pub fn stats(snap: &CacheSnapshot) -> MapStats {
    let active = active_keys(snap);
    let tiers = Rarity::all()
        .iter()
        .rev()
        .map(|&tier| TierCount {
            tier,
            count: snap.meta.values().filter(|m| m.rank.rarity == tier).count(),
        })
        .collect();

    let mut cited: BTreeMap<&str, usize> = BTreeMap::new();
    for target in snap.cross_refs.values().flatten() {
        *cited.entry(target.as_str()).or_default() += 1;
    }
    let mut most_cited: Vec<(String, usize)> =
        cited.into_iter().map(|(name, n)| (name.to_string(), n)).collect();
    most_cited.sort_by(|(an, a), (bn, b)| b.cmp(a).then(an.cmp(bn)));
    most_cited.truncate(MOST_CITED);

    MapStats {
        total: snap.meta.len(),
        active: snap.meta.keys().filter(|n| active.contains(n.as_str())).count(),
        tiers,
        edges: snap.cross_refs.values().map(Vec::len).sum(),
        most_cited,
    }
}

/// The full markdown map: SR/UR summary graph, full graph, then stats.
pub fn render_document(snap: &CacheSnapshot, date: NaiveDate) -> String {
    let st = stats(snap);
    let tiers: Vec<String> = st
        .tiers
        .iter()
        .map(|t| format!("**{}**: {}", t.tier, t.count))
        .collect();
    let cited = if st.most_cited.is_empty() {
        "  (no citations)".to_string()
    } else {
        st.most_cited
            .iter()
            .enumerate()
            .map(|(i, (name, n))| format!("  {}. `{name}`: cited {n}x", i + 1))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut doc = vec![
        format!("# Skill Map - {}", date.format("%Y-%m-%d")),
        String::new(),
        "## UR/SR relationships".to_string(),
        String::new(),
        "> gold = UR, silver = SR, heavy border = active".to_string(),
        String::new(),
        "```mermaid".to_string(),
        render_graph(snap, true),
        "```".to_string(),
        String::new(),
        "## All entries".to_string(),
        String::new(),
        "> gold = UR, silver = SR, bronze = R, plain = N, heavy border = active".to_string(),
        String::new(),
        "```mermaid".to_string(),
        render_graph(snap, false),
        "```".to_string(),
        String::new(),
        "## Stats".to_string(),
        String::new(),
        format!("- **Entries**: {}", st.total),
        format!("- **Active**: {}", st.active),
        format!("- {}", tiers.join(" / ")),
        format!("- **Cross-references**: {}", st.edges),
        String::new(),
        "### Most cited".to_string(),
        String::new(),
        cited,
    ];
    doc.push(String::new());
    doc.join("\n")
}
