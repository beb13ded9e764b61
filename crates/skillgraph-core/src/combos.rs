//! Relationship scoring and combo write-back.
//!
//! Two sources feed the score of a directed pair `a -> b`:
//!
//! - workflow chains: neighbours in a chain score 3, any other pair in the same
//!   chain scores 1;
//! - cross-references: `a` citing `b` scores 2, and a mutual citation adds 1 in
//!   each direction.
//!
//! Each entry keeps its best `max_combos` partners ordered by score, then name.

use crate::cache::MetadataCache;
use crate::config::Config;
use crate::descriptor;
use crate::error::{Result, SkillgraphError};
use crate::io;
use crate::workflow::{self, WorkflowChain};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

const ADJACENT: u32 = 3;
const SAME_CHAIN: u32 = 1;
const CITED: u32 = 2;
const MUTUAL: u32 = 1;

pub type Scores = BTreeMap<String, BTreeMap<String, u32>>;

/// Score every directed pair of known entries.
pub fn score_candidates(
    chains: &[WorkflowChain],
    cross_refs: &BTreeMap<String, Vec<String>>,
    known: &BTreeSet<String>,
) -> Scores {
    let mut scores: Scores = BTreeMap::new();
    let mut bump = |from: &str, to: &str, by: u32| {
        *scores
            .entry(from.to_string())
            .or_default()
            .entry(to.to_string())
            .or_default() += by;
    };

    for chain in chains {
        let valid: Vec<&str> = chain
            .entries
            .iter()
            .map(String::as_str)
            .filter(|name| known.contains(*name))
            .collect();
        for (i, a) in valid.iter().enumerate() {
            for (j, b) in valid.iter().enumerate() {
                if a == b {
                    continue;
                }
                let by = if i.abs_diff(j) == 1 { ADJACENT } else { SAME_CHAIN };
                bump(a, b, by);
            }
        }
    }

    for (a, refs) in cross_refs {
        if !known.contains(a) {
            continue;
        }
        for b in refs.iter().filter(|b| known.contains(*b)) {
            bump(a, b, CITED);
            let mutual = cross_refs.get(b).is_some_and(|back| back.contains(a));
            if mutual {
                bump(a, b, MUTUAL);
                bump(b, a, MUTUAL);
            }
        }
    }

    scores
}

/// Ranked combo lists for every entry with at least one candidate.
pub fn build_combos(
    chains: &[WorkflowChain],
    cross_refs: &BTreeMap<String, Vec<String>>,
    known: &BTreeSet<String>,
    max_combos: usize,
) -> BTreeMap<String, Vec<String>> {
    score_candidates(chains, cross_refs, known)
        .into_iter()
        .filter_map(|(name, partners)| {
            let mut ranked: Vec<(String, u32)> = partners.into_iter().collect();
            ranked.sort_by(|(an, ascore), (bn, bscore)| bscore.cmp(ascore).then(an.cmp(bn)));
            let combos: Vec<String> = ranked
                .into_iter()
                .take(max_combos)
                .map(|(partner, _)| partner)
                .collect();
            (!combos.is_empty()).then_some((name, combos))
        })
        .collect()
}

/// Write `combos` into the descriptor at `path`. Returns whether the file changed.
pub fn rewrite_combos(path: &Path, combos: &[String]) -> Result<bool> {
    let text = std::fs::read_to_string(path)?;
    if !descriptor::has_front_matter(&text) {
        return Err(SkillgraphError::MissingFrontMatter(
            path.display().to_string(),
        ));
    }
    match descriptor::write_combos(&text, combos) {
        Some(updated) => {
            io::atomic_write(path, updated.as_bytes())?;
            Ok(true)
        }
        None => Ok(false),
    }
}

// ---------------------------------------------------------------------------
// Generation run
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct ComboReport {
    pub flows: usize,
    pub skipped_rows: usize,
    pub known: usize,
    pub with_candidates: usize,
    /// Entries whose descriptor was (or, in a dry run, would be) rewritten.
    pub updated: Vec<String>,
    pub unchanged: usize,
    pub failed: Vec<String>,
    pub dry_run: bool,
    #[serde(skip)]
    pub combos: BTreeMap<String, Vec<String>>,
}

impl ComboReport {
    /// Every entry with candidates failed to write.
    pub fn all_failed(&self) -> bool {
        !self.failed.is_empty() && self.updated.is_empty() && self.unchanged == 0
    }
}

/// Score the catalog and write combo lists back. Per-entry failures are logged
/// and listed in the report; the cache is invalidated when anything was written.
pub fn generate(cache: &MetadataCache, config: &Config, dry_run: bool) -> ComboReport {
    let layout = cache.layout();
    let parsed = workflow::load(&layout.workflow_doc, &config.workflow.section);
    let snap = cache.snapshot();
    let known = snap.known();
    let combos = build_combos(
        &parsed.chains,
        &snap.cross_refs,
        &known,
        config.policy.max_combos,
    );

    let mut report = ComboReport {
        flows: parsed.chains.len(),
        skipped_rows: parsed.skipped,
        known: known.len(),
        with_candidates: combos.len(),
        dry_run,
        ..Default::default()
    };

    for (name, list) in &combos {
        let path = layout.descriptor_path(name);
        if dry_run {
            let would_change = std::fs::read_to_string(&path)
                .ok()
                .and_then(|text| descriptor::write_combos(&text, list))
                .is_some();
            if would_change {
                report.updated.push(name.clone());
            } else {
                report.unchanged += 1;
            }
            continue;
        }
        match rewrite_combos(&path, list) {
            Ok(true) => {
                tracing::info!("{name}: combos = [{}]", list.join(", "));
                report.updated.push(name.clone());
            }
            Ok(false) => report.unchanged += 1,
            Err(e) => {
                tracing::warn!("{name}: combos not written: {e}");
                report.failed.push(name.clone());
            }
        }
    }

    if !dry_run && !report.updated.is_empty() {
        cache.invalidate();
    }
    report.combos = combos;
    report
}
