//! One orchestration pass: collect signals, classify, apply LOW actions, and
//! refresh the review queue only when its contents changed.

use crate::cache::MetadataCache;
use crate::classifier::{Action, Classifier, EvalContext};
use crate::config::Config;
use crate::review;
use crate::rules::default_rules;
use crate::runner::{ComboGenerator, GeneratorOutcome};
use crate::signals::{Signals, StaleEntry};
use crate::state::OrchestratorState;
use crate::types::Risk;
use crate::usage;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub auto_items: Vec<String>,
    /// LOW actions that were attempted but did not complete.
    pub not_applied: Vec<String>,
    pub review: Vec<Action>,
    pub undefined_combos: Vec<String>,
    pub stale: Vec<StaleEntry>,
    /// The review queue matched the previous run and was left as it was.
    pub suppressed: bool,
}

impl RunReport {
    pub fn count(&self, risk: Risk) -> usize {
        self.review.iter().filter(|a| a.risk == risk).count()
    }
}

pub struct RunOptions {
    /// Always rewrite the review queue, even when nothing changed.
    pub full: bool,
    pub now: DateTime<Utc>,
}

/// Run one pass. Never fails: I/O problems are logged and the pass continues.
pub fn run(
    cache: &MetadataCache,
    config: &Config,
    generator: &dyn ComboGenerator,
    opts: &RunOptions,
) -> RunReport {
    let layout = cache.layout();
    let snap = cache.snapshot();
    let usage = usage::load(&layout.usage_file);
    let signals = Signals::collect(&snap, &usage, opts.now, config.policy.stale_after());

    let ctx = EvalContext {
        signals: &signals,
        layout,
        policy: &config.policy,
    };
    let classification = Classifier::new(default_rules()).classify(&ctx);

    let mut report = RunReport {
        review: classification.review.clone(),
        ..Default::default()
    };

    // LOW: applied on every pass; generation is idempotent
    if classification.needs_generation() {
        let n = classification.generate_for.len();
        match generator.generate() {
            GeneratorOutcome::Applied => {
                tracing::info!("generated combos for {n} undefined entries");
                report.auto_items.push(format!("combos generated ({n} entries)"));
            }
            GeneratorOutcome::NotApplied(reason) => {
                tracing::warn!("combo generation not applied: {reason}");
                report
                    .not_applied
                    .push(format!("combos for {n} entries: {reason}"));
            }
        }
    }

    let state_path = layout.state_path();
    let previous = OrchestratorState::load(&state_path);
    // an empty queue is never "unchanged": auto-applied items still need a document
    report.suppressed = !opts.full
        && !report.review.is_empty()
        && previous
            .as_ref()
            .is_some_and(|prev| prev.matches(&report.review));

    if report.suppressed {
        tracing::debug!("review queue unchanged; not rewriting");
    } else {
        let review_path = layout.review_path();
        if let Err(e) = review::write(&review_path, &report.auto_items, &report.review, opts.now)
        {
            tracing::warn!("cannot write {}: {e}", review_path.display());
        }
        let state = OrchestratorState::from_review(&report.review, opts.now);
        if let Err(e) = state.save(&state_path) {
            tracing::warn!("cannot save {}: {e}", state_path.display());
        }
    }

    report.undefined_combos = signals.undefined_combos;
    report.stale = signals.stale;
    report
}
