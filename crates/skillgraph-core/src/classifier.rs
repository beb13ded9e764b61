use crate::config::PolicyConfig;
use crate::paths::CatalogLayout;
use crate::signals::{Signals, StaleEntry};
use crate::types::Risk;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// EvalContext
// ---------------------------------------------------------------------------

pub struct EvalContext<'a> {
    pub signals: &'a Signals,
    pub layout: &'a CatalogLayout,
    pub policy: &'a PolicyConfig,
}

// ---------------------------------------------------------------------------
// Action (output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub title: String,
    pub risk: Risk,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Entries lacking a combo list; non-empty means the generator should run.
    pub generate_for: Vec<String>,
    /// MEDIUM and HIGH items, in rule order.
    pub review: Vec<Action>,
}

impl Classification {
    pub fn needs_generation(&self) -> bool {
        !self.generate_for.is_empty()
    }

    pub fn count(&self, risk: Risk) -> usize {
        self.review.iter().filter(|a| a.risk == risk).count()
    }
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// A fn-pointer review rule over stale entries. The risk is fixed per rule.
pub struct Rule {
    pub id: &'static str,
    pub risk: Risk,
    pub selects: fn(&StaleEntry) -> bool,
    /// How many selected entries are reported, in signal order.
    pub limit: fn(&PolicyConfig) -> usize,
    pub title: fn(&StaleEntry) -> String,
    pub detail: fn(&EvalContext, &StaleEntry) -> String,
    pub command: Option<fn(&EvalContext, &StaleEntry) -> String>,
}

impl Rule {
    fn apply(&self, ctx: &EvalContext) -> Vec<Action> {
        ctx.signals
            .stale
            .iter()
            .filter(|entry| (self.selects)(entry))
            .take((self.limit)(ctx.policy))
            .map(|entry| Action {
                title: (self.title)(entry),
                risk: self.risk,
                detail: (self.detail)(ctx, entry),
                command: self.command.map(|f| f(ctx, entry)),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

pub struct Classifier {
    rules: Vec<Rule>,
}

impl Classifier {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Rules apply independently: one entry may appear under several of them.
    pub fn classify(&self, ctx: &EvalContext) -> Classification {
        let review = self
            .rules
            .iter()
            .flat_map(|rule| {
                let actions = rule.apply(ctx);
                if !actions.is_empty() {
                    tracing::debug!("rule {}: {} item(s)", rule.id, actions.len());
                }
                actions
            })
            .collect();
        Classification {
            generate_for: ctx.signals.undefined_combos.clone(),
            review,
        }
    }
}
