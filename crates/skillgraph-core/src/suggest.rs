//! Combo hints after an entry is used, shown once per entry per session.

use crate::cache::CacheSnapshot;
use crate::descriptor::Descriptor;
use crate::io;
use crate::paths::{CatalogLayout, DESCRIPTOR_FILE};
use crate::types::entry_key;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub const MAX_SUGGESTIONS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "suggestions", rename_all = "snake_case")]
pub enum SuggestOutcome {
    AlreadyShown,
    NoDescriptor,
    NoCombos,
    Show(Vec<Suggestion>),
}

/// Locate the descriptor for a used entry name. `plugin:name` becomes
/// `plugin-name`, and both the plain and `_`-prefixed spellings are tried, first
/// in the extended pool and then in the active root.
pub fn find_descriptor(layout: &CatalogLayout, used: &str) -> Option<PathBuf> {
    let mut candidates = vec![used.to_string(), used.replace(':', "-")];
    let toggled: Vec<String> = candidates
        .iter()
        .map(|name| match name.strip_prefix('_') {
            Some(bare) => bare.to_string(),
            None => format!("_{name}"),
        })
        .collect();
    candidates.extend(toggled);
    candidates.dedup();

    [&layout.pool_dir, &layout.active_dir]
        .into_iter()
        .flat_map(|root| {
            candidates
                .iter()
                .map(move |name| root.join(name).join(DESCRIPTOR_FILE))
        })
        .find(|path| path.is_file())
}

fn load_shown(path: &Path) -> BTreeSet<String> {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|data| serde_json::from_str(&data).ok())
        .unwrap_or_default()
}

fn save_shown(path: &Path, shown: &BTreeSet<String>) {
    let result = serde_json::to_vec(shown)
        .map_err(crate::SkillgraphError::from)
        .and_then(|data| io::atomic_write(path, &data));
    if let Err(e) = result {
        tracing::warn!("cannot record shown combos in {}: {e}", path.display());
    }
}

/// Combo partners of `used`, at most [`MAX_SUGGESTIONS`], each flagged with
/// whether it is currently active. Records `used` as shown when anything is
/// returned.
pub fn suggest(layout: &CatalogLayout, snap: &CacheSnapshot, used: &str) -> SuggestOutcome {
    let used = used.trim();
    let shown_path = layout.combo_shown_path();
    let mut shown = load_shown(&shown_path);
    if shown.contains(used) {
        return SuggestOutcome::AlreadyShown;
    }

    let Some(path) = find_descriptor(layout, used) else {
        tracing::debug!("no descriptor for {used}");
        return SuggestOutcome::NoDescriptor;
    };
    let descriptor = Descriptor::load(&path, used);
    if descriptor.combos.is_empty() {
        return SuggestOutcome::NoCombos;
    }

    let active_keys: BTreeSet<&str> = snap.active.iter().map(|n| entry_key(n)).collect();
    let suggestions = descriptor
        .combos
        .iter()
        .take(MAX_SUGGESTIONS)
        .map(|name| Suggestion {
            name: name.clone(),
            active: active_keys.contains(entry_key(name)),
        })
        .collect();

    shown.insert(used.to_string());
    save_shown(&shown_path, &shown);
    SuggestOutcome::Show(suggestions)
}
