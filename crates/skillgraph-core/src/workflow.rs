//! Workflow chains from the master document.
//!
//! Chains live in a Markdown table inside a `###` section whose heading contains
//! the configured title:
//!
//! ```text
//! ### Skill Workflows
//! | Flow | Chain | Description |
//! |------|-------|-------------|
//! | **UI build** | design-brief → style-reference(Pick) → _frontend | ... |
//! ```

use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::sync::OnceLock;

static ROW_RE: OnceLock<Regex> = OnceLock::new();
static PAREN_RE: OnceLock<Regex> = OnceLock::new();

fn row_re() -> &'static Regex {
    ROW_RE.get_or_init(|| Regex::new(r"^\|\s*\*\*(.+?)\*\*\s*\|\s*(.+?)\s*\|\s*(.+?)\s*\|").unwrap())
}

fn paren_re() -> &'static Regex {
    PAREN_RE.get_or_init(|| Regex::new(r"\(.*?\)").unwrap())
}

const CHAIN_SEPARATOR: char = '→';

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowChain {
    pub name: String,
    pub entries: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkflowParse {
    pub chains: Vec<WorkflowChain>,
    /// Bold-led rows that did not fit the three-column contract or named nothing.
    pub skipped: usize,
}

/// Reduce a chain cell to an entry name: `skill-forge(Create)` → `skill-forge`,
/// `_mcp-builder` → `mcp-builder`, `pptx/docx` → `pptx`.
pub fn normalize_name(raw: &str) -> String {
    let name = paren_re().replace_all(raw.trim(), "");
    let name = name.trim_start_matches('_');
    let name = name.split('/').next().unwrap_or_default();
    name.trim().to_string()
}

/// Parse the workflow section of `text`. A section that cannot be found yields
/// an empty result.
pub fn parse(text: &str, section_title: &str) -> WorkflowParse {
    let mut lines = text.lines();
    let found = lines
        .by_ref()
        .any(|line| line.starts_with("###") && line.contains(section_title));
    if !found {
        tracing::warn!("workflow section '{section_title}' not found");
        return WorkflowParse::default();
    }

    let mut result = WorkflowParse::default();
    for line in lines.take_while(|line| !line.starts_with("##")) {
        let trimmed = line.trim();
        if !trimmed.starts_with('|') || !trimmed.contains("**") {
            continue;
        }
        let Some(caps) = row_re().captures(trimmed) else {
            tracing::debug!("skipping malformed workflow row: {trimmed}");
            result.skipped += 1;
            continue;
        };
        let name = caps[1].trim().to_string();
        let entries: Vec<String> = caps[2]
            .split(CHAIN_SEPARATOR)
            .map(normalize_name)
            .filter(|n| !n.is_empty())
            .collect();
        if entries.is_empty() {
            tracing::debug!("skipping workflow row with empty chain: {name}");
            result.skipped += 1;
            continue;
        }
        // a repeated flow name replaces the earlier row
        match result.chains.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.entries = entries,
            None => result.chains.push(WorkflowChain { name, entries }),
        }
    }
    result
}

/// Read and parse the workflow document; a missing file yields an empty result.
pub fn load(path: &Path, section_title: &str) -> WorkflowParse {
    match std::fs::read_to_string(path) {
        Ok(text) => parse(&text, section_title),
        Err(e) => {
            tracing::warn!("cannot read workflow document {}: {e}", path.display());
            WorkflowParse::default()
        }
    }
}
