//! Typed view of a `SKILL.md` descriptor.
//!
//! A descriptor opens with a `---` delimited front matter block holding at least
//! `rank: <RARITY>-<STRENGTH>` and optionally a `combos:` list right after it. The
//! body may carry a `## Cross-references` section whose bullets cite other entries
//! in bold (`- **pdf**: ...`, `- **_mcp-builder**`).
//!
//! Parsing never fails: anything missing or malformed resolves to the defaults of
//! [`Descriptor::default_for`].

use crate::types::{entry_key, Rank};
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

static RANK_RE: OnceLock<Regex> = OnceLock::new();
static RANK_LINE_RE: OnceLock<Regex> = OnceLock::new();
static COMBOS_KEY_RE: OnceLock<Regex> = OnceLock::new();
static COMBOS_BLOCK_RE: OnceLock<Regex> = OnceLock::new();
static CROSS_REF_RE: OnceLock<Regex> = OnceLock::new();
static RANK_INSERT_RE: OnceLock<Regex> = OnceLock::new();

fn rank_re() -> &'static Regex {
    RANK_RE.get_or_init(|| Regex::new(r"(?m)^rank:[ \t]*(\S+)").unwrap())
}

fn rank_line_re() -> &'static Regex {
    RANK_LINE_RE.get_or_init(|| Regex::new(r"(?m)^(rank:[ \t]*)(\S+)(.*)$").unwrap())
}

fn rank_insert_re() -> &'static Regex {
    RANK_INSERT_RE.get_or_init(|| Regex::new(r"(?m)^rank:.*\n").unwrap())
}

fn combos_key_re() -> &'static Regex {
    COMBOS_KEY_RE.get_or_init(|| Regex::new(r"(?m)^combos:").unwrap())
}

fn combos_block_re() -> &'static Regex {
    COMBOS_BLOCK_RE
        .get_or_init(|| Regex::new(r"(?m)^combos:[ \t]*\n(?:[ \t]+-[ \t]+.*(?:\n|$))*").unwrap())
}

fn cross_ref_re() -> &'static Regex {
    CROSS_REF_RE.get_or_init(|| Regex::new(r"-\s+\*\*_?([\w\-]+)\*\*").unwrap())
}

const CROSS_REFS_HEADING: &str = "Cross-references";

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub name: String,
    pub rank: Rank,
    /// Front matter declares a `combos:` key (possibly with an empty list).
    pub has_combos: bool,
    pub combos: Vec<String>,
    /// Entries cited under `## Cross-references`, in order, deduplicated, never
    /// including the owner.
    pub cross_refs: Vec<String>,
}

impl Descriptor {
    /// The record used when a descriptor is missing or unreadable.
    pub fn default_for(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rank: Rank::default(),
            has_combos: false,
            combos: Vec::new(),
            cross_refs: Vec::new(),
        }
    }

    pub fn parse(name: &str, text: &str) -> Self {
        let rank = match declared_rank(text) {
            Some(token) => token.parse::<Rank>().unwrap_or_else(|e| {
                tracing::debug!("{name}: {e}; using default rank");
                Rank::default()
            }),
            None => Rank::default(),
        };

        let front = front_matter(text).map(|b| &text[b.inner_start..b.close_start]);
        let has_combos = front.is_some_and(|fm| combos_key_re().is_match(fm));
        let combos = front.map(parse_combo_list).unwrap_or_default();

        Self {
            name: name.to_string(),
            rank,
            has_combos,
            combos,
            cross_refs: parse_cross_refs(name, text),
        }
    }

    /// Read and parse `path`; a missing or unreadable file yields the defaults.
    pub fn load(path: &Path, name: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(name, &text),
            Err(e) => {
                tracing::debug!("cannot read {}: {e}", path.display());
                Self::default_for(name)
            }
        }
    }
}

/// The raw value of the first `rank:` line, if any.
pub fn declared_rank(text: &str) -> Option<&str> {
    rank_re()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

// ---------------------------------------------------------------------------
// Front matter
// ---------------------------------------------------------------------------

/// Byte offsets of the front matter content, `inner_start..close_start`; the
/// closing `---` line starts at `close_start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrontMatterBounds {
    inner_start: usize,
    close_start: usize,
}

fn front_matter(text: &str) -> Option<FrontMatterBounds> {
    if !text.starts_with("---\n") {
        return None;
    }
    let inner_start = 4;
    let mut pos = inner_start;
    for line in text[inner_start..].split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some(FrontMatterBounds {
                inner_start,
                close_start: pos,
            });
        }
        pos += line.len();
    }
    None
}

/// True when `text` opens with a closed `---` front matter block.
pub fn has_front_matter(text: &str) -> bool {
    front_matter(text).is_some()
}

fn parse_combo_list(front: &str) -> Vec<String> {
    let Some(m) = combos_block_re().find(front) else {
        return Vec::new();
    };
    m.as_str()
        .lines()
        .skip(1)
        .filter_map(|line| line.trim().strip_prefix('-'))
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Cross-references
// ---------------------------------------------------------------------------

fn cross_refs_section(text: &str) -> Option<String> {
    let mut lines = text.lines();
    lines.find(|line| {
        line.starts_with("##") && line.trim_start_matches('#').trim() == CROSS_REFS_HEADING
    })?;
    let section: Vec<&str> = lines.take_while(|line| !line.starts_with("## ")).collect();
    Some(section.join("\n"))
}

fn parse_cross_refs(owner: &str, text: &str) -> Vec<String> {
    let Some(section) = cross_refs_section(text) else {
        return Vec::new();
    };
    let owner = entry_key(owner);
    let mut seen = HashSet::new();
    cross_ref_re()
        .captures_iter(&section)
        .map(|caps| caps[1].to_string())
        .filter(|name| name != owner)
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Rewrites
// ---------------------------------------------------------------------------

/// Replace the front matter `combos:` list with `combos`, leaving everything else
/// byte-for-byte intact. The list goes right after the `rank:` line, or at the top
/// of the front matter when there is no rank.
///
/// Returns `None` when there is no front matter or nothing would change.
pub fn write_combos(text: &str, combos: &[String]) -> Option<String> {
    let bounds = front_matter(text)?;
    let front = &text[bounds.inner_start..bounds.close_start];

    let mut block = String::from("combos:\n");
    for c in combos {
        block.push_str("  - ");
        block.push_str(c);
        block.push('\n');
    }

    let stripped = combos_block_re().replace_all(front, "");
    let rank_line = rank_insert_re();
    let updated = if rank_line.is_match(&stripped) {
        rank_line
            .replacen(&stripped, 1, |caps: &Captures| format!("{}{block}", &caps[0]))
            .into_owned()
    } else {
        format!("{block}{stripped}")
    };

    let mut out = String::with_capacity(text.len() + block.len());
    out.push_str(&text[..bounds.inner_start]);
    out.push_str(&updated);
    out.push_str(&text[bounds.close_start..]);
    (out != text).then_some(out)
}

/// Replace the value of the first `rank:` line, keeping whatever follows it.
///
/// Returns `None` when there is no rank line or it already holds `rank`.
pub fn write_rank(text: &str, rank: Rank) -> Option<String> {
    let re = rank_line_re();
    if !re.is_match(text) {
        return None;
    }
    let out = re
        .replacen(text, 1, |caps: &Captures| {
            format!("{}{rank}{}", &caps[1], &caps[3])
        })
        .into_owned();
    (out != text).then_some(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
