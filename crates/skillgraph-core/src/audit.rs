//! Workflow audit: chain references that name no catalog entry.
//!
//! The session pass is cheap: it fingerprints the workflow document and only
//! re-audits when the digest changed since the last run. Broken references go to
//! a short issues file in the session directory, removed again once clean.

use crate::cache::CacheSnapshot;
use crate::config::Config;
use crate::error::Result;
use crate::io;
use crate::paths::CatalogLayout;
use crate::types::entry_key;
use crate::workflow::{self, WorkflowChain};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

/// Broken references listed in the issues file before the rest are summarised.
const ISSUE_PREVIEW: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenRef {
    pub flow: String,
    pub entry: String,
}

impl fmt::Display for BrokenRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.flow, self.entry)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub flows: usize,
    pub references: usize,
    pub broken: Vec<BrokenRef>,
    /// Active entries that appear in no chain.
    pub unlisted_active: Vec<String>,
}

/// Check every chain entry against the pool and the active set.
pub fn audit(chains: &[WorkflowChain], snap: &CacheSnapshot, ignore: &[String]) -> AuditReport {
    let mut known = snap.known();
    known.extend(snap.active.iter().map(|n| entry_key(n).to_string()));

    let mut report = AuditReport {
        flows: chains.len(),
        ..Default::default()
    };
    let mut listed = BTreeSet::new();
    for chain in chains {
        for entry in chain.entries.iter().filter(|e| !ignore.contains(e)) {
            report.references += 1;
            listed.insert(entry.as_str());
            if !known.contains(entry) {
                report.broken.push(BrokenRef {
                    flow: chain.name.clone(),
                    entry: entry.clone(),
                });
            }
        }
    }

    let mut unlisted: Vec<String> = snap
        .active
        .iter()
        .map(|n| entry_key(n))
        .filter(|n| !listed.contains(n))
        .map(str::to_string)
        .collect();
    unlisted.sort();
    unlisted.dedup();
    report.unlisted_active = unlisted;
    report
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditState {
    pub digest: String,
    pub last_run: DateTime<Utc>,
    pub broken_count: usize,
}

impl AuditState {
    pub fn load(path: &Path) -> Option<Self> {
        let data = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&data).ok()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        io::atomic_write(path, data.as_bytes())
    }
}

pub fn digest(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "report", rename_all = "snake_case")]
pub enum AuditOutcome {
    /// There is no workflow document to audit.
    MissingDocument,
    /// The document has not changed since the last audit.
    Unchanged,
    Checked(AuditReport),
}

/// Audit the workflow document.
///
/// Unless `full` is set, an unchanged document is skipped and its issues file
/// cleared. Never fails; I/O problems are logged.
pub fn run(
    layout: &CatalogLayout,
    snap: &CacheSnapshot,
    config: &Config,
    full: bool,
    now: DateTime<Utc>,
) -> AuditOutcome {
    let Ok(text) = std::fs::read_to_string(&layout.workflow_doc) else {
        tracing::debug!("no workflow document at {}", layout.workflow_doc.display());
        return AuditOutcome::MissingDocument;
    };

    let state_path = layout.audit_state_path();
    let current = digest(text.as_bytes());
    let unchanged = AuditState::load(&state_path).is_some_and(|s| s.digest == current);
    if unchanged && !full {
        if let Err(e) = io::remove_if_exists(&layout.issues_path()) {
            tracing::warn!("cannot remove {}: {e}", layout.issues_path().display());
        }
        return AuditOutcome::Unchanged;
    }

    let parsed = workflow::parse(&text, &config.workflow.section);
    let report = audit(&parsed.chains, snap, &config.workflow.ignore);

    let state = AuditState {
        digest: current,
        last_run: now,
        broken_count: report.broken.len(),
    };
    if let Err(e) = state.save(&state_path) {
        tracing::warn!("cannot save {}: {e}", state_path.display());
    }
    if !full {
        if let Err(e) = write_issues(&layout.issues_path(), &report.broken) {
            tracing::warn!("cannot write {}: {e}", layout.issues_path().display());
        }
    }
    AuditOutcome::Checked(report)
}

pub fn render_issues(broken: &[BrokenRef]) -> Option<String> {
    if broken.is_empty() {
        return None;
    }
    let mut lines = vec![
        "## Workflow references to fix".to_string(),
        format!(
            "{} workflow references name no entry. Run `skillgraph audit --full` for details.",
            broken.len()
        ),
    ];
    lines.extend(broken.iter().take(ISSUE_PREVIEW).map(|b| format!("- {b}")));
    if broken.len() > ISSUE_PREVIEW {
        lines.push(format!("- ... and {} more", broken.len() - ISSUE_PREVIEW));
    }
    Some(lines.join("\n") + "\n")
}

fn write_issues(path: &Path, broken: &[BrokenRef]) -> Result<()> {
    match render_issues(broken) {
        Some(doc) => io::atomic_write(path, doc.as_bytes()),
        None => io::remove_if_exists(path).map(|_| ()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::EntryMeta;
    use chrono::TimeZone;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap()
    }

    fn snapshot(pool: &[&str], active: &[&str]) -> CacheSnapshot {
        CacheSnapshot {
            active: active.iter().map(|s| s.to_string()).collect(),
            meta: pool
                .iter()
                .map(|s| (s.to_string(), EntryMeta::default()))
                .collect::<BTreeMap<_, _>>(),
            cross_refs: BTreeMap::new(),
            ts: now().timestamp(),
        }
    }

    fn chain(name: &str, entries: &[&str]) -> WorkflowChain {
        WorkflowChain {
            name: name.to_string(),
            entries: entries.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn reports_missing_entries_per_flow() {
        let snap = snapshot(&["brief", "style"], &["_local", "brief", "extra"]);
        let chains = vec![
            chain("UI", &["brief", "style", "gone"]),
            chain("Ops", &["local", "duckdb", "gone"]),
        ];
        let report = audit(&chains, &snap, &["duckdb".to_string()]);

        assert_eq!(report.flows, 2);
        assert_eq!(report.references, 5);
        let broken: Vec<String> = report.broken.iter().map(|b| b.to_string()).collect();
        assert_eq!(broken, vec!["UI: gone", "Ops: gone"]);
        assert_eq!(report.unlisted_active, vec!["extra"]);
    }

    #[test]
    fn issues_file_previews_five() {
        let broken: Vec<BrokenRef> = (0..7)
            .map(|i| BrokenRef {
                flow: "F".to_string(),
                entry: format!("e{i}"),
            })
            .collect();
        let doc = render_issues(&broken).unwrap();
        assert!(doc.starts_with("## Workflow references to fix\n7 workflow references"));
        assert!(doc.contains("- F: e4\n"));
        assert!(!doc.contains("e5"));
        assert!(doc.ends_with("- ... and 2 more\n"));
        assert!(render_issues(&[]).is_none());
    }

    #[test]
    fn session_pass_skips_unchanged_document() {
        let dir = TempDir::new().unwrap();
        let layout = CatalogLayout::under(dir.path());
        let snap = snapshot(&["brief"], &["brief"]);
        let config = Config::default();
        std::fs::create_dir_all(layout.workflow_doc.parent().unwrap()).unwrap();
        std::fs::write(
            &layout.workflow_doc,
            "### Skill Workflows\n| **UI** | brief → gone | x |\n",
        )
        .unwrap();

        let first = run(&layout, &snap, &config, false, now());
        match first {
            AuditOutcome::Checked(report) => assert_eq!(report.broken.len(), 1),
            other => panic!("expected Checked, got {other:?}"),
        }
        assert!(std::fs::read_to_string(layout.issues_path())
            .unwrap()
            .contains("- UI: gone"));

        assert_eq!(run(&layout, &snap, &config, false, now()), AuditOutcome::Unchanged);
        assert!(!layout.issues_path().exists());

        // --full always audits, and leaves the issues file alone
        assert!(matches!(
            run(&layout, &snap, &config, true, now()),
            AuditOutcome::Checked(_)
        ));
        assert!(!layout.issues_path().exists());

        std::fs::write(
            &layout.workflow_doc,
            "### Skill Workflows\n| **UI** | brief | x |\n",
        )
        .unwrap();
        match run(&layout, &snap, &config, false, now()) {
            AuditOutcome::Checked(report) => assert!(report.broken.is_empty()),
            other => panic!("expected Checked, got {other:?}"),
        }
        let state = AuditState::load(&layout.audit_state_path()).unwrap();
        assert_eq!(state.broken_count, 0);
    }

    #[test]
    fn missing_document_is_reported() {
        let dir = TempDir::new().unwrap();
        let layout = CatalogLayout::under(dir.path());
        let outcome = run(&layout, &snapshot(&[], &[]), &Config::default(), true, now());
        assert_eq!(outcome, AuditOutcome::MissingDocument);
    }

    #[test]
    fn digest_is_hex_sha256() {
        assert_eq!(
            digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
