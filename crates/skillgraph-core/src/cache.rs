//! Time-bounded snapshot of catalog metadata.
//!
//! A [`MetadataCache`] is constructed once per invocation and passed by reference.
//! The first access loads the persisted snapshot from the session directory when it
//! is younger than the TTL; otherwise the catalog is rescanned and the new snapshot
//! persisted. The snapshot is then served unchanged until [`MetadataCache::invalidate`].

use crate::descriptor::Descriptor;
use crate::io;
use crate::paths::{CatalogLayout, DESCRIPTOR_FILE};
use crate::types::{entry_key, Rank};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// CacheSnapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMeta {
    pub rank: Rank,
    pub has_combos: bool,
}

impl Default for EntryMeta {
    fn default() -> Self {
        Self {
            rank: Rank::default(),
            has_combos: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSnapshot {
    /// Names installed in the active root, sorted.
    pub active: Vec<String>,
    pub meta: BTreeMap<String, EntryMeta>,
    /// Directed adjacency: `a -> [b, ...]` when a's descriptor cites b.
    pub cross_refs: BTreeMap<String, Vec<String>>,
    /// Build time, epoch seconds.
    pub ts: i64,
}

impl CacheSnapshot {
    /// Scan the catalog. Never fails: missing roots contribute nothing and
    /// unreadable descriptors contribute default metadata.
    pub fn build(layout: &CatalogLayout, now: DateTime<Utc>) -> Self {
        let active = io::child_names(&layout.active_dir);

        let root = layout.descriptor_root();
        let mut meta = BTreeMap::new();
        let mut cross_refs = BTreeMap::new();
        for name in io::child_names(root) {
            let path = root.join(&name).join(DESCRIPTOR_FILE);
            if !path.is_file() {
                continue;
            }
            let d = Descriptor::load(&path, &name);
            meta.insert(
                name.clone(),
                EntryMeta {
                    rank: d.rank,
                    has_combos: d.has_combos,
                },
            );
            if !d.cross_refs.is_empty() {
                cross_refs.insert(name, d.cross_refs);
            }
        }

        tracing::debug!(
            "scanned catalog: {} active, {} described",
            active.len(),
            meta.len()
        );
        Self {
            active,
            meta,
            cross_refs,
            ts: now.timestamp(),
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        now.timestamp().saturating_sub(self.ts) < ttl
    }

    pub fn active_set(&self) -> BTreeSet<String> {
        self.active.iter().cloned().collect()
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.binary_search_by(|n| n.as_str().cmp(name)).is_ok()
    }

    /// Metadata for `name`, looked up by its key (leading `_` ignored) first.
    pub fn meta_for(&self, name: &str) -> Option<&EntryMeta> {
        self.meta
            .get(entry_key(name))
            .or_else(|| self.meta.get(name))
    }

    pub fn rank_of(&self, name: &str) -> Rank {
        self.meta_for(name).map(|m| m.rank).unwrap_or_default()
    }

    /// Every name with metadata; the set combo scoring treats as known.
    pub fn known(&self) -> BTreeSet<String> {
        self.meta.keys().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// MetadataCache
// ---------------------------------------------------------------------------

pub type Clock = Box<dyn Fn() -> DateTime<Utc>>;

pub struct MetadataCache {
    layout: CatalogLayout,
    ttl: Duration,
    clock: Clock,
    current: RefCell<Option<Rc<CacheSnapshot>>>,
}

impl MetadataCache {
    pub fn new(layout: CatalogLayout, ttl: Duration) -> Self {
        Self {
            layout,
            ttl,
            clock: Box::new(Utc::now),
            current: RefCell::new(None),
        }
    }

    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn layout(&self) -> &CatalogLayout {
        &self.layout
    }

    /// The current snapshot, loading or building it on first use.
    pub fn snapshot(&self) -> Rc<CacheSnapshot> {
        if let Some(snap) = self.current.borrow().as_ref() {
            return Rc::clone(snap);
        }
        let now = (self.clock)();
        let snap = Rc::new(match self.load_persisted(now) {
            Some(snap) => snap,
            None => {
                let snap = CacheSnapshot::build(&self.layout, now);
                self.persist(&snap);
                snap
            }
        });
        *self.current.borrow_mut() = Some(Rc::clone(&snap));
        snap
    }

    pub fn active_set(&self) -> BTreeSet<String> {
        self.snapshot().active_set()
    }

    pub fn meta(&self) -> BTreeMap<String, EntryMeta> {
        self.snapshot().meta.clone()
    }

    pub fn cross_refs(&self) -> BTreeMap<String, Vec<String>> {
        self.snapshot().cross_refs.clone()
    }

    /// Drop the in-memory snapshot and delete the persisted one; the next access
    /// rescans.
    pub fn invalidate(&self) {
        self.current.borrow_mut().take();
        let path = self.layout.snapshot_path();
        match io::remove_if_exists(&path) {
            Ok(true) => tracing::debug!("invalidated {}", path.display()),
            Ok(false) => {}
            Err(e) => tracing::warn!("cannot remove {}: {e}", path.display()),
        }
    }

    fn load_persisted(&self, now: DateTime<Utc>) -> Option<CacheSnapshot> {
        let path = self.layout.snapshot_path();
        let data = std::fs::read_to_string(&path).ok()?;
        let snap: CacheSnapshot = match serde_json::from_str(&data) {
            Ok(snap) => snap,
            Err(e) => {
                tracing::warn!("discarding unreadable snapshot {}: {e}", path.display());
                return None;
            }
        };
        if snap.is_fresh(now, self.ttl) {
            tracing::debug!("using snapshot from {}", snap.ts);
            Some(snap)
        } else {
            tracing::debug!("snapshot from {} expired", snap.ts);
            None
        }
    }

    fn persist(&self, snap: &CacheSnapshot) {
        let path = self.layout.snapshot_path();
        let result = serde_json::to_vec(snap)
            .map_err(crate::SkillgraphError::from)
            .and_then(|data| io::atomic_write(&path, &data));
        if let Err(e) = result {
            tracing::warn!("cannot persist snapshot {}: {e}", path.display());
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
