use crate::error::{Result, SkillgraphError};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants (relative to the user's home)
// ---------------------------------------------------------------------------

pub const POOL_DIR: &str = ".agents/skills";
pub const ACTIVE_DIR: &str = ".claude/skills";
pub const SESSION_DIR: &str = ".claude/session-env";
pub const WORKFLOW_DOC: &str = ".claude/CLAUDE.md";
pub const USAGE_FILE: &str = ".claude.json";
pub const CONFIG_FILE: &str = ".claude/skillgraph.yaml";

// ---------------------------------------------------------------------------
// File names
// ---------------------------------------------------------------------------

pub const DESCRIPTOR_FILE: &str = "SKILL.md";
pub const SNAPSHOT_FILE: &str = "skills-meta-cache.json";
pub const STATE_FILE: &str = "orchestrator-state.json";
pub const REVIEW_FILE: &str = "pending-decisions.md";
pub const COMBO_SHOWN_FILE: &str = "combo-shown.json";
pub const AUDIT_STATE_FILE: &str = "workflow-audit-state.json";
pub const ISSUES_FILE: &str = "workflow-issues.md";

// ---------------------------------------------------------------------------
// Home resolution
// ---------------------------------------------------------------------------

/// Resolve the home directory: explicit override first, then the platform home.
pub fn resolve_home(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = explicit {
        return Ok(p.to_path_buf());
    }
    home::home_dir().ok_or(SkillgraphError::HomeNotFound)
}

pub fn config_path(home: &Path) -> PathBuf {
    home.join(CONFIG_FILE)
}

/// Resolve a configured path: absolute paths are kept, relative ones hang off `home`.
pub fn under_home(home: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        home.join(configured)
    }
}

// ---------------------------------------------------------------------------
// CatalogLayout
// ---------------------------------------------------------------------------

/// Concrete on-disk locations of the catalog and its session files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogLayout {
    /// Extended pool: every known entry's descriptor lives here.
    pub pool_dir: PathBuf,
    /// Active subset: entries the agent currently sees.
    pub active_dir: PathBuf,
    pub session_dir: PathBuf,
    pub workflow_doc: PathBuf,
    pub usage_file: PathBuf,
}

impl CatalogLayout {
    /// The layout rooted at `home` with every default location.
    pub fn under(home: &Path) -> Self {
        Self {
            pool_dir: home.join(POOL_DIR),
            active_dir: home.join(ACTIVE_DIR),
            session_dir: home.join(SESSION_DIR),
            workflow_doc: home.join(WORKFLOW_DOC),
            usage_file: home.join(USAGE_FILE),
        }
    }

    /// Directory scanned for descriptors. Falls back to the active root when the
    /// extended pool has not been set up.
    pub fn descriptor_root(&self) -> &Path {
        if self.pool_dir.is_dir() {
            &self.pool_dir
        } else {
            &self.active_dir
        }
    }

    pub fn descriptor_path(&self, name: &str) -> PathBuf {
        self.descriptor_root().join(name).join(DESCRIPTOR_FILE)
    }

    pub fn active_entry_path(&self, name: &str) -> PathBuf {
        self.active_dir.join(name)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.session_dir.join(SNAPSHOT_FILE)
    }

    pub fn state_path(&self) -> PathBuf {
        self.session_dir.join(STATE_FILE)
    }

    pub fn review_path(&self) -> PathBuf {
        self.session_dir.join(REVIEW_FILE)
    }

    pub fn combo_shown_path(&self) -> PathBuf {
        self.session_dir.join(COMBO_SHOWN_FILE)
    }

    pub fn audit_state_path(&self) -> PathBuf {
        self.session_dir.join(AUDIT_STATE_FILE)
    }

    pub fn issues_path(&self) -> PathBuf {
        self.session_dir.join(ISSUES_FILE)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
