use crate::error::Result;
use crate::paths::{self, CatalogLayout};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// CatalogConfig
// ---------------------------------------------------------------------------

/// Catalog locations. Relative paths are resolved against the home directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_pool_dir")]
    pub pool_dir: PathBuf,
    #[serde(default = "default_active_dir")]
    pub active_dir: PathBuf,
    #[serde(default = "default_session_dir")]
    pub session_dir: PathBuf,
    #[serde(default = "default_workflow_doc")]
    pub workflow_doc: PathBuf,
    #[serde(default = "default_usage_file")]
    pub usage_file: PathBuf,
}

fn default_pool_dir() -> PathBuf {
    PathBuf::from(paths::POOL_DIR)
}

fn default_active_dir() -> PathBuf {
    PathBuf::from(paths::ACTIVE_DIR)
}

fn default_session_dir() -> PathBuf {
    PathBuf::from(paths::SESSION_DIR)
}

fn default_workflow_doc() -> PathBuf {
    PathBuf::from(paths::WORKFLOW_DOC)
}

fn default_usage_file() -> PathBuf {
    PathBuf::from(paths::USAGE_FILE)
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            pool_dir: default_pool_dir(),
            active_dir: default_active_dir(),
            session_dir: default_session_dir(),
            workflow_doc: default_workflow_doc(),
            usage_file: default_usage_file(),
        }
    }
}

// ---------------------------------------------------------------------------
// CacheConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    3600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

// ---------------------------------------------------------------------------
// PolicyConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Days without use before an active entry counts as stale.
    #[serde(default = "default_stale_days")]
    pub stale_days: i64,
    #[serde(default = "default_max_parking")]
    pub max_parking: usize,
    #[serde(default = "default_max_downgrade")]
    pub max_downgrade: usize,
    #[serde(default = "default_max_combos")]
    pub max_combos: usize,
    /// Wall-clock budget for the combo generator subprocess.
    #[serde(default = "default_combos_timeout_secs")]
    pub combos_timeout_secs: u64,
}

fn default_stale_days() -> i64 {
    30
}

/// A century; anything longer is a typo.
pub const MAX_STALE_DAYS: i64 = 36_500;

fn default_max_parking() -> usize {
    8
}

fn default_max_downgrade() -> usize {
    5
}

fn default_max_combos() -> usize {
    5
}

fn default_combos_timeout_secs() -> u64 {
    30
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            stale_days: default_stale_days(),
            max_parking: default_max_parking(),
            max_downgrade: default_max_downgrade(),
            max_combos: default_max_combos(),
            combos_timeout_secs: default_combos_timeout_secs(),
        }
    }
}

impl PolicyConfig {
    /// Out-of-range values saturate instead of overflowing.
    pub fn stale_after(&self) -> chrono::Duration {
        chrono::Duration::try_days(self.stale_days).unwrap_or(chrono::Duration::MAX)
    }

    pub fn combos_timeout(&self) -> Duration {
        Duration::from_secs(self.combos_timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// WorkflowConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Heading text of the section holding the workflow table.
    #[serde(default = "default_section")]
    pub section: String,
    /// Chain names that are not catalog entries (tools, databases) and are never
    /// reported as broken.
    #[serde(default)]
    pub ignore: Vec<String>,
}

fn default_section() -> String {
    "Skill Workflows".to_string()
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            section: default_section(),
            ignore: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            catalog: CatalogConfig::default(),
            cache: CacheConfig::default(),
            policy: PolicyConfig::default(),
            workflow: WorkflowConfig::default(),
        }
    }
}

impl Config {
    /// Load `<home>/.claude/skillgraph.yaml`; a missing file means all defaults.
    pub fn load(home: &Path) -> Result<Self> {
        let path = paths::config_path(home);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    /// Like [`Config::load`], but an unreadable file logs a warning and yields
    /// the defaults.
    pub fn load_or_default(home: &Path) -> Self {
        Self::load(home).unwrap_or_else(|e| {
            tracing::warn!(
                "ignoring {} ({e}); using defaults",
                paths::config_path(home).display()
            );
            Self::default()
        })
    }

    pub fn save(&self, home: &Path) -> Result<()> {
        let path = paths::config_path(home);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn layout(&self, home: &Path) -> CatalogLayout {
        CatalogLayout {
            pool_dir: paths::under_home(home, &self.catalog.pool_dir),
            active_dir: paths::under_home(home, &self.catalog.active_dir),
            session_dir: paths::under_home(home, &self.catalog.session_dir),
            workflow_doc: paths::under_home(home, &self.catalog.workflow_doc),
            usage_file: paths::under_home(home, &self.catalog.usage_file),
        }
    }

    /// Check for values that load fine but make the tool behave oddly.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.cache.ttl_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "cache.ttl_secs is 0: every access rescans the catalog".to_string(),
            });
        }
        if self.policy.stale_days <= 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "policy.stale_days must be positive, got {}",
                    self.policy.stale_days
                ),
            });
        } else if self.policy.stale_days > MAX_STALE_DAYS {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "policy.stale_days is {}, above the {MAX_STALE_DAYS}-day limit",
                    self.policy.stale_days
                ),
            });
        }
        if self.policy.max_combos == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "policy.max_combos is 0: no combos will ever be written".to_string(),
            });
        }
        if self.policy.combos_timeout_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "policy.combos_timeout_secs is 0: combo generation always times out"
                    .to_string(),
            });
        }
        if self.workflow.section.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "workflow.section is empty".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
