use anyhow::Context;
use skillgraph_core::{
    cache::MetadataCache,
    config::{Config, WarnLevel},
    paths::{self, CatalogLayout},
};
use std::path::{Path, PathBuf};

/// The resolved home directory with its configuration and catalog layout.
pub struct Home {
    pub path: PathBuf,
    pub config: Config,
    pub layout: CatalogLayout,
}

impl Home {
    /// Resolve the home directory and load its configuration.
    ///
    /// Priority:
    /// 1. `--home` flag / `SKILLGRAPH_HOME` env var (passed in as `explicit`)
    /// 2. The platform home directory
    pub fn open(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = paths::resolve_home(explicit)?;
        let config = Config::load(&path).with_context(|| {
            format!("failed to load {}", paths::config_path(&path).display())
        })?;
        Ok(Self::with_config(path, config))
    }

    /// Like [`Home::open`], but a broken config file falls back to defaults.
    /// Used by the commands a session hook runs, which must not fail.
    pub fn open_best_effort(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = paths::resolve_home(explicit)?;
        let config = Config::load_or_default(&path);
        Ok(Self::with_config(path, config))
    }

    fn with_config(path: PathBuf, config: Config) -> Self {
        for w in config.validate() {
            match w.level {
                WarnLevel::Warning => tracing::warn!("config: {}", w.message),
                WarnLevel::Error => tracing::error!("config: {}", w.message),
            }
        }
        let layout = config.layout(&path);
        Self {
            path,
            config,
            layout,
        }
    }

    /// A fresh cache object for this invocation.
    pub fn cache(&self) -> MetadataCache {
        MetadataCache::new(self.layout.clone(), self.config.cache.ttl())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_home_wins() {
        let dir = TempDir::new().unwrap();
        let home = Home::open(Some(dir.path())).unwrap();
        assert_eq!(home.path, dir.path());
        assert_eq!(home.layout.active_dir, dir.path().join(".claude/skills"));
    }

    #[test]
    fn broken_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".claude")).unwrap();
        std::fs::write(dir.path().join(".claude/skillgraph.yaml"), "cache: [").unwrap();
        let err = Home::open(Some(dir.path())).err().unwrap();
        assert!(format!("{err:#}").contains("skillgraph.yaml"));

        let home = Home::open_best_effort(Some(dir.path())).unwrap();
        assert_eq!(home.config.cache.ttl_secs, 3600);
    }
}
