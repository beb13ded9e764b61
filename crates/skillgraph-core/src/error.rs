use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkillgraphError {
    #[error("invalid rank '{0}': expected <N|R|SR|UR>-<C|B|A|S>")]
    InvalidRank(String),

    #[error("descriptor has no front matter: {0}")]
    MissingFrontMatter(String),

    #[error("entry not found: {0}")]
    EntryNotFound(String),

    #[error("subprocess failed: {0}")]
    Subprocess(String),

    #[error("subprocess timed out after {0}s")]
    Timeout(u64),

    #[error("home directory not found: set HOME or pass --home")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SkillgraphError>;
