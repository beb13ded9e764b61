//! Usage telemetry, read from the agent's settings file (`skillUsage`).
//!
//! Each value is either `{ "lastUsedAt": <epoch ms>, "usageCount": <n> }` or a bare
//! integer count. The file is owned by another tool and only ever read here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub last_used_at: Option<DateTime<Utc>>,
    pub count: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawUsage {
    Count(u64),
    Detailed {
        #[serde(rename = "lastUsedAt", default)]
        last_used_at: Option<i64>,
        #[serde(rename = "usageCount", default)]
        usage_count: Option<u64>,
    },
    Other(serde::de::IgnoredAny),
}

impl From<RawUsage> for UsageRecord {
    fn from(raw: RawUsage) -> Self {
        match raw {
            RawUsage::Count(count) => Self {
                last_used_at: None,
                count,
            },
            RawUsage::Detailed {
                last_used_at,
                usage_count,
            } => Self {
                last_used_at: last_used_at
                    .filter(|ms| *ms > 0)
                    .and_then(DateTime::<Utc>::from_timestamp_millis),
                count: usage_count.unwrap_or(0),
            },
            RawUsage::Other(_) => Self::default(),
        }
    }
}

#[derive(Deserialize)]
struct SettingsFile {
    #[serde(rename = "skillUsage", default)]
    skill_usage: BTreeMap<String, RawUsage>,
}

pub type UsageMap = BTreeMap<String, UsageRecord>;

pub fn parse(text: &str) -> crate::Result<UsageMap> {
    let file: SettingsFile = serde_json::from_str(text)?;
    Ok(file
        .skill_usage
        .into_iter()
        .map(|(name, raw)| (name, UsageRecord::from(raw)))
        .collect())
}

/// Load usage records; a missing or unreadable file means no usage at all.
pub fn load(path: &Path) -> UsageMap {
    let Ok(text) = std::fs::read_to_string(path) else {
        tracing::debug!("no usage file at {}", path.display());
        return UsageMap::new();
    };
    parse(&text).unwrap_or_else(|e| {
        tracing::warn!("ignoring unreadable usage file {}: {e}", path.display());
        UsageMap::new()
    })
}
