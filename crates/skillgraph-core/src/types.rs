use crate::error::SkillgraphError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity key of an entry: a leading `_` marks the always-active tier and is
/// ignored for comparisons.
pub fn entry_key(name: &str) -> &str {
    name.trim_start_matches('_')
}

// ---------------------------------------------------------------------------
// Rarity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    N,
    R,
    SR,
    UR,
}

impl Rarity {
    pub fn all() -> &'static [Rarity] {
        &[Rarity::N, Rarity::R, Rarity::SR, Rarity::UR]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::N => "N",
            Rarity::R => "R",
            Rarity::SR => "SR",
            Rarity::UR => "UR",
        }
    }

    /// One tier lower for the high tiers (UR → SR, SR → R); lower tiers stay put.
    pub fn step_down(self) -> Rarity {
        match self {
            Rarity::UR => Rarity::SR,
            Rarity::SR => Rarity::R,
            other => other,
        }
    }

    pub fn is_high(self) -> bool {
        matches!(self, Rarity::SR | Rarity::UR)
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Rarity {
    type Err = SkillgraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "N" => Ok(Rarity::N),
            "R" => Ok(Rarity::R),
            "SR" => Ok(Rarity::SR),
            "UR" => Ok(Rarity::UR),
            _ => Err(SkillgraphError::InvalidRank(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Strength
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Strength {
    C,
    B,
    A,
    S,
}

impl Strength {
    pub fn all() -> &'static [Strength] {
        &[Strength::C, Strength::B, Strength::A, Strength::S]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Strength::C => "C",
            Strength::B => "B",
            Strength::A => "A",
            Strength::S => "S",
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Strength {
    type Err = SkillgraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" => Ok(Strength::C),
            "B" => Ok(Strength::B),
            "A" => Ok(Strength::A),
            "S" => Ok(Strength::S),
            _ => Err(SkillgraphError::InvalidRank(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Rank
// ---------------------------------------------------------------------------

/// `<RARITY>-<STRENGTH>`, e.g. `SR-B`. Persisted as its string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rank {
    pub rarity: Rarity,
    pub strength: Strength,
}

impl Rank {
    pub const fn new(rarity: Rarity, strength: Strength) -> Self {
        Self { rarity, strength }
    }

    /// The rank a stale high-tier entry would be downgraded to.
    pub fn downgraded(self) -> Rank {
        Rank::new(self.rarity.step_down(), self.strength)
    }

    pub fn with_strength(self, strength: Strength) -> Rank {
        Rank::new(self.rarity, strength)
    }
}

impl Default for Rank {
    fn default() -> Self {
        Rank::new(Rarity::N, Strength::C)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.rarity, self.strength)
    }
}

impl std::str::FromStr for Rank {
    type Err = SkillgraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rarity, strength) = s
            .split_once('-')
            .ok_or_else(|| SkillgraphError::InvalidRank(s.to_string()))?;
        let rarity = rarity
            .parse()
            .map_err(|_| SkillgraphError::InvalidRank(s.to_string()))?;
        let strength = strength
            .parse()
            .map_err(|_| SkillgraphError::InvalidRank(s.to_string()))?;
        Ok(Rank::new(rarity, strength))
    }
}

impl TryFrom<String> for Rank {
    type Error = SkillgraphError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Rank> for String {
    fn from(rank: Rank) -> Self {
        rank.to_string()
    }
}

// ---------------------------------------------------------------------------
// Risk
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Risk {
    /// Safe and reversible: applied automatically.
    Low,
    /// Worth doing, but a human confirms.
    Medium,
    /// A judgment call: never auto-applied.
    High,
}

impl Risk {
    pub fn as_str(self) -> &'static str {
        match self {
            Risk::Low => "LOW",
            Risk::Medium => "MEDIUM",
            Risk::High => "HIGH",
        }
    }

    pub fn needs_review(self) -> bool {
        !matches!(self, Risk::Low)
    }
}

impl fmt::Display for Risk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_parse_and_display() {
        let rank: Rank = "SR-B".parse().unwrap();
        assert_eq!(rank, Rank::new(Rarity::SR, Strength::B));
        assert_eq!(rank.to_string(), "SR-B");
    }

    #[test]
    fn rank_rejects_malformed() {
        for s in ["", "SR", "SR-", "-B", "X-B", "SR-Z", "sr-b", "SR-B-C"] {
            assert!(s.parse::<Rank>().is_err(), "expected invalid: {s}");
        }
    }

    #[test]
    fn default_rank_is_lowest() {
        assert_eq!(Rank::default().to_string(), "N-C");
    }

    #[test]
    fn downgrade_steps_one_tier() {
        assert_eq!(Rank::new(Rarity::UR, Strength::S).downgraded().to_string(), "SR-S");
        assert_eq!(Rank::new(Rarity::SR, Strength::B).downgraded().to_string(), "R-B");
        assert_eq!(Rank::new(Rarity::R, Strength::A).downgraded().to_string(), "R-A");
        assert_eq!(Rank::new(Rarity::N, Strength::C).downgraded().to_string(), "N-C");
    }

    #[test]
    fn rank_serializes_as_string() {
        let json = serde_json::to_string(&Rank::new(Rarity::UR, Strength::A)).unwrap();
        assert_eq!(json, "\"UR-A\"");
        let parsed: Rank = serde_json::from_str("\"R-S\"").unwrap();
        assert_eq!(parsed, Rank::new(Rarity::R, Strength::S));
        assert!(serde_json::from_str::<Rank>("\"bogus\"").is_err());
    }

    #[test]
    fn risk_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Risk::Medium).unwrap(), "\"MEDIUM\"");
        assert!(Risk::High.needs_review());
        assert!(!Risk::Low.needs_review());
    }

    #[test]
    fn entry_key_strips_underscore() {
        assert_eq!(entry_key("_mcp-builder"), "mcp-builder");
        assert_eq!(entry_key("pdf"), "pdf");
    }
}
