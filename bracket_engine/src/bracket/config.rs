//! Engine configuration models.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::planner::DEFAULT_MAX_ENTRANTS;

/// Hard ceiling for `EngineConfig::max_entrants`
pub const MAX_ENTRANTS_LIMIT: usize = 65_536;

/// How the double-elimination grand final is played
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrandFinalPolicy {
    /// A losers-side win in the first meeting forces a second one
    #[default]
    Reset,
    /// One match decides the tournament
    #[serde(rename = "single")]
    SingleMatch,
}

impl std::fmt::Display for GrandFinalPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrandFinalPolicy::Reset => write!(f, "reset"),
            GrandFinalPolicy::SingleMatch => write!(f, "single"),
        }
    }
}

impl FromStr for GrandFinalPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reset" => Ok(GrandFinalPolicy::Reset),
            "single" | "single-match" => Ok(GrandFinalPolicy::SingleMatch),
            other => Err(format!("unknown grand final policy: {other}")),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Grand final policy for double elimination (default: reset)
    pub grand_final: GrandFinalPolicy,

    /// Largest roster accepted by `generate` (default: 1024)
    pub max_entrants: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grand_final: GrandFinalPolicy::Reset,
            max_entrants: DEFAULT_MAX_ENTRANTS,
        }
    }
}

impl EngineConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_entrants < 2 {
            return Err("Max entrants must be at least 2".to_string());
        }

        if self.max_entrants > MAX_ENTRANTS_LIMIT {
            return Err("Max entrants must not exceed 65,536".to_string());
        }

        Ok(())
    }
}
