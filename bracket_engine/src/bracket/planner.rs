//! Bracket sizing and round naming.

use serde::{Deserialize, Serialize};

use super::errors::{PlanError, PlanResult};

/// Default cap on roster size
pub const DEFAULT_MAX_ENTRANTS: usize = 1024;

/// Shape of a winners bracket for a given roster size
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RoundPlan {
    /// Number of registered entrants
    pub entrant_count: usize,
    /// Smallest power of two holding every entrant
    pub bracket_size: usize,
    /// Empty positions in the first round
    pub bye_count: usize,
    pub first_round_match_count: usize,
    /// Display name per round, first round first
    pub round_names: Vec<String>,
}

impl RoundPlan {
    pub fn round_count(&self) -> usize {
        self.round_names.len()
    }

    /// Number of matches in a zero-indexed winners round
    pub fn matches_in_round(&self, round: usize) -> usize {
        self.first_round_match_count >> round
    }
}

/// Display name for a round holding `match_count` matches.
///
/// The names for the last four rounds are fixed strings persisted by
/// existing tournament records and must not change.
pub fn round_name(match_count: usize, round_number: usize) -> String {
    match match_count {
        1 => "Final".to_string(),
        2 => "Semifinais".to_string(),
        4 => "Quartas de Final".to_string(),
        8 => "Oitavas de Final".to_string(),
        _ => format!("Rodada {round_number}"),
    }
}

/// Derives bracket size, byes and round names from a roster size
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RoundPlanner {
    max_entrants: usize,
}

impl RoundPlanner {
    pub fn new(max_entrants: usize) -> Self {
        Self { max_entrants }
    }

    /// Plan a bracket for `entrant_count` entrants
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::InsufficientEntrants`] below two entrants and
    /// [`PlanError::TooManyEntrants`] above the configured maximum.
    pub fn plan(&self, entrant_count: usize) -> PlanResult<RoundPlan> {
        if entrant_count < 2 {
            return Err(PlanError::InsufficientEntrants {
                count: entrant_count,
            });
        }
        if entrant_count > self.max_entrants {
            return Err(PlanError::TooManyEntrants {
                count: entrant_count,
                max: self.max_entrants,
            });
        }

        let bracket_size = entrant_count.next_power_of_two();
        let first_round_match_count = bracket_size / 2;
        let round_count = bracket_size.trailing_zeros() as usize;

        let round_names = (0..round_count)
            .map(|round| round_name(first_round_match_count >> round, round + 1))
            .collect();

        Ok(RoundPlan {
            entrant_count,
            bracket_size,
            bye_count: bracket_size - entrant_count,
            first_round_match_count,
            round_names,
        })
    }
}

impl Default for RoundPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRANTS)
    }
}
