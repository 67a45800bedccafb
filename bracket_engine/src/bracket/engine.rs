//! Bracket generation entry point.

use log::debug;
use rand::Rng;
use std::collections::HashSet;

use super::config::EngineConfig;
use super::double::DoubleEliminationBuilder;
use super::errors::{PlanError, PlanResult};
use super::models::{BracketFormat, BracketState, Entrant};
use super::planner::RoundPlanner;
use super::shuffler::shuffle_entrants;
use super::single::SingleEliminationBuilder;

/// Generates brackets from a roster.
///
/// The engine holds configuration only. Every bracket it produces is an
/// independent [`BracketState`] owned by the caller.
#[derive(Debug, Clone, Default)]
pub struct BracketEngine {
    config: EngineConfig,
}

impl BracketEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn planner(&self) -> RoundPlanner {
        RoundPlanner::new(self.config.max_entrants)
    }

    /// Shuffle the roster with `rng` and build a bracket of the given format
    ///
    /// # Errors
    ///
    /// * [`PlanError::InsufficientEntrants`] - fewer than two entrants
    /// * [`PlanError::TooManyEntrants`] - roster above the configured cap
    /// * [`PlanError::DuplicateEntrant`] - the same id registered twice
    pub fn generate<R: Rng + ?Sized>(
        &self,
        entrants: Vec<Entrant>,
        format: BracketFormat,
        rng: &mut R,
    ) -> PlanResult<BracketState> {
        let entrants = shuffle_entrants(entrants, rng);
        self.generate_in_order(entrants, format)
    }

    /// Build a bracket with the roster taken as the draw order.
    pub fn generate_in_order(
        &self,
        entrants: Vec<Entrant>,
        format: BracketFormat,
    ) -> PlanResult<BracketState> {
        check_roster(&entrants)?;
        let plan = self.planner().plan(entrants.len())?;
        debug!(
            "generating {format} bracket: {} entrants, size {}, {} byes",
            plan.entrant_count, plan.bracket_size, plan.bye_count
        );

        match format {
            BracketFormat::SingleElimination => SingleEliminationBuilder.build(entrants, &plan),
            BracketFormat::DoubleElimination => {
                DoubleEliminationBuilder::new(self.config.grand_final).build(entrants, &plan)
            }
        }
    }
}

fn check_roster(entrants: &[Entrant]) -> PlanResult<()> {
    let mut seen = HashSet::with_capacity(entrants.len());
    for entrant in entrants {
        if !seen.insert(entrant.id) {
            return Err(PlanError::DuplicateEntrant(entrant.id));
        }
    }
    Ok(())
}
