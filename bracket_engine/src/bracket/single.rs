//! Single-elimination bracket construction.

use log::debug;

use super::builder::MatchArena;
use super::errors::PlanResult;
use super::models::{BracketFormat, BracketState, Entrant};
use super::planner::RoundPlan;

/// Builds a winners-only bracket
#[derive(Clone, Copy, Debug, Default)]
pub struct SingleEliminationBuilder;

impl SingleEliminationBuilder {
    /// Build a bracket from a roster already in draw order.
    ///
    /// Round 1 match *i* feeds round 2 match *i / 2*, and so on up to the
    /// final. Bye winners move into round 2 straight away. No first-round
    /// match holds two byes, so nothing past round 2 is ever decided
    /// without a result.
    pub fn build(&self, entrants: Vec<Entrant>, plan: &RoundPlan) -> PlanResult<BracketState> {
        let mut arena = MatchArena::default();
        let winners = arena.winners_bracket(entrants, plan)?;
        arena.settle_first_round(&winners)?;

        debug!(
            "built single-elimination bracket: {} entrants, {} matches, {} byes",
            plan.entrant_count,
            arena.last_id(),
            plan.bye_count
        );
        Ok(BracketState::new(
            BracketFormat::SingleElimination,
            plan.entrant_count,
            arena.into_matches(),
            None,
        ))
    }
}
