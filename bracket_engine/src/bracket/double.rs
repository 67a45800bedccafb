//! Double-elimination bracket construction.
//!
//! Losers bracket layout for a winners bracket of `w` rounds, `2(w - 1)`
//! rounds in total:
//!
//! - LB round 0 pairs the losers of WB round 0.
//! - LB round `2r - 1` (r >= 1) is a drop-in round: WB round `r` losers
//!   (slot 1) meet the winners of LB round `2r - 2` (slot 0).
//! - LB round `2r` halves the field of the drop-in round before it.
//!
//! The last drop-in round takes the WB final loser and is the LB final.

use log::debug;

use super::builder::MatchArena;
use super::config::GrandFinalPolicy;
use super::errors::PlanResult;
use super::models::{BracketFormat, BracketState, Edge, Entrant, MatchId, Segment};
use super::planner::RoundPlan;

pub const LOSERS_FINAL_NAME: &str = "LB Final";
pub const GRAND_FINAL_NAME: &str = "Grande Final";
pub const GRAND_FINAL_RESET_NAME: &str = "Grande Final (Reset)";

fn losers_round_name(round: usize, round_count: usize) -> String {
    if round + 1 == round_count {
        LOSERS_FINAL_NAME.to_string()
    } else {
        format!("LB Rodada {}", round + 1)
    }
}

/// Builds winners, losers and grand-final segments
#[derive(Clone, Copy, Debug, Default)]
pub struct DoubleEliminationBuilder {
    grand_final: GrandFinalPolicy,
}

impl DoubleEliminationBuilder {
    pub fn new(grand_final: GrandFinalPolicy) -> Self {
        Self { grand_final }
    }

    pub fn build(&self, entrants: Vec<Entrant>, plan: &RoundPlan) -> PlanResult<BracketState> {
        let mut arena = MatchArena::default();
        let winners = arena.winners_bracket(entrants, plan)?;
        let wb_round_count = winners.rounds.len();
        let lb_round_count = (wb_round_count - 1) * 2;

        let mut losers: Vec<Vec<MatchId>> = Vec::with_capacity(lb_round_count);
        for round in 0..lb_round_count {
            let name = losers_round_name(round, lb_round_count);
            let ids = (0..plan.matches_in_round(round / 2 + 1))
                .map(|_| arena.push(Segment::Losers, &name))
                .collect();
            losers.push(ids);
        }

        for (r, round) in winners.rounds.iter().enumerate() {
            for (j, &id) in round.iter().enumerate() {
                let target = match r {
                    0 => losers.first().map(|lb| lb[j / 2]),
                    _ => losers.get(2 * r - 1).map(|lb| lb[j]),
                };
                if let Some(target) = target {
                    arena.link(id, Edge::Loser, target);
                }
            }
        }

        for (k, pair) in losers.windows(2).enumerate() {
            let drop_in = (k + 1) % 2 == 1;
            for (j, &id) in pair[0].iter().enumerate() {
                let target = if drop_in { pair[1][j] } else { pair[1][j / 2] };
                arena.link(id, Edge::Winner, target);
            }
        }
        let losers_final = losers.last().and_then(|round| round.first()).copied();

        let grand_final = arena.push(Segment::GrandFinal, GRAND_FINAL_NAME);
        arena.link(winners.final_id, Edge::Winner, grand_final);
        match losers_final {
            Some(id) => arena.link(id, Edge::Winner, grand_final),
            // Two entrants: the WB final loser is the losers-side finalist.
            None => arena.link(winners.final_id, Edge::Loser, grand_final),
        }

        let reset_match = match self.grand_final {
            GrandFinalPolicy::Reset => {
                if let Some(m) = arena.get_mut(grand_final) {
                    m.needs_reset = true;
                }
                Some(arena.push(Segment::GrandFinal, GRAND_FINAL_RESET_NAME))
            }
            GrandFinalPolicy::SingleMatch => None,
        };

        arena.settle_first_round(&winners)?;

        debug!(
            "built double-elimination bracket: {} entrants, {} matches, {} byes, {} grand final",
            plan.entrant_count,
            arena.last_id(),
            plan.bye_count,
            self.grand_final
        );
        Ok(BracketState::new(
            BracketFormat::DoubleElimination,
            plan.entrant_count,
            arena.into_matches(),
            reset_match,
        ))
    }
}
