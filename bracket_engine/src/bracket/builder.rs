//! Shared construction steps for both bracket formats.

use std::collections::BTreeMap;

use super::advance::settle;
use super::errors::{PlanError, PlanResult};
use super::models::{Edge, Entrant, Match, MatchId, Segment, Slot};
use super::planner::RoundPlan;

/// Winners bracket ids, grouped by round.
pub(crate) struct WinnersBracket {
    pub rounds: Vec<Vec<MatchId>>,
    pub final_id: MatchId,
}

/// Matches under construction. Ids are handed out from 1 in creation
/// order.
#[derive(Default)]
pub(crate) struct MatchArena {
    matches: BTreeMap<MatchId, Match>,
    last_id: MatchId,
}

impl MatchArena {
    pub fn push(&mut self, segment: Segment, round_name: &str) -> MatchId {
        self.last_id += 1;
        let id = self.last_id;
        self.matches.insert(id, Match::new(id, segment, round_name));
        id
    }

    pub fn last_id(&self) -> MatchId {
        self.last_id
    }

    pub fn link(&mut self, from: MatchId, edge: Edge, to: MatchId) {
        if let Some(m) = self.matches.get_mut(&from) {
            match edge {
                Edge::Winner => m.next_match = Some(to),
                Edge::Loser => m.next_loser_match = Some(to),
            }
        }
    }

    pub fn get_mut(&mut self, id: MatchId) -> Option<&mut Match> {
        self.matches.get_mut(&id)
    }

    /// Create, link and seed the winners bracket. Bye matches are seeded
    /// but not yet settled, so that loser links added afterwards see them.
    pub fn winners_bracket(
        &mut self,
        entrants: Vec<Entrant>,
        plan: &RoundPlan,
    ) -> PlanResult<WinnersBracket> {
        if entrants.len() != plan.entrant_count {
            return Err(PlanError::RosterMismatch {
                expected: plan.entrant_count,
                actual: entrants.len(),
            });
        }

        let mut rounds = Vec::with_capacity(plan.round_count());
        for (round, name) in plan.round_names.iter().enumerate() {
            let ids: Vec<MatchId> = (0..plan.matches_in_round(round))
                .map(|_| self.push(Segment::Winners, name))
                .collect();
            rounds.push(ids);
        }
        let final_id = self.last_id;

        for pair in rounds.windows(2) {
            for (i, &id) in pair[0].iter().enumerate() {
                self.link(id, Edge::Winner, pair[1][i / 2]);
            }
        }

        // The first `bye_count` matches take one entrant each, the rest two.
        let mut queue = entrants.into_iter();
        if let Some(first_round) = rounds.first() {
            for (i, &id) in first_round.iter().enumerate() {
                let first = queue.next().map_or(Slot::Bye, Slot::filled);
                let second = if i < plan.bye_count {
                    Slot::Bye
                } else {
                    queue.next().map_or(Slot::Bye, Slot::filled)
                };
                if let Some(m) = self.matches.get_mut(&id) {
                    m.slots = [first, second];
                }
            }
        }

        Ok(WinnersBracket { rounds, final_id })
    }

    /// Resolve bye matches of the first round and cascade their results.
    pub fn settle_first_round(&mut self, bracket: &WinnersBracket) -> PlanResult<()> {
        for &id in bracket.rounds.first().into_iter().flatten() {
            settle(&mut self.matches, id)?;
        }
        Ok(())
    }

    pub fn into_matches(self) -> BTreeMap<MatchId, Match> {
        self.matches
    }
}
