//! Match advancement: result resolution, forward placement and bye cascades.
//!
//! Every entrant that moves through the bracket, whether at generation time
//! (bye winners) or as results arrive, goes through [`deliver`]. It puts the
//! entrant into the slot its link designates, then [`settle`]s the target
//! so that a match left facing a bye resolves on the spot.

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::errors::{AdvanceError, AdvanceResult};
use super::models::{
    BracketState, Edge, Entrant, EntrantId, Match, MatchId, Segment, Slot, SlotIndex, feeders,
};

/// Result reported for a match
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum MatchReport {
    /// Final score per slot; the higher score wins.
    Scores { p1: u32, p2: u32 },
    /// Explicit winner by slot, keeping any recorded scores.
    Winner(SlotIndex),
    /// Explicit winner by entrant id.
    WinnerId(EntrantId),
}

/// What travels along a link.
#[derive(Clone, Debug)]
pub(crate) enum Arrival {
    Entrant(Entrant),
    /// Nobody will ever come from this link (bye phantom or void match).
    Vacant,
}

impl Arrival {
    fn accepted_by(&self, slot: &Slot) -> bool {
        match (slot, self) {
            (Slot::Unresolved, _) => true,
            (Slot::Filled { entrant, .. }, Self::Entrant(incoming)) => entrant.id == incoming.id,
            (Slot::Bye, Self::Vacant) => true,
            _ => false,
        }
    }

    fn into_slot(self) -> Slot {
        match self {
            Self::Entrant(entrant) => Slot::filled(entrant),
            Self::Vacant => Slot::Bye,
        }
    }
}

fn lookup(matches: &BTreeMap<MatchId, Match>, id: MatchId) -> AdvanceResult<&Match> {
    matches.get(&id).ok_or(AdvanceError::UnknownMatchId(id))
}

fn lookup_mut(matches: &mut BTreeMap<MatchId, Match>, id: MatchId) -> AdvanceResult<&mut Match> {
    matches.get_mut(&id).ok_or(AdvanceError::UnknownMatchId(id))
}

/// Send `arrival` from match `from` along `edge`. No-op when the match has
/// no link of that kind.
pub(crate) fn deliver(
    matches: &mut BTreeMap<MatchId, Match>,
    from: MatchId,
    edge: Edge,
    arrival: Arrival,
) -> AdvanceResult<()> {
    let source = lookup(matches, from)?;
    let Some(target) = source.target(edge) else {
        return Ok(());
    };
    let tag = edge.entry_tag(source.segment);

    let slot = feeders(matches, target)
        .iter()
        .position(|f| f.edge == edge && f.match_id == from)
        .filter(|&position| position < 2)
        .ok_or(AdvanceError::BrokenLink {
            match_id: from,
            next_match_id: target,
        })?;

    let entry = lookup_mut(matches, target)?;
    if !arrival.accepted_by(&entry.slots[slot]) {
        return Err(AdvanceError::NextMatchSlotsOccupied {
            match_id: from,
            next_match_id: target,
        });
    }
    if entry.slots[slot].is_unresolved() {
        trace!("match {from} -> match {target} slot {slot}: {arrival:?}");
        entry.slots[slot] = arrival.into_slot();
    }
    if entry.segment == Segment::GrandFinal {
        entry.entry_segments[slot] = Some(tag);
    }

    settle(matches, target)
}

/// Resolve a match that can't be played: one entrant against a bye
/// advances the entrant; two byes forward a bye.
pub(crate) fn settle(matches: &mut BTreeMap<MatchId, Match>, id: MatchId) -> AdvanceResult<()> {
    let entry = lookup_mut(matches, id)?;
    if entry.winner.is_some() {
        return Ok(());
    }

    let advancing = match &entry.slots {
        [Slot::Bye, Slot::Bye] => Arrival::Vacant,
        [Slot::Filled { entrant, .. }, Slot::Bye] => {
            entry.winner = Some(0);
            Arrival::Entrant(entrant.clone())
        }
        [Slot::Bye, Slot::Filled { entrant, .. }] => {
            entry.winner = Some(1);
            Arrival::Entrant(entrant.clone())
        }
        _ => return Ok(()),
    };
    trace!("match {id} settled without play: {advancing:?}");

    deliver(matches, id, Edge::Winner, advancing)?;
    deliver(matches, id, Edge::Loser, Arrival::Vacant)
}

fn checked_slot(slot: SlotIndex) -> AdvanceResult<SlotIndex> {
    if slot < 2 {
        Ok(slot)
    } else {
        Err(AdvanceError::InvalidSlot(slot))
    }
}

fn decide_by_scores(match_id: MatchId, p1: u32, p2: u32) -> AdvanceResult<SlotIndex> {
    match p1.cmp(&p2) {
        std::cmp::Ordering::Greater => Ok(0),
        std::cmp::Ordering::Less => Ok(1),
        std::cmp::Ordering::Equal => Err(AdvanceError::Tie { match_id, score: p1 }),
    }
}

impl BracketState {
    /// Report a result for a match and move both entrants on.
    ///
    /// The state is only changed when the whole advance succeeds; on any
    /// error it is left exactly as it was.
    ///
    /// # Errors
    ///
    /// * [`AdvanceError::UnknownMatchId`] - no such match
    /// * [`AdvanceError::ByeMatch`] - the match is a bye or void
    /// * [`AdvanceError::MatchNotReady`] - an entrant is still unknown
    /// * [`AdvanceError::Tie`] - equal scores
    /// * [`AdvanceError::EntrantNotInMatch`] - winner id not in this match
    /// * [`AdvanceError::NextMatchSlotsOccupied`] - a different entrant
    ///   already holds the downstream slot
    pub fn advance(&mut self, match_id: MatchId, report: MatchReport) -> AdvanceResult<()> {
        let entry = self.playable(match_id)?;
        let (winner, scores) = match report {
            MatchReport::Scores { p1, p2 } => (decide_by_scores(match_id, p1, p2)?, Some([p1, p2])),
            MatchReport::Winner(slot) => (checked_slot(slot)?, None),
            MatchReport::WinnerId(entrant_id) => {
                let slot = entry
                    .slot_of(entrant_id)
                    .ok_or(AdvanceError::EntrantNotInMatch {
                        match_id,
                        entrant_id,
                    })?;
                (slot, None)
            }
        };
        self.commit(match_id, winner, scores)
    }

    /// Advance a match from its recorded scores, or from `winner_override`
    /// when given.
    pub fn advance_recorded(
        &mut self,
        match_id: MatchId,
        winner_override: Option<SlotIndex>,
    ) -> AdvanceResult<()> {
        let entry = self.playable(match_id)?;
        let winner = match winner_override {
            Some(slot) => checked_slot(slot)?,
            None => match (entry.slots[0].score(), entry.slots[1].score()) {
                (Some(p1), Some(p2)) => decide_by_scores(match_id, p1, p2)?,
                _ => return Err(AdvanceError::IncompleteScores(match_id)),
            },
        };
        self.commit(match_id, winner, None)
    }

    /// Store a pending score without deciding the match.
    ///
    /// A decided match keeps the scores its result was reported with;
    /// corrections go through [`BracketState::advance`].
    pub fn record_score(
        &mut self,
        match_id: MatchId,
        slot: SlotIndex,
        score: u32,
    ) -> AdvanceResult<()> {
        let slot = checked_slot(slot)?;
        if self.playable(match_id)?.is_decided() {
            return Err(AdvanceError::MatchDecided(match_id));
        }
        let entry = lookup_mut(&mut self.matches, match_id)?;
        if !entry.slots[slot].set_score(score) {
            return Err(AdvanceError::MatchNotReady(match_id));
        }
        Ok(())
    }

    fn playable(&self, match_id: MatchId) -> AdvanceResult<&Match> {
        let entry = lookup(&self.matches, match_id)?;
        if entry.is_bye() || entry.is_void() {
            return Err(AdvanceError::ByeMatch(match_id));
        }
        if entry.slots.iter().any(Slot::is_unresolved) {
            return Err(AdvanceError::MatchNotReady(match_id));
        }
        Ok(entry)
    }

    fn commit(
        &mut self,
        match_id: MatchId,
        winner: SlotIndex,
        scores: Option<[u32; 2]>,
    ) -> AdvanceResult<()> {
        let mut draft = self.matches.clone();

        let entry = lookup_mut(&mut draft, match_id)?;
        if let Some(scores) = scores {
            for (slot, score) in entry.slots.iter_mut().zip(scores) {
                slot.set_score(score);
            }
        }
        entry.winner = Some(winner);
        let segment = entry.segment;
        let (Some(advancing), Some(eliminated)) = (
            entry.slots[winner].entrant().cloned(),
            entry.slots[1 - winner].entrant().cloned(),
        ) else {
            return Err(AdvanceError::MatchNotReady(match_id));
        };
        debug!("match {match_id}: {advancing} beats {eliminated}");

        deliver(&mut draft, match_id, Edge::Winner, Arrival::Entrant(advancing))?;
        match segment {
            Segment::Winners => {
                deliver(&mut draft, match_id, Edge::Loser, Arrival::Entrant(eliminated))?;
            }
            Segment::GrandFinal => self.settle_grand_final(&mut draft, match_id)?,
            Segment::Losers => {}
        }

        self.matches = draft;
        self.refresh_current_round();
        Ok(())
    }

    /// A losers-side win in the first grand final activates the reset
    /// match; a winners-side win leaves it dormant.
    fn settle_grand_final(
        &self,
        draft: &mut BTreeMap<MatchId, Match>,
        grand_final_id: MatchId,
    ) -> AdvanceResult<()> {
        let Some(reset_id) = self.reset_match else {
            return Ok(());
        };
        if grand_final_id == reset_id {
            return Ok(());
        }

        let grand_final = lookup_mut(draft, grand_final_id)?;
        let reset_needed = grand_final
            .winner
            .and_then(|slot| grand_final.entry_segments[slot])
            == Some(Segment::Losers);
        grand_final.needs_reset = reset_needed;
        let finalists = grand_final.slots.clone().map(|slot| match slot {
            Slot::Filled { entrant, .. } => Arrival::Entrant(entrant),
            _ => Arrival::Vacant,
        });
        let tags = grand_final.entry_segments;

        let reset = lookup_mut(draft, reset_id)?;
        let occupied = AdvanceError::NextMatchSlotsOccupied {
            match_id: grand_final_id,
            next_match_id: reset_id,
        };

        if reset_needed {
            if !finalists
                .iter()
                .zip(&reset.slots)
                .all(|(arrival, slot)| arrival.accepted_by(slot))
            {
                return Err(occupied);
            }
            for (slot, arrival) in reset.slots.iter_mut().zip(finalists) {
                if slot.is_unresolved() {
                    *slot = arrival.into_slot();
                }
            }
            reset.entry_segments = tags;
            debug!("grand final {grand_final_id} goes to reset match {reset_id}");
        } else if !reset.slots.iter().all(Slot::is_unresolved) {
            if reset.winner.is_some() {
                return Err(occupied);
            }
            reset.slots = [Slot::Unresolved, Slot::Unresolved];
            reset.entry_segments = [None, None];
        }
        Ok(())
    }
}
