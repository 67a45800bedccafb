//! Conversion to and from the persisted bracket shape.
//!
//! Tournament records store a bracket as one JSON object keyed by the
//! stringified match id. Slots that have no entrant are written with
//! placeholder names and a null `db_id`.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::errors::{SnapshotError, SnapshotResult};
use super::models::{
    BracketFormat, BracketState, Entrant, EntrantId, Match, MatchId, Segment, Slot, SlotIndex,
    feeders,
};

/// Placeholder name of a slot still waiting on an entrant
pub const UNRESOLVED_NAME: &str = "A definir";

/// Placeholder name of a bye slot
pub const BYE_NAME: &str = "BYE";

/// Persisted bracket, keyed by match id
pub type BracketSnapshot = BTreeMap<String, SnapshotMatch>;

/// Persisted slot
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SnapshotPlayer {
    pub name: String,
    pub nickname: String,
    pub db_id: Option<EntrantId>,
    pub score: Option<u32>,
}

impl SnapshotPlayer {
    fn placeholder(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nickname: name.to_string(),
            db_id: None,
            score: None,
        }
    }
}

impl From<&Slot> for SnapshotPlayer {
    fn from(slot: &Slot) -> Self {
        match slot {
            Slot::Unresolved => Self::placeholder(UNRESOLVED_NAME),
            Slot::Bye => Self::placeholder(BYE_NAME),
            Slot::Filled { entrant, score } => Self {
                name: entrant.display_name.clone(),
                nickname: entrant.short_name.clone(),
                db_id: Some(entrant.id),
                score: *score,
            },
        }
    }
}

impl From<SnapshotPlayer> for Slot {
    fn from(player: SnapshotPlayer) -> Self {
        match player.db_id {
            Some(id) => Slot::Filled {
                entrant: Entrant::new(id, player.name, player.nickname),
                score: player.score,
            },
            None if player.name == BYE_NAME => Slot::Bye,
            None => Slot::Unresolved,
        }
    }
}

/// Persisted match
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMatch {
    pub players: [SnapshotPlayer; 2],
    pub winner: Option<SlotIndex>,
    pub round_name: String,
    pub next_match: Option<MatchId>,
    pub next_loser_match: Option<MatchId>,
    /// Segment code: `WB`, `LB` or `GF`
    pub bracket: String,
    /// Grand-final matches only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needs_reset: Option<bool>,
}

impl From<&Match> for SnapshotMatch {
    fn from(m: &Match) -> Self {
        Self {
            players: [
                SnapshotPlayer::from(&m.slots[0]),
                SnapshotPlayer::from(&m.slots[1]),
            ],
            winner: m.winner,
            round_name: m.round_name.clone(),
            next_match: m.next_match,
            next_loser_match: m.next_loser_match,
            bracket: m.segment.code().to_string(),
            needs_reset: (m.segment == Segment::GrandFinal).then_some(m.needs_reset),
        }
    }
}

fn restore_match(key: &str, stored: SnapshotMatch) -> SnapshotResult<Match> {
    let id: MatchId = key
        .trim()
        .parse()
        .map_err(|_| SnapshotError::InvalidMatchKey(key.to_string()))?;
    let segment = Segment::from_code(&stored.bracket)
        .ok_or_else(|| SnapshotError::UnknownSegment(stored.bracket.clone()))?;

    let [first, second] = stored.players;
    let mut m = Match::new(id, segment, stored.round_name);
    m.slots = [Slot::from(first), Slot::from(second)];
    m.next_match = stored.next_match;
    m.next_loser_match = stored.next_loser_match;
    m.needs_reset = segment == Segment::GrandFinal && stored.needs_reset.unwrap_or(false);
    m.winner = stored.winner;
    Ok(m)
}

/// A winner must point at an entrant, and neither slot may still be
/// waiting on one.
fn check_winner(m: &Match) -> SnapshotResult<()> {
    let Some(winner) = m.winner else {
        return Ok(());
    };
    let winner_filled = m.slots.get(winner).is_some_and(Slot::is_filled);
    if !winner_filled || m.slots.iter().any(Slot::is_unresolved) {
        return Err(SnapshotError::InvalidWinner {
            match_id: m.id,
            winner,
        });
    }
    Ok(())
}

/// Checks shared by every way of restoring a bracket.
pub(crate) fn check_matches(matches: &BTreeMap<MatchId, Match>) -> SnapshotResult<()> {
    if matches.is_empty() {
        return Err(SnapshotError::Empty);
    }
    for m in matches.values() {
        check_winner(m)?;
        for target in [m.next_match, m.next_loser_match].into_iter().flatten() {
            if !matches.contains_key(&target) {
                return Err(SnapshotError::DanglingReference {
                    match_id: m.id,
                    target,
                });
            }
        }
    }
    Ok(())
}

/// Records written without a reset match still carry `needsReset` on the
/// grand final. With nothing to reset into, that grand final decides the
/// bracket.
pub(crate) fn clear_orphan_reset_flags(
    matches: &mut BTreeMap<MatchId, Match>,
    reset_match: Option<MatchId>,
) {
    if reset_match.is_some() {
        return;
    }
    for m in matches.values_mut() {
        m.needs_reset = false;
    }
}

/// Tag grand-final slots with the segment their entrant came from. The
/// reset match inherits the tags of the first grand final.
fn retag_grand_final(
    matches: &mut BTreeMap<MatchId, Match>,
    grand_final: MatchId,
    reset: Option<MatchId>,
) {
    let ranked = feeders(matches, grand_final);
    let Some(m) = matches.get_mut(&grand_final) else {
        return;
    };
    m.entry_segments = [None, None];
    for (index, feeder) in ranked.iter().take(2).enumerate() {
        if !m.slots[index].is_unresolved() {
            m.entry_segments[index] = Some(feeder.edge.entry_tag(feeder.segment));
        }
    }
    let tags = m.entry_segments;

    if let Some(reset) = reset.and_then(|id| matches.get_mut(&id))
        && !reset.slots.iter().all(Slot::is_unresolved)
    {
        reset.entry_segments = tags;
    }
}

impl BracketState {
    /// Convert to the persisted shape.
    pub fn to_snapshot(&self) -> BracketSnapshot {
        self.matches
            .iter()
            .map(|(id, m)| (id.to_string(), SnapshotMatch::from(m)))
            .collect()
    }

    /// Rebuild a bracket from its persisted shape.
    ///
    /// # Errors
    ///
    /// * [`SnapshotError::Empty`] - no matches
    /// * [`SnapshotError::InvalidMatchKey`] - a key that is not a match id,
    ///   or a second key for the same id
    /// * [`SnapshotError::UnknownSegment`] - a `bracket` value other than `WB`, `LB` or `GF`
    /// * [`SnapshotError::InvalidWinner`] - a winner that points at no
    ///   entrant, or beside a slot still waiting on one
    /// * [`SnapshotError::DanglingReference`] - a link to a missing match
    pub fn from_snapshot(snapshot: BracketSnapshot) -> SnapshotResult<Self> {
        if snapshot.is_empty() {
            return Err(SnapshotError::Empty);
        }

        let mut matches = BTreeMap::new();
        for (key, stored) in snapshot {
            let m = restore_match(&key, stored)?;
            if matches.insert(m.id, m).is_some() {
                return Err(SnapshotError::InvalidMatchKey(key));
            }
        }
        check_matches(&matches)?;

        let format = if matches.values().any(|m| m.segment != Segment::Winners) {
            BracketFormat::DoubleElimination
        } else {
            BracketFormat::SingleElimination
        };

        let grand_finals: Vec<MatchId> = matches
            .values()
            .filter(|m| m.segment == Segment::GrandFinal)
            .map(|m| m.id)
            .collect();
        let reset_match = grand_finals.get(1).copied();
        clear_orphan_reset_flags(&mut matches, reset_match);
        if let Some(&grand_final) = grand_finals.first() {
            retag_grand_final(&mut matches, grand_final, reset_match);
        }

        let entrant_count = first_round_entrants(&matches).len();
        Ok(Self::new(format, entrant_count, matches, reset_match))
    }

    /// Persisted shape as a JSON string
    pub fn to_json(&self) -> SnapshotResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_snapshot())?)
    }

    pub fn from_json(json: &str) -> SnapshotResult<Self> {
        let snapshot: BracketSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }
}

/// Entrant ids seeded into the winners bracket's first round, which are
/// the winners matches nothing else feeds.
fn first_round_entrants(matches: &BTreeMap<MatchId, Match>) -> BTreeSet<EntrantId> {
    let fed: BTreeSet<MatchId> = matches
        .values()
        .filter(|m| m.segment == Segment::Winners)
        .filter_map(|m| m.next_match)
        .collect();

    matches
        .values()
        .filter(|m| m.segment == Segment::Winners && !fed.contains(&m.id))
        .flat_map(|m| m.slots.iter().filter_map(|slot| slot.entrant().map(|e| e.id)))
        .collect()
}
