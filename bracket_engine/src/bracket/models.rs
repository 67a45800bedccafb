//! Bracket data models: entrants, slots, matches and the bracket state.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

use super::errors::{PlanError, SnapshotError, SnapshotResult};
use super::snapshot::{check_matches, clear_orphan_reset_flags};

/// Entrant ID type (database id supplied by the caller)
pub type EntrantId = i64;

/// Match ID type
pub type MatchId = u32;

/// Slot position within a match, either 0 or 1
pub type SlotIndex = usize;

/// A registered entrant. The engine never creates these.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Entrant {
    pub id: EntrantId,
    pub display_name: String,
    pub short_name: String,
}

impl Entrant {
    pub fn new(id: EntrantId, display_name: impl Into<String>, short_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            short_name: short_name.into(),
        }
    }
}

impl fmt::Display for Entrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

/// One of the two entrant positions within a match.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum Slot {
    /// Waiting on an upstream result.
    #[default]
    Unresolved,
    /// No opponent will ever arrive here.
    Bye,
    Filled {
        entrant: Entrant,
        score: Option<u32>,
    },
}

impl Slot {
    #[must_use]
    pub fn filled(entrant: Entrant) -> Self {
        Self::Filled {
            entrant,
            score: None,
        }
    }

    pub fn entrant(&self) -> Option<&Entrant> {
        match self {
            Self::Filled { entrant, .. } => Some(entrant),
            _ => None,
        }
    }

    pub fn score(&self) -> Option<u32> {
        match self {
            Self::Filled { score, .. } => *score,
            _ => None,
        }
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Self::Filled { .. })
    }

    pub fn is_bye(&self) -> bool {
        matches!(self, Self::Bye)
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::Unresolved)
    }

    /// Only filled slots carry a score; returns whether it was stored.
    pub(crate) fn set_score(&mut self, value: u32) -> bool {
        match self {
            Self::Filled { score, .. } => {
                *score = Some(value);
                true
            }
            _ => false,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved => write!(f, "TBD"),
            Self::Bye => write!(f, "BYE"),
            Self::Filled {
                entrant,
                score: Some(score),
            } => write!(f, "{entrant} ({score})"),
            Self::Filled {
                entrant,
                score: None,
            } => write!(f, "{entrant}"),
        }
    }
}

/// Bracket segment a match belongs to. The ordering is used when
/// ranking feeders of a match.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Segment {
    Winners,
    Losers,
    GrandFinal,
}

impl Segment {
    /// Short code used by the persisted snapshot shape.
    pub fn code(self) -> &'static str {
        match self {
            Self::Winners => "WB",
            Self::Losers => "LB",
            Self::GrandFinal => "GF",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "WB" => Some(Self::Winners),
            "LB" => Some(Self::Losers),
            "GF" => Some(Self::GrandFinal),
            _ => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Which outcome of a match travels along a link.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Edge {
    Winner,
    Loser,
}

impl Edge {
    /// Segment an entrant is credited with when it arrives in the grand
    /// final along this edge. A winners-bracket loser that reaches the
    /// grand final directly is the losers-side finalist.
    pub(crate) fn entry_tag(self, source: Segment) -> Segment {
        match self {
            Self::Winner => source,
            Self::Loser => Segment::Losers,
        }
    }
}

/// An incoming link into a match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Feeder {
    pub edge: Edge,
    pub segment: Segment,
    pub match_id: MatchId,
}

/// A single match node in the bracket graph.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Match {
    pub(crate) id: MatchId,
    pub(crate) round_name: String,
    pub(crate) segment: Segment,
    pub(crate) slots: [Slot; 2],
    pub(crate) winner: Option<SlotIndex>,
    pub(crate) next_match: Option<MatchId>,
    pub(crate) next_loser_match: Option<MatchId>,
    pub(crate) needs_reset: bool,
    /// Grand-final only: the segment each finalist arrived from.
    pub(crate) entry_segments: [Option<Segment>; 2],
}

impl Match {
    pub(crate) fn new(id: MatchId, segment: Segment, round_name: impl Into<String>) -> Self {
        Self {
            id,
            round_name: round_name.into(),
            segment,
            slots: [Slot::Unresolved, Slot::Unresolved],
            winner: None,
            next_match: None,
            next_loser_match: None,
            needs_reset: false,
            entry_segments: [None, None],
        }
    }

    pub fn id(&self) -> MatchId {
        self.id
    }

    pub fn round_name(&self) -> &str {
        &self.round_name
    }

    pub fn segment(&self) -> Segment {
        self.segment
    }

    pub fn slots(&self) -> &[Slot; 2] {
        &self.slots
    }

    pub fn winner_slot(&self) -> Option<SlotIndex> {
        self.winner
    }

    pub fn next_match(&self) -> Option<MatchId> {
        self.next_match
    }

    pub fn next_loser_match(&self) -> Option<MatchId> {
        self.next_loser_match
    }

    pub fn needs_reset(&self) -> bool {
        self.needs_reset
    }

    pub fn entry_segment(&self, slot: SlotIndex) -> Option<Segment> {
        self.entry_segments.get(slot).copied().flatten()
    }

    pub fn winner(&self) -> Option<&Entrant> {
        self.winner
            .and_then(|slot| self.slots.get(slot))
            .and_then(Slot::entrant)
    }

    /// The eliminated entrant, if the match was played between two real
    /// entrants.
    pub fn loser(&self) -> Option<&Entrant> {
        self.winner
            .and_then(|slot| 1usize.checked_sub(slot))
            .and_then(|slot| self.slots.get(slot))
            .and_then(Slot::entrant)
    }

    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }

    /// Both entrants known and no result yet.
    pub fn is_ready(&self) -> bool {
        self.winner.is_none() && self.slots.iter().all(Slot::is_filled)
    }

    /// A match with exactly one bye slot.
    pub fn is_bye(&self) -> bool {
        self.slots.iter().filter(|slot| slot.is_bye()).count() == 1
    }

    /// A match with no entrants at all. Only happens in the losers bracket.
    pub fn is_void(&self) -> bool {
        self.slots.iter().all(Slot::is_bye)
    }

    pub fn slot_of(&self, entrant_id: EntrantId) -> Option<SlotIndex> {
        self.slots
            .iter()
            .position(|slot| slot.entrant().is_some_and(|e| e.id == entrant_id))
    }

    pub(crate) fn target(&self, edge: Edge) -> Option<MatchId> {
        match edge {
            Edge::Winner => self.next_match,
            Edge::Loser => self.next_loser_match,
        }
    }
}

/// Bracket format
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum BracketFormat {
    SingleElimination,
    DoubleElimination,
}

impl fmt::Display for BracketFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleElimination => write!(f, "single"),
            Self::DoubleElimination => write!(f, "double"),
        }
    }
}

impl FromStr for BracketFormat {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" | "single-elimination" | "simples" => Ok(Self::SingleElimination),
            "double" | "double-elimination" | "dupla" => Ok(Self::DoubleElimination),
            other => Err(PlanError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Consecutive matches sharing a segment and round name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Round {
    pub segment: Segment,
    pub name: String,
    pub match_ids: Vec<MatchId>,
}

/// The full bracket graph. Owned by the caller and mutated in place by
/// [`BracketState::advance`].
///
/// Deserializing runs the same checks as
/// [`BracketState::from_snapshot`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "StoredState")]
pub struct BracketState {
    pub(crate) matches: BTreeMap<MatchId, Match>,
    pub(crate) format: BracketFormat,
    pub(crate) current_round_name: String,
    pub(crate) entrant_count: usize,
    pub(crate) reset_match: Option<MatchId>,
}

/// Native serde shape of [`BracketState`] before validation. The current
/// round name is derived, so it is recomputed rather than trusted.
#[derive(Deserialize)]
struct StoredState {
    matches: BTreeMap<MatchId, Match>,
    format: BracketFormat,
    entrant_count: usize,
    reset_match: Option<MatchId>,
}

impl TryFrom<StoredState> for BracketState {
    type Error = SnapshotError;

    fn try_from(stored: StoredState) -> SnapshotResult<Self> {
        let StoredState {
            mut matches,
            format,
            entrant_count,
            reset_match,
        } = stored;

        for (&key, m) in &matches {
            if key != m.id {
                return Err(SnapshotError::InvalidMatchKey(key.to_string()));
            }
        }
        if let Some(id) = reset_match
            && matches.get(&id).is_none_or(|m| m.segment != Segment::GrandFinal)
        {
            return Err(SnapshotError::InvalidResetMatch(id));
        }
        check_matches(&matches)?;
        clear_orphan_reset_flags(&mut matches, reset_match);

        Ok(Self::new(format, entrant_count, matches, reset_match))
    }
}

impl BracketState {
    pub(crate) fn new(
        format: BracketFormat,
        entrant_count: usize,
        matches: BTreeMap<MatchId, Match>,
        reset_match: Option<MatchId>,
    ) -> Self {
        let mut state = Self {
            matches,
            format,
            current_round_name: String::new(),
            entrant_count,
            reset_match,
        };
        state.refresh_current_round();
        state
    }

    pub fn format(&self) -> BracketFormat {
        self.format
    }

    pub fn current_round_name(&self) -> &str {
        &self.current_round_name
    }

    pub fn entrant_count(&self) -> usize {
        self.entrant_count
    }

    pub fn reset_match_id(&self) -> Option<MatchId> {
        self.reset_match
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn match_by_id(&self, id: MatchId) -> Option<&Match> {
        self.matches.get(&id)
    }

    /// Matches in id order.
    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.matches.values()
    }

    pub fn rounds(&self) -> Vec<Round> {
        let mut rounds: Vec<Round> = Vec::new();
        for m in self.matches.values() {
            match rounds.last_mut() {
                Some(round) if round.segment == m.segment && round.name == m.round_name => {
                    round.match_ids.push(m.id);
                }
                _ => rounds.push(Round {
                    segment: m.segment,
                    name: m.round_name.clone(),
                    match_ids: vec![m.id],
                }),
            }
        }
        rounds
    }

    /// Matches that can take a result right now.
    pub fn ready_matches(&self) -> Vec<MatchId> {
        self.matches
            .values()
            .filter(|m| m.is_ready())
            .map(|m| m.id)
            .collect()
    }

    /// The first grand-final match (double elimination only).
    pub fn grand_final(&self) -> Option<&Match> {
        self.matches
            .values()
            .find(|m| m.segment == Segment::GrandFinal)
    }

    /// The match whose winner takes the tournament, as things stand.
    pub fn deciding_match(&self) -> Option<&Match> {
        match self.format {
            BracketFormat::SingleElimination => {
                self.matches.values().find(|m| m.next_match.is_none())
            }
            BracketFormat::DoubleElimination => {
                let grand_final = self.grand_final()?;
                if grand_final.needs_reset && grand_final.is_decided() {
                    self.reset_match.and_then(|id| self.matches.get(&id))
                } else {
                    Some(grand_final)
                }
            }
        }
    }

    pub fn champion(&self) -> Option<&Entrant> {
        self.deciding_match().and_then(Match::winner)
    }

    pub fn is_complete(&self) -> bool {
        self.champion().is_some()
    }

    fn reset_active(&self) -> bool {
        self.reset_match
            .and_then(|id| self.matches.get(&id))
            .is_some_and(|m| !m.slots.iter().all(Slot::is_unresolved))
    }

    fn awaits_result(&self, m: &Match) -> bool {
        if m.winner.is_some() || m.is_void() {
            return false;
        }
        !(Some(m.id) == self.reset_match && !self.reset_active())
    }

    pub(crate) fn refresh_current_round(&mut self) {
        let name = self
            .matches
            .values()
            .find(|m| self.awaits_result(m))
            .or_else(|| self.deciding_match())
            .map(|m| m.round_name.clone())
            .unwrap_or_default();
        self.current_round_name = name;
    }
}

/// Incoming links of `target`, ranked so that the position in the list is
/// the slot the link feeds: winner links before loser links, same-segment
/// before cross-segment, then segment order, then match id.
pub(crate) fn feeders(matches: &BTreeMap<MatchId, Match>, target: MatchId) -> Vec<Feeder> {
    let Some(target_segment) = matches.get(&target).map(|m| m.segment) else {
        return Vec::new();
    };

    let mut feeders: Vec<Feeder> = matches
        .values()
        .flat_map(|m| {
            [Edge::Winner, Edge::Loser]
                .into_iter()
                .filter(move |&edge| m.target(edge) == Some(target))
                .map(move |edge| Feeder {
                    edge,
                    segment: m.segment,
                    match_id: m.id,
                })
        })
        .collect();

    feeders.sort_by_key(|f| {
        (
            f.edge == Edge::Loser,
            f.segment != target_segment,
            f.segment,
            f.match_id,
        )
    });
    feeders
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entrant(id: EntrantId) -> Entrant {
        Entrant::new(id, format!("Player {id}"), format!("P{id}"))
    }

    #[test]
    fn test_slot_accessors() {
        let slot = Slot::filled(entrant(1));
        assert!(slot.is_filled());
        assert_eq!(slot.entrant().map(|e| e.id), Some(1));
        assert_eq!(slot.score(), None);

        assert!(Slot::Bye.entrant().is_none());
        assert!(Slot::default().is_unresolved());
    }

    #[test]
    fn test_score_only_sticks_to_filled_slots() {
        let mut slot = Slot::filled(entrant(1));
        assert!(slot.set_score(3));
        assert_eq!(slot.score(), Some(3));

        let mut bye = Slot::Bye;
        assert!(!bye.set_score(3));
        assert_eq!(bye, Slot::Bye);
    }

    #[test]
    fn test_segment_codes() {
        for segment in [Segment::Winners, Segment::Losers, Segment::GrandFinal] {
            assert_eq!(Segment::from_code(segment.code()), Some(segment));
        }
        assert_eq!(Segment::from_code("XX"), None);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(
            "single".parse::<BracketFormat>(),
            Ok(BracketFormat::SingleElimination)
        );
        assert_eq!(
            "Dupla".parse::<BracketFormat>(),
            Ok(BracketFormat::DoubleElimination)
        );
        assert_eq!(
            "swiss".parse::<BracketFormat>(),
            Err(PlanError::UnsupportedFormat("swiss".to_string()))
        );
    }

    #[test]
    fn test_match_shape_queries() {
        let mut m = Match::new(1, Segment::Winners, "Final");
        assert!(!m.is_ready());

        m.slots = [Slot::filled(entrant(1)), Slot::Bye];
        assert!(m.is_bye());
        assert!(!m.is_void());

        m.slots = [Slot::Bye, Slot::Bye];
        assert!(m.is_void());

        m.slots = [Slot::filled(entrant(1)), Slot::filled(entrant(2))];
        assert!(m.is_ready());
        assert_eq!(m.slot_of(2), Some(1));

        m.winner = Some(1);
        assert_eq!(m.winner().map(|e| e.id), Some(2));
        assert_eq!(m.loser().map(|e| e.id), Some(1));
        assert!(!m.is_ready());
    }

    #[test]
    fn test_feeders_rank_winner_links_first() {
        let mut matches = BTreeMap::new();
        let mut wb = Match::new(1, Segment::Winners, "Final");
        wb.next_match = Some(2);
        wb.next_loser_match = Some(2);
        matches.insert(1, wb);
        matches.insert(2, Match::new(2, Segment::GrandFinal, "Grande Final"));

        let ranked = feeders(&matches, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].edge, Edge::Winner);
        assert_eq!(ranked[1].edge, Edge::Loser);
    }
}
