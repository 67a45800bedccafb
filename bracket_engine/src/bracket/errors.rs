//! Error types for bracket generation, advancement and snapshots.

use thiserror::Error;

use super::models::{EntrantId, MatchId, SlotIndex};

/// Result type for bracket generation
pub type PlanResult<T> = Result<T, PlanError>;

/// Errors raised while planning or building a bracket
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum PlanError {
    /// Fewer than two entrants
    #[error("need 2+ entrants, have {count}")]
    InsufficientEntrants { count: usize },

    /// Roster larger than the configured maximum
    #[error("too many entrants: {count} (max {max})")]
    TooManyEntrants { count: usize, max: usize },

    /// Format string that names no known bracket format
    #[error("unsupported bracket format: {0}")]
    UnsupportedFormat(String),

    /// The same entrant id appears twice in the roster
    #[error("entrant {0} is registered more than once")]
    DuplicateEntrant(EntrantId),

    /// Roster handed to a builder does not match its plan
    #[error("plan is for {expected} entrants, got {actual}")]
    RosterMismatch { expected: usize, actual: usize },

    /// Generation-time bye placement hit a broken link
    #[error("bracket topology is inconsistent: {0}")]
    InconsistentTopology(#[from] AdvanceError),
}

/// Result type for match advancement
pub type AdvanceResult<T> = Result<T, AdvanceError>;

/// Errors raised while reporting a match result
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum AdvanceError {
    #[error("match {0} does not exist")]
    UnknownMatchId(MatchId),

    #[error("match {match_id} is tied at {score} with no winner given")]
    Tie { match_id: MatchId, score: u32 },

    #[error("match {0} is missing a score")]
    IncompleteScores(MatchId),

    #[error("match {match_id} can't place into match {next_match_id}: both slots are taken")]
    NextMatchSlotsOccupied {
        match_id: MatchId,
        next_match_id: MatchId,
    },

    #[error("match {0} is still waiting on an entrant")]
    MatchNotReady(MatchId),

    #[error("match {0} is a bye and takes no result")]
    ByeMatch(MatchId),

    /// Pending scores can't be changed once the match has a result
    #[error("match {0} already has a result")]
    MatchDecided(MatchId),

    #[error("entrant {entrant_id} is not playing in match {match_id}")]
    EntrantNotInMatch {
        match_id: MatchId,
        entrant_id: EntrantId,
    },

    #[error("slot {0} out of bounds")]
    InvalidSlot(SlotIndex),

    /// A link points at a match that does not list the source as a feeder
    #[error("match {match_id} has a broken link to match {next_match_id}")]
    BrokenLink {
        match_id: MatchId,
        next_match_id: MatchId,
    },
}

/// Result type for snapshot conversion
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Errors raised while restoring a persisted snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot has no matches")]
    Empty,

    #[error("invalid match key: {0:?}")]
    InvalidMatchKey(String),

    #[error("unknown bracket segment: {0:?}")]
    UnknownSegment(String),

    #[error("match {match_id} points at missing match {target}")]
    DanglingReference { match_id: MatchId, target: MatchId },

    #[error("match {match_id} has an invalid winner slot {winner}")]
    InvalidWinner { match_id: MatchId, winner: SlotIndex },

    #[error("reset match {0} is not a grand-final match")]
    InvalidResetMatch(MatchId),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PlanError::InsufficientEntrants { count: 1 };
        assert_eq!(err.to_string(), "need 2+ entrants, have 1");

        let err = AdvanceError::NextMatchSlotsOccupied {
            match_id: 3,
            next_match_id: 7,
        };
        assert!(err.to_string().contains("match 7"));
    }

    #[test]
    fn test_topology_error_wraps_advance_error() {
        let err: PlanError = AdvanceError::UnknownMatchId(9).into();
        assert_eq!(
            err,
            PlanError::InconsistentTopology(AdvanceError::UnknownMatchId(9))
        );
    }
}
