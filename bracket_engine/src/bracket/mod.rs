//! Single- and double-elimination tournament brackets.
//!
//! This module provides:
//! - Roster shuffling and bracket sizing with byes
//! - Bracket construction for both formats
//! - Result reporting with forward placement and bye cascades
//! - Conversion to the persisted tournament record shape
//!
//! ## Example
//!
//! ```
//! use bracket_engine::bracket::{BracketEngine, BracketFormat, Entrant, MatchReport};
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let entrants = (1..=4)
//!     .map(|id| Entrant::new(id, format!("Player {id}"), format!("P{id}")))
//!     .collect();
//! let mut state = BracketEngine::default()
//!     .generate(entrants, BracketFormat::SingleElimination, &mut StdRng::seed_from_u64(1))
//!     .unwrap();
//!
//! let first = state.ready_matches()[0];
//! state.advance(first, MatchReport::Scores { p1: 2, p2: 1 }).unwrap();
//! assert_eq!(state.current_round_name(), "Semifinais");
//! ```

pub mod advance;
mod builder;
pub mod config;
pub mod double;
pub mod engine;
pub mod errors;
pub mod models;
pub mod planner;
pub mod shuffler;
pub mod single;
pub mod snapshot;

pub use advance::MatchReport;
pub use config::{EngineConfig, GrandFinalPolicy};
pub use double::DoubleEliminationBuilder;
pub use engine::BracketEngine;
pub use errors::{
    AdvanceError, AdvanceResult, PlanError, PlanResult, SnapshotError, SnapshotResult,
};
pub use models::{
    BracketFormat, BracketState, Entrant, EntrantId, Match, MatchId, Round, Segment, Slot,
    SlotIndex,
};
pub use planner::{RoundPlan, RoundPlanner};
pub use shuffler::SeedShuffler;
pub use single::SingleEliminationBuilder;
pub use snapshot::{BracketSnapshot, SnapshotMatch, SnapshotPlayer};
