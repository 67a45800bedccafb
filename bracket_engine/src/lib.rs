//! # Bracket Engine
//!
//! Single- and double-elimination tournament brackets as an explicit,
//! caller-owned value.
//!
//! A bracket is generated once from a roster and then driven forward one
//! reported result at a time. Every match lives in a flat arena keyed by
//! its id, and links between matches are ids into that arena.
//!
//! ## Lifecycle
//!
//! - **Shuffle**: the roster is put into a random draw order
//! - **Plan**: bracket size, byes and round names follow from the roster size
//! - **Build**: matches are created and linked, and byes resolve on the spot
//! - **Advance**: each result moves the winner (and, in the winners bracket,
//!   the loser) into the designated slot of the next match
//!
//! ## Core Modules
//!
//! - [`bracket`]: models, builders, advancement and snapshots
//!
//! ## Example
//!
//! ```
//! use bracket_engine::{BracketEngine, BracketFormat, Entrant};
//!
//! let entrants = vec![
//!     Entrant::new(1, "Ana Souza", "ana"),
//!     Entrant::new(2, "Bruno Lima", "bruno"),
//!     Entrant::new(3, "Carla Dias", "carla"),
//! ];
//! let state = BracketEngine::default()
//!     .generate_in_order(entrants, BracketFormat::DoubleElimination)
//!     .unwrap();
//!
//! assert_eq!(state.entrant_count(), 3);
//! assert!(state.grand_final().is_some());
//! ```

/// Bracket models, generation and advancement.
pub mod bracket;
pub use bracket::{
    AdvanceError, AdvanceResult, BracketEngine, BracketFormat, BracketSnapshot, BracketState,
    DoubleEliminationBuilder, EngineConfig, Entrant, EntrantId, GrandFinalPolicy, Match, MatchId,
    MatchReport, PlanError, PlanResult, Round, RoundPlan, RoundPlanner, SeedShuffler, Segment,
    SingleEliminationBuilder, Slot, SlotIndex, SnapshotError, SnapshotResult,
};
