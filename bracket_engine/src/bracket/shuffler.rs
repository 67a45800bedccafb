//! Seed randomization before the bracket is drawn.

use rand::{Rng, SeedableRng, rngs::StdRng, rngs::ThreadRng, seq::SliceRandom};

use super::models::Entrant;

/// Returns the roster in a uniformly random order (Fisher-Yates).
pub fn shuffle_entrants<R: Rng + ?Sized>(mut entrants: Vec<Entrant>, rng: &mut R) -> Vec<Entrant> {
    entrants.shuffle(rng);
    entrants
}

/// Seed shuffler owning its random source
pub struct SeedShuffler<R> {
    rng: R,
}

impl SeedShuffler<StdRng> {
    /// Reproducible shuffler for a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SeedShuffler<R> {
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Shuffle a roster
    ///
    /// # Arguments
    ///
    /// * `entrants` - Roster in registration order
    ///
    /// # Returns
    ///
    /// * `Vec<Entrant>` - The same entrants in draw order
    pub fn shuffle(&mut self, entrants: Vec<Entrant>) -> Vec<Entrant> {
        shuffle_entrants(entrants, &mut self.rng)
    }
}

impl Default for SeedShuffler<ThreadRng> {
    fn default() -> Self {
        Self::from_rng(rand::rng())
    }
}
