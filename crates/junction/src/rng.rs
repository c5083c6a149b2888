//! Deterministic RNG resource for synthetic lane readings.
//!
//! Wraps `ChaCha8Rng` so a fixed seed replays the same perturbation
//! sequence on every platform.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::DEFAULT_SEED;

// ---------------------------------------------------------------------------
// CycleRng resource
// ---------------------------------------------------------------------------

/// Randomness used by the measurement fallback. Systems take
/// `ResMut<CycleRng>` and draw from `rng.0`.
#[derive(Resource)]
pub struct CycleRng(pub ChaCha8Rng);

impl Default for CycleRng {
    fn default() -> Self {
        Self(ChaCha8Rng::seed_from_u64(DEFAULT_SEED))
    }
}

impl CycleRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
