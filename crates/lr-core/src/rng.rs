//! Per-attempt RNG and the running-total weighted selector.
//!
//! # Determinism strategy
//!
//! A routing request may carry a seed.  Every synthesis attempt derives its
//! own `SmallRng` from it:
//!
//!   seed = request_seed XOR (attempt * MIXING_CONSTANT)
//!
//! so attempts never share RNG state and a seeded request replays the same
//! attempt the same way no matter which worker thread runs it.  Unseeded
//! requests draw from OS entropy.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── RouteRng ──────────────────────────────────────────────────────────────────

/// RNG owned by a single synthesis attempt.  Not shared across threads.
pub struct RouteRng(SmallRng);

impl RouteRng {
    /// Seed deterministically from a request seed and an attempt index.
    pub fn new(seed: u64, attempt: u64) -> Self {
        let seed = seed ^ attempt.wrapping_mul(MIXING_CONSTANT);
        RouteRng(SmallRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        RouteRng(SmallRng::from_entropy())
    }

    /// Seeded when `seed` is present, entropy-backed otherwise.
    pub fn for_attempt(seed: Option<u64>, attempt: u64) -> Self {
        match seed {
            Some(seed) => Self::new(seed, attempt),
            None => Self::from_entropy(),
        }
    }

    /// Uniform `f64` in `[0, 1)`.
    #[inline]
    pub fn unit(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }

    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }
}

// ── WeightedChoice ────────────────────────────────────────────────────────────

/// Single-pass weighted reservoir selection over a stream of candidates.
///
/// Each offered item with weight `w` replaces the current pick with
/// probability `w / total_so_far`, so after the stream ends every item has
/// been picked with probability proportional to its weight.  Items with a
/// non-positive or non-finite weight are never picked.
pub struct WeightedChoice<T> {
    total: f64,
    picked: Option<T>,
}

impl<T> WeightedChoice<T> {
    pub fn new() -> Self {
        Self { total: 0.0, picked: None }
    }

    pub fn offer(&mut self, item: T, weight: f64, rng: &mut RouteRng) {
        if !(weight > 0.0 && weight.is_finite()) {
            return;
        }
        self.total += weight;
        if rng.unit() * self.total < weight {
            self.picked = Some(item);
        }
    }

    /// Sum of accepted weights so far.
    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn finish(self) -> Option<T> {
        self.picked
    }
}

impl<T> Default for WeightedChoice<T> {
    fn default() -> Self {
        Self::new()
    }
}
