//! Lock-free per-edge rating accumulator.
//!
//! A rating is a running `(sum, count)` pair.  Both halves live in one
//! `AtomicU64`: the upper 32 bits hold the `f32` bit pattern of the sum, the
//! lower 32 bits the count.  Updates go through a compare-exchange loop, so
//! two concurrent ratings on the same edge both land and a reader never sees
//! a sum from one update paired with the count of another.

use std::sync::atomic::{AtomicU64, Ordering};

pub struct EdgeRating(AtomicU64);

#[inline]
fn pack(sum: f32, count: u32) -> u64 {
    ((sum.to_bits() as u64) << 32) | count as u64
}

#[inline]
fn unpack(bits: u64) -> (f32, u32) {
    (f32::from_bits((bits >> 32) as u32), bits as u32)
}

impl EdgeRating {
    pub fn new(sum: f32, count: u32) -> Self {
        EdgeRating(AtomicU64::new(pack(sum, count)))
    }

    /// Consistent `(sum, count)` snapshot.
    #[inline]
    pub fn get(&self) -> (f32, u32) {
        unpack(self.0.load(Ordering::Acquire))
    }

    /// Mean rating, or `None` while unrated.
    pub fn average(&self) -> Option<f32> {
        let (sum, count) = self.get();
        (count > 0).then(|| sum / count as f32)
    }

    /// Fold one more rating in; returns the new `(sum, count)`.
    pub fn add(&self, value: f32) -> (f32, u32) {
        let update = |bits: u64| {
            let (sum, count) = unpack(bits);
            Some(pack(sum + value, count.saturating_add(1)))
        };
        // The closure never returns `None`, so both arms carry the previous value.
        let prev = match self.0.fetch_update(Ordering::AcqRel, Ordering::Acquire, update) {
            Ok(bits) | Err(bits) => bits,
        };
        let (sum, count) = unpack(prev);
        (sum + value, count.saturating_add(1))
    }
}

impl Default for EdgeRating {
    fn default() -> Self {
        Self::new(0.0, 0)
    }
}

impl std::fmt::Debug for EdgeRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (sum, count) = self.get();
        f.debug_struct("EdgeRating").field("sum", &sum).field("count", &count).finish()
    }
}
