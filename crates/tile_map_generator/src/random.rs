//! Random helpers shared by the generation stages.
//!
//! Every stage draws from a caller-supplied [`RngCore`], so a seeded generator
//! reproduces a map exactly.
use rand::RngCore;

/// Uniform float in `[0, 1)`.
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() as f32) / ((u32::MAX as f32) + 1.0)
}

/// Uniform index in `0..bound`. `bound` must be non-zero.
#[inline]
pub(crate) fn below(rng: &mut dyn RngCore, bound: usize) -> usize {
    debug_assert!(bound > 0, "below() requires a non-zero bound");
    ((rng.next_u64() as u128 * bound as u128) >> 64) as usize
}

/// Uniform value in `min..=max`. Returns `min` when the range is inverted.
#[inline]
pub(crate) fn range_inclusive(rng: &mut dyn RngCore, min: u32, max: u32) -> u32 {
    if max <= min {
        return min;
    }
    min + below(rng, (max - min) as usize + 1) as u32
}

/// Returns true with the given probability expressed in percent.
#[inline]
pub(crate) fn chance(rng: &mut dyn RngCore, percentage: f32) -> bool {
    if percentage <= 0.0 {
        return false;
    }
    rand01(rng) * 100.0 < percentage
}

pub(crate) fn pick<'a, T>(rng: &mut dyn RngCore, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        None
    } else {
        items.get(below(rng, items.len()))
    }
}

/// Fisher-Yates shuffle.
pub(crate) fn shuffle<T>(rng: &mut dyn RngCore, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = below(rng, i + 1);
        items.swap(i, j);
    }
}
