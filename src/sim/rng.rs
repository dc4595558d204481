//! Deterministic linear congruential generator
//!
//! Used for spawn placement. Same seed + same call sequence gives bit-identical
//! output on every platform: the state is a `u32` and all arithmetic wraps.

use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// Numerical Recipes LCG multiplier
pub const LCG_MULTIPLIER: u32 = 1_664_525;
/// Numerical Recipes LCG increment
pub const LCG_INCREMENT: u32 = 1_013_904_223;

/// 1 / 2^24, the scale for a 24-bit mantissa fraction
const UNIT_24: f32 = 1.0 / 16_777_216.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Current raw state (the last value returned by `next`, or the seed)
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Reset to a fresh seed
    pub fn reseed(&mut self, seed: u32) {
        self.state = seed;
    }

    /// Advance the state and return it
    #[inline]
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state
    }

    /// Uniform float in [0, 1) from the upper 24 bits
    #[inline]
    pub fn next01(&mut self) -> f32 {
        (self.next() >> 8) as f32 * UNIT_24
    }
}

impl RngCore for Lcg {
    fn next_u32(&mut self) -> u32 {
        self.next()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = u64::from(self.next());
        let lo = u64::from(self.next());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let bytes = self.next().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

impl SeedableRng for Lcg {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}
