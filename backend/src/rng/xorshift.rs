//! xorshift64* random number generator
//!
//! A fast, deterministic PRNG. The engine scopes it strictly to demand
//! synthesis: given the same seed and inputs, a run is bit-identical.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use backlog_simulator_core_rs::DeterministicRng;
///
/// let mut rng = DeterministicRng::new(12345);
/// let minutes = rng.range_u32(15, 31); // [15, 31)
/// let p = rng.next_f64();
/// assert!(p >= 0.0 && p < 1.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeterministicRng {
    /// Internal state (64-bit, never zero)
    state: u64,
}

impl DeterministicRng {
    /// Create a new RNG with the given seed. A zero seed is coerced to 1
    /// (xorshift requires non-zero state).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Advance the state and return the next random u64.
    pub fn next_u64(&mut self) -> u64 {
        // xorshift64* algorithm
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Random u32 in `[min, max)`.
    ///
    /// # Panics
    /// Panics if `min >= max`.
    pub fn range_u32(&mut self, min: u32, max: u32) -> u32 {
        assert!(min < max, "min must be less than max");
        let range_size = (max - min) as u64;
        min + (self.next_u64() % range_size) as u32
    }

    /// Random f64 in `[0.0, 1.0)`.
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next_u64();
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Pick an index from a categorical distribution given by non-negative
    /// weights. Falls back to index 0 on numerically degenerate input
    /// (all-zero weights).
    ///
    /// # Panics
    /// Panics if `weights` is empty.
    pub fn pick_weighted(&mut self, weights: &[f64]) -> usize {
        assert!(!weights.is_empty(), "weights must be non-empty");

        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return 0;
        }

        let mut target = self.next_f64() * total;
        for (i, &w) in weights.iter().enumerate() {
            if target < w {
                return i;
            }
            target -= w;
        }
        weights.len() - 1
    }

    /// Current state, for diagnostics.
    pub fn state(&self) -> u64 {
        self.state
    }
}
