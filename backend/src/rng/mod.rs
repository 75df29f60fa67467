//! Deterministic randomness, scoped to demand synthesis

pub mod xorshift;

pub use xorshift::DeterministicRng;
