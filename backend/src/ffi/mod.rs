//! Python interface (behind the `pyo3` feature)
//!
//! The hosting Python service owns persistence, HTTP validation, and feed
//! preparation; this boundary takes a plain config dict and hands back the
//! full result as nested dicts and lists.

pub mod simulation;
pub mod types;

pub use simulation::PySimulation;
