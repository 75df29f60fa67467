//! Backlog Simulator Core - Rust Engine
//!
//! Discrete-time backlog propagation simulator with deterministic execution.
//! Models day-by-day accumulation, aging, SLA breach, capacity-constrained
//! resolution, and overflow handling of a work-item backlog.
//!
//! # Architecture
//!
//! - **models**: Domain types (BacklogItem, profile, feeds, snapshots, events)
//! - **rng**: Deterministic random number generation
//! - **demand**: Demand synthesis (aggregate counts → concrete items)
//! - **allocator**: Capacity-bounded resolution planning
//! - **overflow**: Overflow strategies (reject, defer, escalate, outsource)
//! - **sla**: Aging escalation and SLA tracking
//! - **metrics**: Daily snapshots and run summaries
//! - **driver**: The day loop
//! - **scenarios**: Preset profiles and comparison runs
//!
//! # Critical Invariants
//!
//! 1. Same config + same inputs + same seed → bit-identical results
//! 2. Randomness is scoped to demand synthesis only
//! 3. Terminal items never mutate
//! 4. Every item is accounted for: resolved, decayed, rejected, outsourced,
//!    abandoned, or still in the backlog

// Module declarations
pub mod allocator;
pub mod demand;
pub mod driver;
pub mod metrics;
pub mod models;
pub mod overflow;
pub mod rng;
pub mod scenarios;
pub mod sla;

// Re-exports for convenience
pub use allocator::{plan_allocation, AllocationPlan};
pub use demand::DemandSynthesizer;
pub use driver::{SimulationConfig, SimulationDriver, SimulationError};
pub use models::{
    event::{Event, EventLog},
    inputs::{DailyCapacity, DailyDemand},
    item::{BacklogItem, Complexity, ItemError, ItemStatus, Priority},
    profile::PropagationProfile,
    snapshot::{AgeBucket, DailySnapshot, MetricValue, SimulationResult, SummaryStats},
};
pub use overflow::{OverflowOutcome, OverflowStrategy};
pub use rng::DeterministicRng;
pub use scenarios::{run_comparison, PresetScenario};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn backlog_simulator_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::PySimulation>()?;
    Ok(())
}
