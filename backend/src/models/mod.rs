//! Core data models for the backlog propagation engine

pub mod event;
pub mod inputs;
pub mod item;
pub mod profile;
pub mod snapshot;

pub use event::{Event, EventLog};
pub use inputs::{DailyCapacity, DailyDemand};
pub use item::{BacklogItem, Complexity, ItemError, ItemStatus, Priority};
pub use profile::PropagationProfile;
pub use snapshot::{
    AgeBucket, DailySnapshot, MetricValue, SimulationResult, SummaryStats,
};
