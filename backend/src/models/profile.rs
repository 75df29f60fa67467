//! Propagation profile - reusable run configuration
//!
//! A profile is a template of behavioral parameters (rates, thresholds,
//! overflow strategy, costs) shared across runs; per-run settings such as
//! dates, seed, and recovery mode live on `SimulationConfig` instead.

use crate::overflow::OverflowStrategy;
use serde::{Deserialize, Serialize};

/// Behavioral parameters for a backlog propagation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationProfile {
    /// Fraction of unresolved items surviving each day boundary (0.0-1.0).
    /// Below 1.0, the remainder is abandoned at end of day.
    pub propagation_rate: f64,

    /// Fraction of the workable backlog resolved each day without consuming
    /// capacity (0.0-1.0). Models self-service, duplicates, auto-closure.
    pub decay_rate: f64,

    /// Backlog size above which the overflow strategy engages. `None`
    /// disables overflow handling entirely.
    pub max_backlog_capacity: Option<usize>,

    /// Whether items escalate priority as they age.
    pub aging_enabled: bool,

    /// Days in backlog between priority escalations. Must be > 0 when
    /// aging is enabled.
    pub aging_threshold_days: u32,

    /// What to do with excess items when the backlog exceeds capacity.
    pub overflow_strategy: OverflowStrategy,

    /// Days past creation before an item counts as an SLA breach.
    pub sla_breach_threshold_days: u32,

    /// Financial penalty accrued per breached item per day overdue.
    pub sla_penalty_per_day: f64,

    /// One-time cost per item handed to an external processor.
    pub outsourcing_cost_per_item: f64,

    /// Capacity multiplier applied when a run is flagged as recovery mode.
    pub recovery_rate_multiplier: f64,

    /// Advisory cap on the deferred-item count. Bookkeeping only; surfaced
    /// so callers can compare it against the snapshot's deferred count.
    pub max_waitlist_size: Option<usize>,
}

impl Default for PropagationProfile {
    fn default() -> Self {
        Self {
            propagation_rate: 1.0,
            decay_rate: 0.0,
            max_backlog_capacity: None,
            aging_enabled: true,
            aging_threshold_days: 3,
            overflow_strategy: OverflowStrategy::Reject,
            sla_breach_threshold_days: 1,
            sla_penalty_per_day: 100.0,
            outsourcing_cost_per_item: 50.0,
            recovery_rate_multiplier: 1.2,
            max_waitlist_size: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let profile = PropagationProfile::default();
        assert_eq!(profile.propagation_rate, 1.0);
        assert_eq!(profile.decay_rate, 0.0);
        assert_eq!(profile.max_backlog_capacity, None);
        assert!(profile.aging_enabled);
        assert_eq!(profile.aging_threshold_days, 3);
        assert_eq!(profile.overflow_strategy, OverflowStrategy::Reject);
        assert_eq!(profile.sla_breach_threshold_days, 1);
    }
}
