//! Daily snapshots, run summary, and the simulation result envelope
//!
//! Snapshots are pure observations of end-of-day state plus the day's flow
//! counters. All maps are `BTreeMap` so JSON serialization is canonical and
//! the result digest is stable across runs and platforms.

use crate::models::item::{BacklogItem, Priority};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

// ============================================================================
// Age Buckets
// ============================================================================

/// Histogram buckets for item age in backlog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeBucket {
    #[serde(rename = "0-1 days")]
    UpToOne,
    #[serde(rename = "1-3 days")]
    OneToThree,
    #[serde(rename = "4-7 days")]
    FourToSeven,
    #[serde(rename = "8-14 days")]
    EightToFourteen,
    #[serde(rename = "15+ days")]
    FifteenPlus,
}

impl AgeBucket {
    /// Bucket for a given age in days.
    pub fn for_age(days: u32) -> AgeBucket {
        match days {
            0 => AgeBucket::UpToOne,
            1..=3 => AgeBucket::OneToThree,
            4..=7 => AgeBucket::FourToSeven,
            8..=14 => AgeBucket::EightToFourteen,
            _ => AgeBucket::FifteenPlus,
        }
    }
}

// ============================================================================
// Metric Values
// ============================================================================

/// A metric that may be undefined for a given day.
///
/// Division-by-zero cases (utilization with zero capacity, recovery estimate
/// with zero throughput) are reported as `Indeterminate` rather than NaN,
/// infinity, or a magic number. An indeterminate metric is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
    Known(f64),
    Indeterminate,
}

impl MetricValue {
    pub fn known(self) -> Option<f64> {
        match self {
            MetricValue::Known(v) => Some(v),
            MetricValue::Indeterminate => None,
        }
    }
}

// ============================================================================
// Daily Snapshot
// ============================================================================

/// End-of-day observation of backlog state plus the day's flow counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySnapshot {
    /// The simulated day this snapshot closes
    pub date: NaiveDate,

    // ---- Stock (end-of-day backlog state) ----
    /// Non-terminal items remaining
    pub total_items: usize,

    /// Non-terminal items by current priority
    pub items_by_priority: BTreeMap<Priority, usize>,

    /// Non-terminal items by age bucket
    pub items_by_age: BTreeMap<AgeBucket, usize>,

    /// Sum of effort estimates over remaining items
    pub total_estimated_effort_hours: f64,

    /// Mean `days_in_backlog` over remaining items (0.0 when empty)
    pub avg_age_days: f64,

    /// Max `days_in_backlog` over remaining items (0 when empty)
    pub oldest_item_age_days: u32,

    // ---- SLA ----
    /// Remaining items past their due date
    pub sla_breached_count: usize,

    /// Remaining items due tomorrow or today (not yet breached)
    pub sla_at_risk_count: usize,

    /// Fraction of remaining items not breached (1.0 when empty)
    pub sla_compliance_rate: f64,

    // ---- Capacity ----
    /// Hours used / effective hours available; indeterminate at zero capacity
    pub capacity_utilization: MetricValue,

    /// Hours actually consumed by today's resolutions
    pub capacity_used_hours: f64,

    // ---- Flow (today's counters) ----
    /// Items resolved by capacity allocation today
    pub items_resolved: usize,

    /// Items resolved by decay today
    pub items_decayed: usize,

    /// Items synthesized from today's demand
    pub new_items: usize,

    /// Priority escalations from aging today
    pub items_aged_up: usize,

    /// Items abandoned at today's day boundary (propagation shortfall)
    pub items_abandoned: usize,

    /// Items currently in Deferred status (stock, not flow)
    pub items_deferred: usize,

    /// Items the overflow dispatcher acted on today
    pub overflow_count: usize,

    // ---- Financial / customer ----
    /// Cumulative SLA penalties plus outsourcing costs through today
    pub financial_impact: f64,

    /// Cumulative outsourcing costs through today
    pub outsourcing_cost: f64,

    /// Composite customer impact of today's end state
    pub customer_impact_score: f64,

    /// Days to drain the backlog at today's net throughput; indeterminate
    /// when throughput is non-positive or on day 0
    pub estimated_recovery_days: MetricValue,
}

// ============================================================================
// Run Summary
// ============================================================================

/// Aggregates over a whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Items leaving the backlog for any reason (resolved, decayed,
    /// outsourced, rejected, abandoned)
    pub total_items_processed: usize,

    /// Items synthesized from demand over the run
    pub total_new_items: usize,

    /// Final backlog size minus initial backlog size
    pub net_backlog_change: i64,

    /// Mean end-of-day backlog size
    pub avg_daily_backlog: f64,

    /// Max end-of-day backlog size
    pub peak_daily_backlog: usize,

    /// Mean daily SLA compliance rate
    pub avg_sla_compliance_rate: f64,

    /// Total distinct items that breached SLA during the run
    pub total_sla_breaches: usize,

    /// Mean of the known daily recovery estimates; indeterminate when
    /// every day was indeterminate
    pub avg_recovery_days: MetricValue,

    /// Final cumulative financial impact
    pub total_financial_impact: f64,

    /// Non-terminal items at end of run
    pub final_backlog_size: usize,
}

// ============================================================================
// Simulation Result
// ============================================================================

/// Complete output of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: u32,
    pub daily_snapshots: Vec<DailySnapshot>,
    /// Non-terminal items remaining at end of run
    pub final_backlog_items: Vec<BacklogItem>,
    pub summary: SummaryStats,
    pub seed_used: u64,
}

impl SimulationResult {
    /// SHA-256 hex digest of the serialized result.
    ///
    /// Serialization is canonical without extra work: all maps are
    /// `BTreeMap` and struct field order is fixed, so two identical runs
    /// produce byte-identical JSON and therefore identical digests.
    pub fn digest(&self) -> Result<String, serde_json::Error> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }
}
