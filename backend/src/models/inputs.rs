//! Daily external inputs: capacity and demand feeds
//!
//! Both feeds are keyed by calendar date. The driver requires exactly one
//! entry of each per simulated day; missing or duplicate dates are
//! configuration errors.

use crate::models::item::{Complexity, Priority};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resolution capacity available on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCapacity {
    /// The day this capacity applies to
    pub date: NaiveDate,

    /// Total staff-hours available across all work
    pub total_capacity_hours: f64,

    /// Hours reserved for working down the backlog
    pub backlog_capacity_hours: f64,

    /// Hours reserved for same-day new work (informational)
    pub new_work_capacity_hours: f64,

    /// Headcount on shift (informational)
    pub staff_count: u32,

    /// Multiplier on backlog hours (illness, tooling, training)
    pub productivity_modifier: f64,

    /// Hard cap on items resolved this day, regardless of hours
    pub max_items_per_day: Option<usize>,

    /// Hard cap on Complex items resolved this day
    pub max_complex_items_per_day: Option<usize>,
}

impl DailyCapacity {
    /// A plain capacity entry: the given backlog hours, no caps, neutral
    /// productivity. Convenient for tests and synthetic scenarios.
    pub fn flat(date: NaiveDate, backlog_hours: f64) -> Self {
        Self {
            date,
            total_capacity_hours: backlog_hours,
            backlog_capacity_hours: backlog_hours,
            new_work_capacity_hours: 0.0,
            staff_count: 1,
            productivity_modifier: 1.0,
            max_items_per_day: None,
            max_complex_items_per_day: None,
        }
    }
}

/// Aggregate demand arriving on one calendar day, to be synthesized into
/// concrete items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyDemand {
    /// The day these items arrive
    pub date: NaiveDate,

    /// New item counts per priority
    pub new_items_by_priority: BTreeMap<Priority, usize>,

    /// Complexity mix of the day's batch. When the totals disagree with the
    /// priority counts (or the map is empty), synthesis falls back to the
    /// default categorical weights.
    pub new_items_by_complexity: BTreeMap<Complexity, usize>,

    /// Caller's own effort estimate for the batch (informational)
    pub total_estimated_effort_hours: f64,
}

impl DailyDemand {
    /// A day with no arrivals.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            new_items_by_priority: BTreeMap::new(),
            new_items_by_complexity: BTreeMap::new(),
            total_estimated_effort_hours: 0.0,
        }
    }

    /// Total item count across all priorities.
    pub fn total_items(&self) -> usize {
        self.new_items_by_priority.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_flat_capacity() {
        let cap = DailyCapacity::flat(date(1), 8.0);
        assert_eq!(cap.backlog_capacity_hours, 8.0);
        assert_eq!(cap.productivity_modifier, 1.0);
        assert_eq!(cap.max_items_per_day, None);
    }

    #[test]
    fn test_demand_totals() {
        let mut demand = DailyDemand::empty(date(1));
        assert_eq!(demand.total_items(), 0);

        demand.new_items_by_priority.insert(Priority::Low, 3);
        demand.new_items_by_priority.insert(Priority::Critical, 2);
        assert_eq!(demand.total_items(), 5);
    }
}
