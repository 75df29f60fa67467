//! Driver Scenario Tests
//!
//! End-to-end day-loop behavior: steady state under matched capacity,
//! growth and rejection under sustained overload, and drain-down with
//! empty demand.

use backlog_simulator_core_rs::{
    BacklogItem, Complexity, DailyCapacity, DailyDemand, MetricValue, OverflowStrategy, Priority,
    PropagationProfile, SimulationConfig, SimulationDriver,
};
use chrono::NaiveDate;

// ============================================================================
// Test Helpers
// ============================================================================

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn steady_profile() -> PropagationProfile {
    PropagationProfile {
        propagation_rate: 1.0,
        decay_rate: 0.0,
        max_backlog_capacity: Some(500),
        aging_enabled: false,
        overflow_strategy: OverflowStrategy::Reject,
        sla_breach_threshold_days: 30,
        ..PropagationProfile::default()
    }
}

fn config(profile: PropagationProfile, days: u32) -> SimulationConfig {
    SimulationConfig {
        profile,
        start_date: date(1),
        end_date: date(days),
        seed: 42,
        recovery_mode: false,
    }
}

/// Capacity capped by item count, with hours never the binding constraint.
fn capped_capacity(d: u32, items_per_day: usize) -> DailyCapacity {
    let mut capacity = DailyCapacity::flat(date(d), 10_000.0);
    capacity.max_items_per_day = Some(items_per_day);
    capacity
}

fn medium_demand(d: u32, count: usize) -> DailyDemand {
    let mut demand = DailyDemand::empty(date(d));
    demand.new_items_by_priority.insert(Priority::Medium, count);
    demand
}

fn seed_item(n: usize) -> BacklogItem {
    BacklogItem::new(
        format!("SEED-{:04}", n),
        Priority::Low,
        Complexity::Simple,
        NaiveDate::from_ymd_opt(2024, 2, 20).unwrap(),
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
    )
    .with_effort_hours(1.0)
}

// ============================================================================
// Steady State: capacity exactly matches demand
// ============================================================================

#[test]
fn test_matched_capacity_holds_steady_state() {
    let days = 30;
    let initial: Vec<BacklogItem> = (1..=10).map(seed_item).collect();

    let capacities: Vec<DailyCapacity> =
        (1..=days).map(|d| capped_capacity(d, 50)).collect();
    let demands: Vec<DailyDemand> = (1..=days).map(|d| medium_demand(d, 50)).collect();

    let mut driver = SimulationDriver::new(config(steady_profile(), days), initial).unwrap();
    let result = driver.run(&capacities, &demands).unwrap();

    for snapshot in &result.daily_snapshots {
        assert_eq!(snapshot.total_items, 10, "backlog must hold steady");
        assert_eq!(snapshot.items_resolved, 50);
        assert_eq!(snapshot.new_items, 50);
        assert_eq!(snapshot.overflow_count, 0, "no rejections at steady state");
        assert_eq!(snapshot.items_abandoned, 0);
    }

    assert_eq!(result.summary.final_backlog_size, 10);
    assert_eq!(result.summary.net_backlog_change, 0);
    assert_eq!(result.summary.total_new_items, 50 * days as usize);
    assert_eq!(result.summary.total_items_processed, 50 * days as usize);
}

// ============================================================================
// Overload: demand exceeds capacity, REJECT at the cap
// ============================================================================

#[test]
fn test_overload_grows_then_rejects_at_cap() {
    let days = 30;
    let mut profile = steady_profile();
    profile.max_backlog_capacity = Some(100);

    let capacities: Vec<DailyCapacity> =
        (1..=days).map(|d| capped_capacity(d, 40)).collect();
    let demands: Vec<DailyDemand> = (1..=days).map(|d| medium_demand(d, 50)).collect();

    let mut driver = SimulationDriver::new(config(profile, days), Vec::new()).unwrap();
    let result = driver.run(&capacities, &demands).unwrap();

    for (i, snapshot) in result.daily_snapshots.iter().enumerate() {
        let day = i + 1;
        if day <= 10 {
            // Net +10/day until the cap is reached on day 10.
            assert_eq!(snapshot.total_items, 10 * day, "day {}", day);
            assert_eq!(snapshot.overflow_count, 0, "day {}", day);
        } else {
            // At the cap: excess = demand - capacity - headroom = 50-40-0.
            assert_eq!(snapshot.total_items, 100, "day {}", day);
            assert_eq!(snapshot.overflow_count, 10, "day {}", day);
        }
        assert_eq!(snapshot.items_resolved, 40);
    }

    assert_eq!(result.summary.peak_daily_backlog, 100);
    assert_eq!(result.summary.final_backlog_size, 100);
}

#[test]
fn test_rejected_items_are_todays_newest() {
    let mut profile = steady_profile();
    profile.max_backlog_capacity = Some(5);

    let capacities = vec![capped_capacity(1, 0)];
    let demands = vec![medium_demand(1, 8)];

    let mut driver = SimulationDriver::new(config(profile, 1), Vec::new()).unwrap();
    let result = driver.run(&capacities, &demands).unwrap();

    // 8 arrive, none resolve, 3 over the cap are rejected newest-first;
    // ITEM-000001..5 survive.
    assert_eq!(result.daily_snapshots[0].overflow_count, 3);
    let mut survivors: Vec<&str> = result
        .final_backlog_items
        .iter()
        .map(|i| i.id())
        .collect();
    survivors.sort_unstable();
    assert_eq!(
        survivors,
        vec![
            "ITEM-000001",
            "ITEM-000002",
            "ITEM-000003",
            "ITEM-000004",
            "ITEM-000005"
        ]
    );
}

// ============================================================================
// Drain-down: empty demand never grows the backlog
// ============================================================================

#[test]
fn test_empty_demand_drains_monotonically() {
    let days = 10;
    let mut profile = steady_profile();
    profile.decay_rate = 0.1;
    profile.max_backlog_capacity = None;

    let initial: Vec<BacklogItem> = (1..=20).map(seed_item).collect();
    let capacities: Vec<DailyCapacity> =
        (1..=days).map(|d| DailyCapacity::flat(date(d), 2.0)).collect();
    let demands: Vec<DailyDemand> = (1..=days).map(|d| DailyDemand::empty(date(d))).collect();

    let mut driver = SimulationDriver::new(config(profile, days), initial).unwrap();
    let result = driver.run(&capacities, &demands).unwrap();

    let mut prev = 20usize;
    for snapshot in &result.daily_snapshots {
        assert!(
            snapshot.total_items <= prev,
            "backlog grew from {} to {} on {}",
            prev,
            snapshot.total_items,
            snapshot.date
        );
        assert_eq!(snapshot.new_items, 0);
        prev = snapshot.total_items;
    }

    assert_eq!(result.summary.final_backlog_size, 0);
    assert_eq!(result.summary.total_items_processed, 20);
}

// ============================================================================
// Recovery estimate: yesterday's net resolution rate
// ============================================================================

#[test]
fn test_recovery_estimate_uses_yesterdays_net_rate() {
    let initial: Vec<BacklogItem> = (1..=9).map(seed_item).collect();

    // Day 1 resolves 2 with no arrivals; days 2-3 resolve nothing.
    let capacities = vec![
        capped_capacity(1, 2),
        capped_capacity(2, 0),
        capped_capacity(3, 0),
    ];
    let demands: Vec<DailyDemand> = (1..=3).map(|d| DailyDemand::empty(date(d))).collect();

    let mut driver = SimulationDriver::new(config(steady_profile(), 3), initial).unwrap();
    let result = driver.run(&capacities, &demands).unwrap();

    // No prior day to rate against.
    assert_eq!(
        result.daily_snapshots[0].estimated_recovery_days,
        MetricValue::Indeterminate
    );
    // 7 items left at yesterday's net rate of +2/day: 3.5 days.
    assert_eq!(
        result.daily_snapshots[1].estimated_recovery_days,
        MetricValue::Known(3.5)
    );
    // Day 2 netted zero, so day 3 cannot be rated.
    assert_eq!(
        result.daily_snapshots[2].estimated_recovery_days,
        MetricValue::Indeterminate
    );
}

// ============================================================================
// Initial backlog ids inside the synthesized namespace
// ============================================================================

#[test]
fn test_initial_ids_in_synthesized_namespace_do_not_collide() {
    let initial = vec![BacklogItem::new(
        "ITEM-000002".to_string(),
        Priority::Low,
        Complexity::Simple,
        NaiveDate::from_ymd_opt(2024, 2, 20).unwrap(),
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
    )
    .with_effort_hours(1.0)];

    let capacities = vec![capped_capacity(1, 10)];
    let demands = vec![medium_demand(1, 2)];

    let mut driver = SimulationDriver::new(config(steady_profile(), 1), initial).unwrap();
    let result = driver.run(&capacities, &demands).unwrap();

    // Arrivals are numbered past the taken id, so all three items resolve
    // exactly once.
    assert_eq!(result.daily_snapshots[0].items_resolved, 3);
    assert_eq!(result.summary.final_backlog_size, 0);
    assert_eq!(result.summary.total_items_processed, 3);
}

// ============================================================================
// Feed validation surfaces through run()
// ============================================================================

#[test]
fn test_run_fails_cleanly_on_missing_feed_day() {
    let capacities = vec![capped_capacity(1, 10)]; // day 2 missing
    let demands = vec![medium_demand(1, 5), medium_demand(2, 5)];

    let mut driver = SimulationDriver::new(config(steady_profile(), 2), Vec::new()).unwrap();
    let err = driver.run(&capacities, &demands).unwrap_err();
    assert!(err.to_string().contains("missing capacity entry"));
}
