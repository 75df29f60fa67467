//! scenario-runner: headless backlog simulation runner.
//!
//! Builds a synthetic daily capacity/demand feed, runs every preset
//! scenario over it, and prints one JSON summary per preset.
//!
//! Usage:
//!   scenario-runner --days 30 --demand 50 --capacity 40 --start 2024-03-01
//!   scenario-runner --days 30 --full    # full results, not just summaries

use anyhow::{Context, Result};
use backlog_simulator_core_rs::{
    run_comparison, Complexity, DailyCapacity, DailyDemand, Priority,
};
use chrono::{Duration, NaiveDate};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let days = parse_arg(&args, "--days", 30u32);
    let demand_count = parse_arg(&args, "--demand", 50usize);
    let capacity_hours = parse_arg(&args, "--capacity", 40.0f64);
    let full = args.iter().any(|a| a == "--full");
    let start = args
        .windows(2)
        .find(|w| w[0] == "--start")
        .map(|w| w[1].as_str())
        .unwrap_or("2024-03-01");

    let start_date = NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .context("--start must be an ISO date (YYYY-MM-DD)")?;
    let end_date = start_date + Duration::days(i64::from(days) - 1);

    eprintln!("backlog scenario-runner");
    eprintln!("  period:   {start_date} .. {end_date} ({days} days)");
    eprintln!("  demand:   {demand_count} items/day");
    eprintln!("  capacity: {capacity_hours} hours/day");
    eprintln!();

    let (capacities, demands) =
        synthetic_inputs(start_date, days, demand_count, capacity_hours);

    let results = run_comparison(start_date, end_date, &[], &capacities, &demands)
        .context("comparison run failed")?;

    for (preset, result) in &results {
        log::info!(
            "{}: final backlog {} after {} days",
            preset.name(),
            result.summary.final_backlog_size,
            result.total_days,
        );
        let body = if full {
            serde_json::to_string_pretty(result)?
        } else {
            serde_json::to_string_pretty(&serde_json::json!({
                "scenario": preset.name(),
                "seed": result.seed_used,
                "digest": result.digest()?,
                "summary": result.summary,
            }))?
        };
        println!("{body}");
    }

    Ok(())
}

/// A flat synthetic feed: the same capacity entry and demand mix every day.
/// 60% of hours go to the backlog; the priority split is 40/30/20/10 and
/// the complexity mix 50/35/15, scaled to the requested daily count.
fn synthetic_inputs(
    start_date: NaiveDate,
    days: u32,
    demand_count: usize,
    capacity_hours: f64,
) -> (Vec<DailyCapacity>, Vec<DailyDemand>) {
    let mut capacities = Vec::with_capacity(days as usize);
    let mut demands = Vec::with_capacity(days as usize);

    for offset in 0..days {
        let date = start_date + Duration::days(i64::from(offset));

        let mut capacity = DailyCapacity::flat(date, capacity_hours * 0.6);
        capacity.total_capacity_hours = capacity_hours;
        capacity.new_work_capacity_hours = capacity_hours * 0.4;
        capacity.staff_count = 10;
        capacity.max_items_per_day = Some(100);
        capacity.max_complex_items_per_day = Some(10);
        capacities.push(capacity);

        let mut demand = DailyDemand::empty(date);
        let count = demand_count as f64;
        for (priority, share) in [
            (Priority::Low, 0.4),
            (Priority::Medium, 0.3),
            (Priority::High, 0.2),
            (Priority::Critical, 0.1),
        ] {
            demand
                .new_items_by_priority
                .insert(priority, (count * share) as usize);
        }
        for (complexity, share) in [
            (Complexity::Simple, 0.5),
            (Complexity::Moderate, 0.35),
            (Complexity::Complex, 0.15),
        ] {
            demand
                .new_items_by_complexity
                .insert(complexity, (count * share) as usize);
        }
        demand.total_estimated_effort_hours = count * 0.5;
        demands.push(demand);
    }

    (capacities, demands)
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
