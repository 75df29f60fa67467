//! Metrics aggregation: end-of-day snapshots and run summaries
//!
//! `build_snapshot` is a pure observation of the backlog plus the day's
//! flow counters handed over by the driver; it mutates nothing. The same
//! holds for `summarize` over a finished run.

use crate::models::item::{BacklogItem, ItemStatus};
use crate::models::snapshot::{AgeBucket, DailySnapshot, MetricValue, SummaryStats};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// The day's flow counters and cumulative figures, gathered by the driver.
#[derive(Debug, Clone)]
pub struct DayContext {
    pub date: NaiveDate,
    pub items_resolved: usize,
    pub items_decayed: usize,
    pub new_items: usize,
    pub items_aged_up: usize,
    pub items_abandoned: usize,
    pub overflow_count: usize,
    pub capacity_used_hours: f64,
    pub effective_capacity_hours: f64,
    pub cumulative_financial_impact: f64,
    pub cumulative_outsourcing_cost: f64,
    /// Previous day's net resolution rate (items resolved minus items newly
    /// added that day); `None` on the first day
    pub prev_net_resolution: Option<i64>,
}

/// Weight of an at-risk item in the customer impact score, relative to a
/// breached item's base weight of 1.
const AT_RISK_IMPACT_WEIGHT: f64 = 0.25;

/// Build the end-of-day snapshot from the backlog and the day's counters.
pub fn build_snapshot(backlog: &[BacklogItem], ctx: &DayContext) -> DailySnapshot {
    let active: Vec<&BacklogItem> = backlog.iter().filter(|i| !i.is_terminal()).collect();
    let total_items = active.len();

    let mut items_by_priority = BTreeMap::new();
    let mut items_by_age = BTreeMap::new();
    let mut total_effort = 0.0;
    let mut age_sum: u64 = 0;
    let mut oldest_age: u32 = 0;
    let mut items_deferred = 0;

    let mut breached = 0usize;
    let mut overdue_days_sum: i64 = 0;
    let mut at_risk = 0usize;
    let at_risk_horizon = ctx.date + Duration::days(1);

    for item in &active {
        *items_by_priority.entry(item.priority()).or_insert(0) += 1;
        *items_by_age
            .entry(AgeBucket::for_age(item.days_in_backlog()))
            .or_insert(0) += 1;
        total_effort += item.effort_hours();
        age_sum += u64::from(item.days_in_backlog());
        oldest_age = oldest_age.max(item.days_in_backlog());
        if item.status() == ItemStatus::Deferred {
            items_deferred += 1;
        }

        if item.sla_breached() {
            breached += 1;
            overdue_days_sum += (ctx.date - item.due_date()).num_days().max(0);
        } else if item.due_date() <= at_risk_horizon {
            at_risk += 1;
        }
    }

    let avg_age_days = if total_items == 0 {
        0.0
    } else {
        age_sum as f64 / total_items as f64
    };

    let sla_compliance_rate = if total_items == 0 {
        1.0
    } else {
        1.0 - breached as f64 / total_items as f64
    };

    let capacity_utilization = if ctx.effective_capacity_hours > 0.0 {
        MetricValue::Known(ctx.capacity_used_hours / ctx.effective_capacity_hours)
    } else {
        MetricValue::Indeterminate
    };

    let avg_overdue = if breached == 0 {
        0.0
    } else {
        overdue_days_sum as f64 / breached as f64
    };
    let customer_impact_score =
        breached as f64 * (1.0 + avg_overdue) + AT_RISK_IMPACT_WEIGHT * at_risk as f64;

    let estimated_recovery_days = estimate_recovery_days(total_items, ctx.prev_net_resolution);

    DailySnapshot {
        date: ctx.date,
        total_items,
        items_by_priority,
        items_by_age,
        total_estimated_effort_hours: total_effort,
        avg_age_days,
        oldest_item_age_days: oldest_age,
        sla_breached_count: breached,
        sla_at_risk_count: at_risk,
        sla_compliance_rate,
        capacity_utilization,
        capacity_used_hours: ctx.capacity_used_hours,
        items_resolved: ctx.items_resolved,
        items_decayed: ctx.items_decayed,
        new_items: ctx.new_items,
        items_aged_up: ctx.items_aged_up,
        items_abandoned: ctx.items_abandoned,
        items_deferred,
        overflow_count: ctx.overflow_count,
        financial_impact: ctx.cumulative_financial_impact,
        outsourcing_cost: ctx.cumulative_outsourcing_cost,
        customer_impact_score,
        estimated_recovery_days,
    }
}

/// Days to drain the backlog at yesterday's net resolution rate
/// (items resolved minus items newly added).
///
/// An empty backlog reports 0 regardless of history. Otherwise the estimate
/// needs yesterday's flow and a positive net rate; the first day and days
/// after a flat or losing day are indeterminate.
fn estimate_recovery_days(total_items: usize, prev_net_resolution: Option<i64>) -> MetricValue {
    if total_items == 0 {
        return MetricValue::Known(0.0);
    }
    match prev_net_resolution {
        Some(net) if net > 0 => MetricValue::Known(total_items as f64 / net as f64),
        _ => MetricValue::Indeterminate,
    }
}

/// Aggregate a finished run's snapshots into summary statistics.
pub fn summarize(
    snapshots: &[DailySnapshot],
    initial_backlog_size: usize,
    total_new_items: usize,
    total_sla_breaches: usize,
) -> SummaryStats {
    let final_backlog_size = snapshots
        .last()
        .map(|s| s.total_items)
        .unwrap_or(initial_backlog_size);

    let days = snapshots.len();

    let avg_daily_backlog = if days == 0 {
        0.0
    } else {
        snapshots.iter().map(|s| s.total_items).sum::<usize>() as f64 / days as f64
    };

    let peak_daily_backlog = snapshots.iter().map(|s| s.total_items).max().unwrap_or(0);

    let avg_sla_compliance_rate = if days == 0 {
        1.0
    } else {
        snapshots.iter().map(|s| s.sla_compliance_rate).sum::<f64>() / days as f64
    };

    let known_recoveries: Vec<f64> = snapshots
        .iter()
        .filter_map(|s| s.estimated_recovery_days.known())
        .collect();
    let avg_recovery_days = if known_recoveries.is_empty() {
        MetricValue::Indeterminate
    } else {
        MetricValue::Known(known_recoveries.iter().sum::<f64>() / known_recoveries.len() as f64)
    };

    let total_financial_impact = snapshots.last().map(|s| s.financial_impact).unwrap_or(0.0);

    // Everything that entered the system and is no longer in the backlog
    // left it through some terminal transition.
    let total_items_processed =
        initial_backlog_size + total_new_items - final_backlog_size;

    SummaryStats {
        total_items_processed,
        total_new_items,
        net_backlog_change: final_backlog_size as i64 - initial_backlog_size as i64,
        avg_daily_backlog,
        peak_daily_backlog,
        avg_sla_compliance_rate,
        total_sla_breaches,
        avg_recovery_days,
        total_financial_impact,
        final_backlog_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::item::{Complexity, Priority};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn ctx(on: NaiveDate) -> DayContext {
        DayContext {
            date: on,
            items_resolved: 0,
            items_decayed: 0,
            new_items: 0,
            items_aged_up: 0,
            items_abandoned: 0,
            overflow_count: 0,
            capacity_used_hours: 0.0,
            effective_capacity_hours: 0.0,
            cumulative_financial_impact: 0.0,
            cumulative_outsourcing_cost: 0.0,
            prev_net_resolution: None,
        }
    }

    fn item(id: &str, priority: Priority, created: NaiveDate, due: NaiveDate) -> BacklogItem {
        BacklogItem::new(id.to_string(), priority, Complexity::Moderate, created, due)
    }

    #[test]
    fn test_empty_backlog_snapshot() {
        let snapshot = build_snapshot(&[], &ctx(date(1)));
        assert_eq!(snapshot.total_items, 0);
        assert_eq!(snapshot.avg_age_days, 0.0);
        assert_eq!(snapshot.sla_compliance_rate, 1.0);
        assert_eq!(snapshot.customer_impact_score, 0.0);
        assert_eq!(snapshot.capacity_utilization, MetricValue::Indeterminate);
        assert_eq!(snapshot.estimated_recovery_days, MetricValue::Known(0.0));
    }

    #[test]
    fn test_terminal_items_excluded_from_stock() {
        let mut done = item("ITEM-000001", Priority::Low, date(1), date(2));
        done.complete(date(1)).unwrap();
        let backlog = vec![done, item("ITEM-000002", Priority::High, date(1), date(2))];

        let snapshot = build_snapshot(&backlog, &ctx(date(1)));
        assert_eq!(snapshot.total_items, 1);
        assert_eq!(snapshot.items_by_priority.get(&Priority::High), Some(&1));
        assert_eq!(snapshot.items_by_priority.get(&Priority::Low), None);
    }

    #[test]
    fn test_utilization_known_when_capacity_positive() {
        let mut context = ctx(date(1));
        context.effective_capacity_hours = 8.0;
        context.capacity_used_hours = 6.0;

        let snapshot = build_snapshot(&[], &context);
        assert_eq!(snapshot.capacity_utilization, MetricValue::Known(0.75));
    }

    #[test]
    fn test_impact_score_grows_with_breach_severity() {
        let mut breached = item("ITEM-000001", Priority::Low, date(1), date(2));
        breached.mark_sla_breached().unwrap();
        let backlog = vec![breached];

        // 1 day overdue: 1 * (1 + 1) = 2.0
        let early = build_snapshot(&backlog, &ctx(date(3)));
        // 3 days overdue: 1 * (1 + 3) = 4.0
        let late = build_snapshot(&backlog, &ctx(date(5)));

        assert_eq!(early.customer_impact_score, 2.0);
        assert_eq!(late.customer_impact_score, 4.0);
        assert!(late.customer_impact_score > early.customer_impact_score);
    }

    #[test]
    fn test_recovery_estimate_rules() {
        let backlog = vec![
            item("ITEM-000001", Priority::Low, date(1), date(9)),
            item("ITEM-000002", Priority::Low, date(1), date(9)),
        ];

        // First day: no yesterday to rate against.
        let snapshot = build_snapshot(&backlog, &ctx(date(1)));
        assert_eq!(snapshot.estimated_recovery_days, MetricValue::Indeterminate);

        // Yesterday netted +4 (resolved minus new): 2 / 4 = 0.5 days.
        let mut context = ctx(date(2));
        context.prev_net_resolution = Some(4);
        let snapshot = build_snapshot(&backlog, &context);
        assert_eq!(snapshot.estimated_recovery_days, MetricValue::Known(0.5));

        // Yesterday was flat or losing ground: indeterminate.
        for net in [0, -3] {
            let mut context = ctx(date(2));
            context.prev_net_resolution = Some(net);
            let snapshot = build_snapshot(&backlog, &context);
            assert_eq!(snapshot.estimated_recovery_days, MetricValue::Indeterminate);
        }
    }

    #[test]
    fn test_summary_conservation_arithmetic() {
        let backlog = vec![item("ITEM-000001", Priority::Low, date(1), date(2))];
        let mut context = ctx(date(1));
        context.new_items = 3;
        let snapshot = build_snapshot(&backlog, &context);

        // 2 initial + 3 new - 1 final = 4 processed.
        let summary = summarize(&[snapshot], 2, 3, 0);
        assert_eq!(summary.total_items_processed, 4);
        assert_eq!(summary.final_backlog_size, 1);
        assert_eq!(summary.net_backlog_change, -1);
        assert_eq!(summary.peak_daily_backlog, 1);
    }

    #[test]
    fn test_summary_recovery_indeterminate_when_never_known() {
        let backlog = vec![item("ITEM-000001", Priority::Low, date(1), date(9))];
        let s1 = build_snapshot(&backlog, &ctx(date(1)));
        let summary = summarize(&[s1], 1, 0, 0);
        assert_eq!(summary.avg_recovery_days, MetricValue::Indeterminate);
    }
}
