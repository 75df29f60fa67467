//! Capacity allocator: selects which backlog items resolve each day
//!
//! The allocator is a pure planner: it never mutates items. It ranks the
//! workable backlog and greedily selects items that fit the day's effective
//! capacity; the driver applies the resulting plan.
//!
//! # Ordering
//!
//! Priority descending, then `days_in_backlog` descending (oldest first),
//! then id ascending. The whole ranking is deterministic; no RNG.
//!
//! # Selection
//!
//! Greedy full-fit walk: an item that does not fit the remaining hours is
//! skipped, and the walk continues looking for smaller items further down
//! the ranking. Partial resolution does not exist; an item either fits
//! whole or waits.

use crate::models::inputs::DailyCapacity;
use crate::models::item::{BacklogItem, Complexity};
use std::cmp::Reverse;

/// Tolerance for floating-point accumulation when comparing effort against
/// remaining hours.
const HOURS_EPSILON: f64 = 1e-9;

/// The allocator's decision for one day.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationPlan {
    /// Ids of items to resolve, in resolution order
    pub resolved_ids: Vec<String>,

    /// Hours the plan consumes
    pub capacity_used_hours: f64,

    /// Effective hours that were available (after modifiers)
    pub effective_capacity_hours: f64,
}

/// Effective backlog hours for the day: raw backlog hours scaled by the
/// productivity modifier and the recovery multiplier (1.0 outside recovery
/// mode). Clamped at zero.
pub fn effective_capacity_hours(capacity: &DailyCapacity, recovery_multiplier: f64) -> f64 {
    let hours =
        capacity.backlog_capacity_hours * capacity.productivity_modifier * recovery_multiplier;
    hours.max(0.0)
}

/// Plan one day's resolutions over the current backlog.
///
/// Only workable items (Pending, Deferred, Escalated) are considered. The
/// plan honors both the hour budget and the optional per-day item and
/// complex-item caps.
pub fn plan_allocation(
    items: &[BacklogItem],
    capacity: &DailyCapacity,
    recovery_multiplier: f64,
) -> AllocationPlan {
    let effective_hours = effective_capacity_hours(capacity, recovery_multiplier);

    let mut candidates: Vec<&BacklogItem> = items
        .iter()
        .filter(|item| item.status().is_workable())
        .collect();

    candidates.sort_by_key(|item| {
        (
            Reverse(item.priority()),
            Reverse(item.days_in_backlog()),
            item.id().to_string(),
        )
    });

    let mut resolved_ids = Vec::new();
    let mut remaining_hours = effective_hours;
    let mut used_hours = 0.0;
    let mut complex_resolved = 0usize;

    for item in candidates {
        if let Some(cap) = capacity.max_items_per_day {
            if resolved_ids.len() >= cap {
                break;
            }
        }

        if item.complexity() == Complexity::Complex {
            if let Some(cap) = capacity.max_complex_items_per_day {
                if complex_resolved >= cap {
                    continue;
                }
            }
        }

        if item.effort_hours() > remaining_hours + HOURS_EPSILON {
            continue; // does not fit; smaller items may still fit
        }

        remaining_hours -= item.effort_hours();
        used_hours += item.effort_hours();
        if item.complexity() == Complexity::Complex {
            complex_resolved += 1;
        }
        resolved_ids.push(item.id().to_string());
    }

    AllocationPlan {
        resolved_ids,
        capacity_used_hours: used_hours,
        effective_capacity_hours: effective_hours,
    }
}
