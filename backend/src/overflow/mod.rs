//! Overflow handling: what happens when the backlog exceeds capacity
//!
//! After allocation, if the profile sets `max_backlog_capacity` and the
//! non-terminal backlog exceeds it, the dispatcher applies the configured
//! strategy to the excess. Strategies that keep items in the backlog
//! (Defer, Escalate) may leave it over the cap; that is expected.

use crate::models::item::{BacklogItem, ItemError};
use crate::models::profile::PropagationProfile;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// What to do with excess items when the backlog exceeds capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowStrategy {
    /// Discard excess items arriving today, newest first. Terminal.
    Reject,
    /// Push excess items' due dates out one day and mark them Deferred.
    Defer,
    /// Raise excess items one priority level and mark them Escalated.
    Escalate,
    /// Hand excess items to an external processor at a per-item cost. Terminal.
    Outsource,
}

/// What the dispatcher did on one day.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OverflowOutcome {
    /// Items acted on
    pub count: usize,

    /// Outsourcing cost incurred (zero for other strategies)
    pub outsourcing_cost: f64,
}

/// Apply the profile's overflow strategy to the backlog for one day.
///
/// No-op when the profile has no `max_backlog_capacity` or the non-terminal
/// backlog is within it.
pub fn apply_overflow(
    backlog: &mut [BacklogItem],
    profile: &PropagationProfile,
    date: NaiveDate,
) -> Result<OverflowOutcome, ItemError> {
    let cap = match profile.max_backlog_capacity {
        Some(cap) => cap,
        None => return Ok(OverflowOutcome::default()),
    };

    let active = backlog.iter().filter(|i| !i.is_terminal()).count();
    if active <= cap {
        return Ok(OverflowOutcome::default());
    }
    let excess = active - cap;

    match profile.overflow_strategy {
        OverflowStrategy::Reject => reject_todays_excess(backlog, excess, date),
        OverflowStrategy::Defer => {
            let ids = select_excess(backlog, excess);
            for id in &ids {
                let item = find_mut(backlog, id);
                let new_due = item.due_date() + Duration::days(1);
                item.defer_until(new_due)?;
            }
            Ok(OverflowOutcome {
                count: ids.len(),
                outsourcing_cost: 0.0,
            })
        }
        OverflowStrategy::Escalate => {
            let ids = select_excess(backlog, excess);
            for id in &ids {
                find_mut(backlog, id).escalate()?;
            }
            Ok(OverflowOutcome {
                count: ids.len(),
                outsourcing_cost: 0.0,
            })
        }
        OverflowStrategy::Outsource => {
            let ids = select_excess(backlog, excess);
            for id in &ids {
                find_mut(backlog, id).outsource(date)?;
            }
            Ok(OverflowOutcome {
                count: ids.len(),
                outsourcing_cost: ids.len() as f64 * profile.outsourcing_cost_per_item,
            })
        }
    }
}

/// Reject discards only items created today, newest first (descending id).
/// If today's batch is smaller than the excess, older items still stay.
fn reject_todays_excess(
    backlog: &mut [BacklogItem],
    excess: usize,
    date: NaiveDate,
) -> Result<OverflowOutcome, ItemError> {
    let mut todays: Vec<&str> = backlog
        .iter()
        .filter(|i| i.status().is_workable() && i.created_date() == date)
        .map(|i| i.id())
        .collect();
    todays.sort_unstable();
    todays.reverse();
    todays.truncate(excess);

    let ids: Vec<String> = todays.into_iter().map(String::from).collect();
    for id in &ids {
        find_mut(backlog, id).reject(date)?;
    }
    Ok(OverflowOutcome {
        count: ids.len(),
        outsourcing_cost: 0.0,
    })
}

/// Excess selection for Defer/Escalate/Outsource: least-urgent first —
/// priority ascending, then `days_in_backlog` ascending, then id ascending.
fn select_excess(backlog: &[BacklogItem], excess: usize) -> Vec<String> {
    let mut candidates: Vec<&BacklogItem> = backlog
        .iter()
        .filter(|i| i.status().is_workable())
        .collect();

    candidates.sort_by_key(|i| (i.priority(), i.days_in_backlog(), i.id().to_string()));
    candidates.truncate(excess);
    candidates.into_iter().map(|i| i.id().to_string()).collect()
}

fn find_mut<'a>(backlog: &'a mut [BacklogItem], id: &str) -> &'a mut BacklogItem {
    backlog
        .iter_mut()
        .find(|i| i.id() == id)
        .unwrap_or_else(|| panic!("selected id {} must exist in backlog", id))
}
