//! Aging escalation and SLA tracking
//!
//! Aging raises item priority as items sit in the backlog; SLA tracking
//! marks breaches against due dates and accrues the daily penalty. Both
//! walk the backlog in place and report what they did so the driver can
//! record events and counters.

use crate::models::item::{BacklogItem, ItemError, Priority};
use crate::models::profile::PropagationProfile;
use chrono::{Duration, NaiveDate};

/// One priority escalation caused by aging.
#[derive(Debug, Clone, PartialEq)]
pub struct AgedItem {
    pub item_id: String,
    pub new_priority: Priority,
}

/// Escalate priorities of workable items whose backlog age crossed an
/// aging threshold multiple today. Items already at Critical are left
/// alone and not reported.
pub fn apply_aging(
    backlog: &mut [BacklogItem],
    profile: &PropagationProfile,
) -> Result<Vec<AgedItem>, ItemError> {
    if !profile.aging_enabled {
        return Ok(Vec::new());
    }
    let threshold = profile.aging_threshold_days;

    let mut aged = Vec::new();
    for item in backlog.iter_mut() {
        if !item.status().is_workable() {
            continue;
        }
        let days = item.days_in_backlog();
        if days == 0 || days % threshold != 0 {
            continue;
        }
        if item.priority() == Priority::Critical {
            continue;
        }
        item.escalate_priority()?;
        aged.push(AgedItem {
            item_id: item.id().to_string(),
            new_priority: item.priority(),
        });
    }
    Ok(aged)
}

/// A breach newly detected today.
#[derive(Debug, Clone, PartialEq)]
pub struct SlaBreach {
    pub item_id: String,
    pub days_overdue: i64,
}

/// The day's SLA picture.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SlaReport {
    /// Breaches first detected today
    pub new_breaches: Vec<SlaBreach>,

    /// All non-terminal breached items as of today
    pub breached_count: usize,

    /// Non-terminal, unbreached items due today or tomorrow
    pub at_risk_count: usize,

    /// Penalty accrued today: one `sla_penalty_per_day` per breached item
    pub penalty_accrued: f64,
}

/// Check every non-terminal item against its due date.
///
/// An item breaches when `date` is strictly past its due date. The breach
/// flag is sticky; the daily penalty applies to every breached item every
/// day it remains in the backlog.
pub fn check_sla(
    backlog: &mut [BacklogItem],
    profile: &PropagationProfile,
    date: NaiveDate,
) -> Result<SlaReport, ItemError> {
    let mut report = SlaReport::default();
    let at_risk_horizon = date + Duration::days(1);

    for item in backlog.iter_mut() {
        if item.is_terminal() {
            continue;
        }

        if date > item.due_date() {
            if !item.sla_breached() {
                item.mark_sla_breached()?;
                report.new_breaches.push(SlaBreach {
                    item_id: item.id().to_string(),
                    days_overdue: (date - item.due_date()).num_days(),
                });
            }
            report.breached_count += 1;
            report.penalty_accrued += profile.sla_penalty_per_day;
        } else if item.due_date() <= at_risk_horizon {
            report.at_risk_count += 1;
        }
    }

    Ok(report)
}
