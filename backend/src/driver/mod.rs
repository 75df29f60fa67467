//! Simulation driver - the day loop
//!
//! Owns the backlog and walks it through the configured date range, one
//! calendar day at a time:
//!
//! ```text
//! For each day d:
//! 1. Validate the day's capacity entry
//! 2. Synthesize new items from the day's demand
//! 3. Apply decay to the carried backlog, then admit the new items
//! 4. Allocate capacity and resolve items
//! 5. Apply aging escalation
//! 6. Check SLA breaches and accrue penalties
//! 7. Dispatch overflow handling
//! 8. Apply propagation survival (abandon the shortfall)
//! 9. Snapshot end-of-day state, then advance surviving items
//! ```
//!
//! Everything except demand synthesis is deterministic; synthesis draws
//! from the seeded RNG only. Same config + same inputs → identical result,
//! verifiable via `SimulationResult::digest`.

use crate::allocator::{self, AllocationPlan};
use crate::demand::DemandSynthesizer;
use crate::metrics::{self, DayContext};
use crate::models::event::{Event, EventLog};
use crate::models::inputs::{DailyCapacity, DailyDemand};
use crate::models::item::{BacklogItem, ItemError};
use crate::models::profile::PropagationProfile;
use crate::models::snapshot::{DailySnapshot, SimulationResult};
use crate::overflow;
use crate::rng::DeterministicRng;
use crate::sla;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// ============================================================================
// Configuration
// ============================================================================

/// Per-run configuration: which profile, over which dates, with which seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Behavioral parameters (rates, thresholds, strategy, costs)
    pub profile: PropagationProfile,

    /// First simulated day (inclusive)
    pub start_date: NaiveDate,

    /// Last simulated day (inclusive)
    pub end_date: NaiveDate,

    /// RNG seed for demand synthesis
    pub seed: u64,

    /// When set, the profile's recovery multiplier scales daily capacity
    pub recovery_mode: bool,
}

// ============================================================================
// Errors
// ============================================================================

/// Errors from configuration validation or an illegal run.
#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("{field} must be within [0.0, 1.0], got {value}")]
    RateOutOfRange { field: &'static str, value: f64 },

    #[error("{field} must be non-negative, got {value}")]
    NegativeValue { field: &'static str, value: f64 },

    #[error("aging_threshold_days must be positive when aging is enabled")]
    InvalidAgingThreshold,

    #[error("missing capacity entry for {0}")]
    MissingCapacity(NaiveDate),

    #[error("duplicate capacity entry for {0}")]
    DuplicateCapacity(NaiveDate),

    #[error("missing demand entry for {0}")]
    MissingDemand(NaiveDate),

    #[error("duplicate demand entry for {0}")]
    DuplicateDemand(NaiveDate),

    #[error("capacity entry for {date} has negative hours or modifier")]
    NegativeCapacityHours { date: NaiveDate },

    #[error("duplicate item id in initial backlog: {0}")]
    DuplicateItemId(String),

    #[error(transparent)]
    Item(#[from] ItemError),
}

// ============================================================================
// Driver
// ============================================================================

/// Drives one simulation run over the configured date range.
pub struct SimulationDriver {
    config: SimulationConfig,
    backlog: Vec<BacklogItem>,
    event_log: EventLog,
}

impl SimulationDriver {
    /// Create a driver for one run. Validates the config and the initial
    /// backlog before anything executes.
    pub fn new(
        config: SimulationConfig,
        initial_backlog: Vec<BacklogItem>,
    ) -> Result<Self, SimulationError> {
        Self::validate_config(&config)?;
        Self::validate_initial_backlog(&initial_backlog)?;

        Ok(Self {
            config,
            backlog: initial_backlog,
            event_log: EventLog::new(),
        })
    }

    fn validate_config(config: &SimulationConfig) -> Result<(), SimulationError> {
        if config.start_date > config.end_date {
            return Err(SimulationError::InvalidDateRange {
                start: config.start_date,
                end: config.end_date,
            });
        }

        let profile = &config.profile;
        for (field, value) in [
            ("propagation_rate", profile.propagation_rate),
            ("decay_rate", profile.decay_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimulationError::RateOutOfRange { field, value });
            }
        }

        for (field, value) in [
            ("sla_penalty_per_day", profile.sla_penalty_per_day),
            ("outsourcing_cost_per_item", profile.outsourcing_cost_per_item),
            ("recovery_rate_multiplier", profile.recovery_rate_multiplier),
        ] {
            if value < 0.0 {
                return Err(SimulationError::NegativeValue { field, value });
            }
        }

        if profile.aging_enabled && profile.aging_threshold_days == 0 {
            return Err(SimulationError::InvalidAgingThreshold);
        }

        Ok(())
    }

    fn validate_initial_backlog(items: &[BacklogItem]) -> Result<(), SimulationError> {
        let mut seen = std::collections::BTreeSet::new();
        for item in items {
            if !seen.insert(item.id()) {
                return Err(SimulationError::DuplicateItemId(item.id().to_string()));
            }
        }
        Ok(())
    }

    /// Index daily feeds by date, requiring exactly one entry per simulated
    /// day. Entries outside the date range are ignored.
    fn index_days<'a, T>(
        &self,
        entries: &'a [T],
        date_of: impl Fn(&T) -> NaiveDate,
        duplicate: impl Fn(NaiveDate) -> SimulationError,
        missing: impl Fn(NaiveDate) -> SimulationError,
    ) -> Result<BTreeMap<NaiveDate, &'a T>, SimulationError> {
        let mut by_date = BTreeMap::new();
        for entry in entries {
            let date = date_of(entry);
            if date < self.config.start_date || date > self.config.end_date {
                continue;
            }
            if by_date.insert(date, entry).is_some() {
                return Err(duplicate(date));
            }
        }
        for date in self
            .config
            .start_date
            .iter_days()
            .take_while(|d| *d <= self.config.end_date)
        {
            if !by_date.contains_key(&date) {
                return Err(missing(date));
            }
        }
        Ok(by_date)
    }

    /// Run the simulation to completion.
    pub fn run(
        &mut self,
        capacities: &[DailyCapacity],
        demands: &[DailyDemand],
    ) -> Result<SimulationResult, SimulationError> {
        let capacity_by_date = self.index_days(
            capacities,
            |c| c.date,
            SimulationError::DuplicateCapacity,
            SimulationError::MissingCapacity,
        )?;
        let demand_by_date = self.index_days(
            demands,
            |d| d.date,
            SimulationError::DuplicateDemand,
            SimulationError::MissingDemand,
        )?;

        let initial_backlog_size = self.backlog.len();
        let mut rng = DeterministicRng::new(self.config.seed);
        let mut synthesizer = DemandSynthesizer::new(&self.backlog);

        let recovery_multiplier = if self.config.recovery_mode {
            self.config.profile.recovery_rate_multiplier
        } else {
            1.0
        };

        let mut snapshots: Vec<DailySnapshot> = Vec::new();
        let mut total_new_items = 0usize;
        let mut total_sla_breaches = 0usize;
        let mut cumulative_financial = 0.0;
        let mut cumulative_outsourcing = 0.0;
        let mut prev_net_resolution: Option<i64> = None;

        // Local copy: the loop body takes `&mut self`, so the bound must not
        // keep borrowing the config.
        let end_date = self.config.end_date;
        for date in self
            .config
            .start_date
            .iter_days()
            .take_while(|d| *d <= end_date)
        {
            // 1. Validate the day's capacity entry
            let capacity = capacity_by_date[&date];
            if capacity.total_capacity_hours < 0.0
                || capacity.backlog_capacity_hours < 0.0
                || capacity.new_work_capacity_hours < 0.0
                || capacity.productivity_modifier < 0.0
            {
                return Err(SimulationError::NegativeCapacityHours { date });
            }

            // 2. Synthesize new items from the day's demand
            let demand = demand_by_date[&date];
            let new_items = synthesizer.synthesize(
                demand,
                self.config.profile.sla_breach_threshold_days,
                &mut rng,
            );
            let new_count = new_items.len();
            total_new_items += new_count;
            if new_count > 0 {
                self.event_log.log(Event::ItemsSynthesized {
                    date,
                    count: new_count,
                });
            }
            // 3. Apply decay (costless resolution); today's arrivals join
            // afterwards, so decay only touches the carried backlog
            let decayed = self.apply_decay(date)?;
            if decayed > 0 {
                self.event_log.log(Event::ItemsDecayed {
                    date,
                    count: decayed,
                });
            }
            self.backlog.extend(new_items);

            // 4. Allocate capacity and resolve items
            let plan = allocator::plan_allocation(&self.backlog, capacity, recovery_multiplier);
            self.apply_plan(&plan, date)?;
            if !plan.resolved_ids.is_empty() {
                self.event_log.log(Event::ItemsResolved {
                    date,
                    count: plan.resolved_ids.len(),
                    hours_used: plan.capacity_used_hours,
                });
            }

            // 5. Apply aging escalation
            let aged = sla::apply_aging(&mut self.backlog, &self.config.profile)?;
            for a in &aged {
                self.event_log.log(Event::PriorityAged {
                    date,
                    item_id: a.item_id.clone(),
                    new_priority: a.new_priority,
                });
            }

            // 6. Check SLA breaches and accrue penalties
            let sla_report = sla::check_sla(&mut self.backlog, &self.config.profile, date)?;
            for breach in &sla_report.new_breaches {
                self.event_log.log(Event::SlaBreached {
                    date,
                    item_id: breach.item_id.clone(),
                    days_overdue: breach.days_overdue,
                });
            }
            total_sla_breaches += sla_report.new_breaches.len();
            cumulative_financial += sla_report.penalty_accrued;

            // 7. Dispatch overflow handling
            let overflow_outcome =
                overflow::apply_overflow(&mut self.backlog, &self.config.profile, date)?;
            if overflow_outcome.count > 0 {
                self.event_log.log(Event::OverflowApplied {
                    date,
                    strategy: self.config.profile.overflow_strategy,
                    count: overflow_outcome.count,
                });
            }
            cumulative_outsourcing += overflow_outcome.outsourcing_cost;
            cumulative_financial += overflow_outcome.outsourcing_cost;

            // 8. Apply propagation survival (abandon the shortfall)
            let abandoned = self.apply_propagation(date)?;
            if abandoned > 0 {
                self.event_log
                    .log(Event::ItemsAbandoned { date, count: abandoned });
            }

            // 9. Snapshot end-of-day state, then advance surviving items
            let snapshot = metrics::build_snapshot(
                &self.backlog,
                &DayContext {
                    date,
                    items_resolved: plan.resolved_ids.len(),
                    items_decayed: decayed,
                    new_items: new_count,
                    items_aged_up: aged.len(),
                    items_abandoned: abandoned,
                    overflow_count: overflow_outcome.count,
                    capacity_used_hours: plan.capacity_used_hours,
                    effective_capacity_hours: plan.effective_capacity_hours,
                    cumulative_financial_impact: cumulative_financial,
                    cumulative_outsourcing_cost: cumulative_outsourcing,
                    prev_net_resolution,
                },
            );

            log::debug!(
                "day {} complete: backlog={} new={} resolved={} decayed={} breached={} overflow={}",
                date,
                snapshot.total_items,
                new_count,
                snapshot.items_resolved,
                decayed,
                snapshot.sla_breached_count,
                overflow_outcome.count,
            );

            self.event_log.log(Event::DayCompleted {
                date,
                backlog_size: snapshot.total_items,
            });

            prev_net_resolution = Some(plan.resolved_ids.len() as i64 - new_count as i64);
            snapshots.push(snapshot);

            for item in self.backlog.iter_mut().filter(|i| !i.is_terminal()) {
                item.advance_day()?;
            }
        }

        let summary = metrics::summarize(
            &snapshots,
            initial_backlog_size,
            total_new_items,
            total_sla_breaches,
        );

        let total_days = (self.config.end_date - self.config.start_date).num_days() as u32 + 1;

        let final_backlog_items: Vec<BacklogItem> = self
            .backlog
            .iter()
            .filter(|i| !i.is_terminal())
            .cloned()
            .collect();

        Ok(SimulationResult {
            start_date: self.config.start_date,
            end_date: self.config.end_date,
            total_days,
            daily_snapshots: snapshots,
            final_backlog_items,
            summary,
            seed_used: self.config.seed,
        })
    }

    /// Resolve `floor(decay_rate * workable)` items without consuming
    /// capacity, in ascending id order.
    fn apply_decay(&mut self, date: NaiveDate) -> Result<usize, SimulationError> {
        let rate = self.config.profile.decay_rate;
        if rate <= 0.0 {
            return Ok(0);
        }

        let ids = self.workable_ids_ascending();
        let count = (rate * ids.len() as f64).floor() as usize;

        for id in ids.iter().take(count) {
            self.find_item_mut(id).complete(date)?;
        }
        Ok(count)
    }

    /// Keep `floor(propagation_rate * workable)` survivors in ascending id
    /// order; the remainder is abandoned (terminal, reported separately).
    fn apply_propagation(&mut self, date: NaiveDate) -> Result<usize, SimulationError> {
        let rate = self.config.profile.propagation_rate;
        if rate >= 1.0 {
            return Ok(0);
        }

        let ids = self.workable_ids_ascending();
        let survivors = (rate * ids.len() as f64).floor() as usize;
        let abandoned = ids.len() - survivors;

        for id in ids.iter().skip(survivors) {
            self.find_item_mut(id).reject(date)?;
        }
        Ok(abandoned)
    }

    fn workable_ids_ascending(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .backlog
            .iter()
            .filter(|i| i.status().is_workable())
            .map(|i| i.id().to_string())
            .collect();
        ids.sort_unstable();
        ids
    }

    fn apply_plan(&mut self, plan: &AllocationPlan, date: NaiveDate) -> Result<(), SimulationError> {
        for id in &plan.resolved_ids {
            self.find_item_mut(id).complete(date)?;
        }
        Ok(())
    }

    fn find_item_mut(&mut self, id: &str) -> &mut BacklogItem {
        self.backlog
            .iter_mut()
            .find(|i| i.id() == id)
            .unwrap_or_else(|| panic!("selected id {} must exist in backlog", id))
    }

    /// Diagnostic event log for the run so far.
    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Current backlog (all items, terminal included).
    pub fn backlog(&self) -> &[BacklogItem] {
        &self.backlog
    }
}
