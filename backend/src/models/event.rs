//! Event log - in-memory diagnostic record of a run
//!
//! Every state change the engine makes is recorded as an event. The log is
//! append-only and serializable, useful for debugging a run after the fact.

use crate::models::item::Priority;
use crate::overflow::OverflowStrategy;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single engine action during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Demand was synthesized into concrete items
    ItemsSynthesized { date: NaiveDate, count: usize },

    /// Items resolved via decay (no capacity consumed)
    ItemsDecayed { date: NaiveDate, count: usize },

    /// Items resolved via capacity allocation
    ItemsResolved {
        date: NaiveDate,
        count: usize,
        hours_used: f64,
    },

    /// An item's priority escalated from aging
    PriorityAged {
        date: NaiveDate,
        item_id: String,
        new_priority: Priority,
    },

    /// An item crossed its SLA due date
    SlaBreached {
        date: NaiveDate,
        item_id: String,
        days_overdue: i64,
    },

    /// The overflow dispatcher acted on excess items
    OverflowApplied {
        date: NaiveDate,
        strategy: OverflowStrategy,
        count: usize,
    },

    /// Items abandoned at the day boundary (propagation shortfall)
    ItemsAbandoned { date: NaiveDate, count: usize },

    /// A simulated day finished
    DayCompleted { date: NaiveDate, backlog_size: usize },
}

impl Event {
    /// The simulated date the event occurred on.
    pub fn date(&self) -> NaiveDate {
        match self {
            Event::ItemsSynthesized { date, .. }
            | Event::ItemsDecayed { date, .. }
            | Event::ItemsResolved { date, .. }
            | Event::PriorityAged { date, .. }
            | Event::SlaBreached { date, .. }
            | Event::OverflowApplied { date, .. }
            | Event::ItemsAbandoned { date, .. }
            | Event::DayCompleted { date, .. } => *date,
        }
    }
}

/// Append-only event log for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// All events recorded on the given simulated day.
    pub fn events_for_date(&self, date: NaiveDate) -> Vec<&Event> {
        self.events.iter().filter(|e| e.date() == date).collect()
    }
}
