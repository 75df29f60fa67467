//! Backlog item model
//!
//! Represents a single unit of work moving through the backlog.
//! Each item has:
//! - A stable, sortable identifier
//! - Priority (Low..Critical) - escalation only ever moves it up
//! - Complexity (immutable) - drives estimated effort
//! - Status lifecycle (Pending, ..., Completed/Rejected/Outsourced terminal)
//! - SLA bookkeeping (due date, breach flag)
//! - Aging counters (days in backlog, propagation count)
//!
//! CRITICAL: items in a terminal status never mutate again. All transitions
//! go through the methods below, which reject mutation of terminal items.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Work item priority, ordered from least to most urgent.
///
/// The derived `Ord` is the escalation order: `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// All priorities in ascending order. Iteration over demand maps uses
    /// this fixed order so synthesis is independent of map internals.
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    /// The next priority level up. Saturates at `Critical`.
    pub fn escalated(self) -> Priority {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Critical,
            Priority::Critical => Priority::Critical,
        }
    }
}

/// Work item complexity. Immutable for the item's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    /// All complexities in ascending order (see `Priority::ALL`).
    pub const ALL: [Complexity; 3] = [
        Complexity::Simple,
        Complexity::Moderate,
        Complexity::Complex,
    ];

    /// Default estimated effort in hours when no explicit estimate is
    /// supplied: the upper bound of each complexity band.
    pub fn default_effort_hours(self) -> f64 {
        match self {
            Complexity::Simple => 0.5,
            Complexity::Moderate => 1.0,
            Complexity::Complex => 2.0,
        }
    }

    /// Effort sampling band in minutes, used by demand synthesis.
    pub fn effort_minutes_range(self) -> (u32, u32) {
        match self {
            Complexity::Simple => (15, 30),
            Complexity::Moderate => (30, 60),
            Complexity::Complex => (60, 120),
        }
    }
}

/// Item lifecycle status.
///
/// `Completed`, `Rejected`, and `Outsourced` are terminal: once entered,
/// the item never mutates again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    InProgress,
    Completed,
    Deferred,
    Escalated,
    Rejected,
    Outsourced,
}

impl ItemStatus {
    /// Terminal statuses never transition again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ItemStatus::Completed | ItemStatus::Rejected | ItemStatus::Outsourced
        )
    }

    /// Statuses eligible for capacity allocation, decay, and day-counter
    /// aging. `InProgress` is non-terminal but excluded: it can only arrive
    /// via the initial backlog and is owned by whoever started it.
    pub fn is_workable(self) -> bool {
        matches!(
            self,
            ItemStatus::Pending | ItemStatus::Deferred | ItemStatus::Escalated
        )
    }
}

/// Errors from illegal item lifecycle transitions
#[derive(Debug, Error, PartialEq)]
pub enum ItemError {
    #[error("item is in terminal status {0:?} and cannot mutate")]
    TerminalStatus(ItemStatus),
}

/// A single backlog work item.
///
/// # Invariants
///
/// - `due_date >= created_date`
/// - `priority >= original_priority` (escalation only moves up)
/// - terminal items never mutate
///
/// # Example
/// ```
/// use backlog_simulator_core_rs::{BacklogItem, Complexity, ItemStatus, Priority};
/// use chrono::NaiveDate;
///
/// let created = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let due = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
/// let item = BacklogItem::new(
///     "ITEM-000001".to_string(),
///     Priority::Medium,
///     Complexity::Moderate,
///     created,
///     due,
/// );
///
/// assert_eq!(item.status(), ItemStatus::Pending);
/// assert_eq!(item.effort_hours(), 1.0); // derived from complexity
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacklogItem {
    /// Stable identifier. Lexicographic order of ids is the deterministic
    /// tie-break everywhere (decay selection, allocation ordering).
    id: String,

    /// Current priority (mutable, escalation only)
    priority: Priority,

    /// Priority at creation, before any escalation
    original_priority: Priority,

    /// Complexity (immutable)
    complexity: Complexity,

    /// Estimated effort to resolve, in hours
    effort_hours: f64,

    /// Calendar date the item entered the system
    created_date: NaiveDate,

    /// SLA due date; may be pushed forward by DEFER
    due_date: NaiveDate,

    /// Date the item reached a terminal status, if it has
    completed_date: Option<NaiveDate>,

    /// Demand batch that produced this item (synthesis date), if synthesized
    source_batch: Option<String>,

    /// Current lifecycle status
    status: ItemStatus,

    /// Whether the item has breached its SLA (sticky once set)
    sla_breached: bool,

    /// Days spent in backlog while Pending/Deferred/Escalated
    days_in_backlog: u32,

    /// Number of day boundaries survived without resolving
    propagation_count: u32,
}

impl BacklogItem {
    /// Create a new pending item. Effort defaults from complexity; use
    /// [`BacklogItem::with_effort_hours`] to override.
    ///
    /// # Panics
    /// Panics if `due_date < created_date`.
    pub fn new(
        id: String,
        priority: Priority,
        complexity: Complexity,
        created_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        assert!(due_date >= created_date, "due date must not precede creation");

        Self {
            id,
            priority,
            original_priority: priority,
            complexity,
            effort_hours: complexity.default_effort_hours(),
            created_date,
            due_date,
            completed_date: None,
            source_batch: None,
            status: ItemStatus::Pending,
            sla_breached: false,
            days_in_backlog: 0,
            propagation_count: 0,
        }
    }

    /// Override the derived effort estimate.
    ///
    /// # Panics
    /// Panics if `effort_hours` is negative.
    pub fn with_effort_hours(mut self, effort_hours: f64) -> Self {
        assert!(effort_hours >= 0.0, "effort must be non-negative");
        self.effort_hours = effort_hours;
        self
    }

    /// Tag the item with the demand batch that produced it.
    pub fn with_source_batch(mut self, batch: String) -> Self {
        self.source_batch = Some(batch);
        self
    }

    /// Seed the aging counters for an item that predates the run. Sets both
    /// `days_in_backlog` and `propagation_count`.
    pub fn with_initial_age(mut self, days: u32) -> Self {
        self.days_in_backlog = days;
        self.propagation_count = days;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn original_priority(&self) -> Priority {
        self.original_priority
    }

    pub fn complexity(&self) -> Complexity {
        self.complexity
    }

    pub fn effort_hours(&self) -> f64 {
        self.effort_hours
    }

    pub fn created_date(&self) -> NaiveDate {
        self.created_date
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn completed_date(&self) -> Option<NaiveDate> {
        self.completed_date
    }

    pub fn source_batch(&self) -> Option<&str> {
        self.source_batch.as_deref()
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn sla_breached(&self) -> bool {
        self.sla_breached
    }

    pub fn days_in_backlog(&self) -> u32 {
        self.days_in_backlog
    }

    pub fn propagation_count(&self) -> u32 {
        self.propagation_count
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    // ========================================================================
    // Lifecycle transitions
    // ========================================================================

    fn guard_non_terminal(&self) -> Result<(), ItemError> {
        if self.status.is_terminal() {
            Err(ItemError::TerminalStatus(self.status))
        } else {
            Ok(())
        }
    }

    /// Resolve the item (capacity allocation or decay).
    pub fn complete(&mut self, date: NaiveDate) -> Result<(), ItemError> {
        self.guard_non_terminal()?;
        self.status = ItemStatus::Completed;
        self.completed_date = Some(date);
        Ok(())
    }

    /// Push the due date forward and mark the item Deferred (DEFER overflow).
    pub fn defer_until(&mut self, new_due: NaiveDate) -> Result<(), ItemError> {
        self.guard_non_terminal()?;
        // Deferral only ever extends the window.
        if new_due > self.due_date {
            self.due_date = new_due;
        }
        self.status = ItemStatus::Deferred;
        Ok(())
    }

    /// Raise priority one level and mark the item Escalated (ESCALATE overflow).
    pub fn escalate(&mut self) -> Result<(), ItemError> {
        self.guard_non_terminal()?;
        self.priority = self.priority.escalated();
        self.status = ItemStatus::Escalated;
        Ok(())
    }

    /// Remove the item to an external processor (OUTSOURCE overflow). Terminal.
    pub fn outsource(&mut self, date: NaiveDate) -> Result<(), ItemError> {
        self.guard_non_terminal()?;
        self.status = ItemStatus::Outsourced;
        self.completed_date = Some(date);
        Ok(())
    }

    /// Discard the item unprocessed. Terminal.
    pub fn reject(&mut self, date: NaiveDate) -> Result<(), ItemError> {
        self.guard_non_terminal()?;
        self.status = ItemStatus::Rejected;
        self.completed_date = Some(date);
        Ok(())
    }

    /// Raise priority one level without touching status (aging escalation).
    /// No-op at Critical.
    pub fn escalate_priority(&mut self) -> Result<(), ItemError> {
        self.guard_non_terminal()?;
        self.priority = self.priority.escalated();
        Ok(())
    }

    /// Record an SLA breach. Sticky: never cleared once set.
    pub fn mark_sla_breached(&mut self) -> Result<(), ItemError> {
        self.guard_non_terminal()?;
        self.sla_breached = true;
        Ok(())
    }

    /// Advance the item across a day boundary: every non-terminal survivor
    /// propagates; only workable items accrue backlog age.
    pub fn advance_day(&mut self) -> Result<(), ItemError> {
        self.guard_non_terminal()?;
        self.propagation_count += 1;
        if self.status.is_workable() {
            self.days_in_backlog += 1;
        }
        Ok(())
    }
}
