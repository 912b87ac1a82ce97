//! Remote ledger types: persisted entries and the plan that converges them.

use jiff::civil::Date;

/// One persisted record in the remote ledger (a task's timelog).
///
/// Owned by the remote system; tally only reads these and proposes
/// mutations, never caches them across invocations.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    /// Opaque handle assigned by the remote system.
    pub id: String,
    pub date: Date,
    pub hours: f64,
    pub comment: String,
}

/// An update operation: change an existing entry's hours.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerUpdate {
    pub id: String,
    pub old_hours: f64,
    pub new_hours: f64,
}

/// The minimal set of operations that makes the ledger match a computed
/// {date → hours} map.
///
/// Purely a value object: computing it has no side effects, and applying it
/// is the caller's job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationPlan {
    pub to_add: Vec<(Date, f64)>,
    pub to_update: Vec<LedgerUpdate>,
    pub to_delete: Vec<String>,
    pub unchanged: Vec<Date>,
}

impl ReconciliationPlan {
    /// True when applying the plan would issue no remote calls.
    pub fn is_noop(&self) -> bool {
        self.to_add.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }
}
