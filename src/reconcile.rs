//! Diff-based ledger synchronization.
//!
//! Given a freshly computed {date → hours} map and the ledger's current
//! entries, compute the minimal add/update/delete set that makes the ledger
//! converge exactly to the map's key set. Pure: no I/O here, ever — applying
//! the plan is the caller's job, which keeps this independently testable and
//! idempotent (reconciling after a full apply yields a no-op plan).

use std::collections::BTreeMap;

use jiff::civil::Date;

use crate::model::{LedgerEntry, LedgerUpdate, ReconciliationPlan};

/// Diff `target` against the ledger's `existing` entries.
///
/// Target dates missing remotely become adds; present with different hours,
/// updates; equal, unchanged. Existing entries for dates absent from
/// `target` become deletes. Hours compare by exact `f64` equality — the
/// values on both sides come from the same parser, so no epsilon is applied.
///
/// The ledger is assumed to hold at most one entry per date; on duplicates
/// the first one seen wins and the rest are left untouched.
#[allow(clippy::float_cmp)]
pub fn reconcile(target: &BTreeMap<Date, f64>, existing: &[LedgerEntry]) -> ReconciliationPlan {
    let mut by_date: BTreeMap<Date, &LedgerEntry> = BTreeMap::new();
    for entry in existing {
        by_date.entry(entry.date).or_insert(entry);
    }

    let mut plan = ReconciliationPlan::default();

    for (&date, &hours) in target {
        match by_date.get(&date) {
            None => plan.to_add.push((date, hours)),
            Some(entry) if entry.hours != hours => plan.to_update.push(LedgerUpdate {
                id: entry.id.clone(),
                old_hours: entry.hours,
                new_hours: hours,
            }),
            Some(_) => plan.unchanged.push(date),
        }
    }

    for (date, entry) in &by_date {
        if !target.contains_key(date) {
            plan.to_delete.push(entry.id.clone());
        }
    }

    plan
}
