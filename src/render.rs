//! Markdown rendering for user-facing bot comments.
//!
//! Pure string building: tables of logged hours, the per-date change
//! summary after a sync, and the help text posted alongside parse errors.

use std::collections::BTreeMap;

use jiff::civil::Date;

use crate::model::{LedgerEntry, ReconciliationPlan};
use crate::parse::ParseError;

/// The command grammar, shown whenever a command fails to parse.
pub const HELP: &str = "\
Commands:
- `@tally log today 3h` — log 3 hours today
- `@tally log today 3h \"code review\"` — with a description
- `@tally log last monday 4h, feb 15 2h30m` — multiple entries
- `@tally log yesterday 0h` — remove yesterday's hours
- `@tally delete monday` — delete Monday's ledger entry
- `@tally show` — show logged hours

Dates: `today`, `yesterday`, `monday`..`sunday`, `last monday`, `feb 15`,
`15`, `02-15`, `2024-02-15`. Durations: `3h`, `4.5h`, `30m`, `2h30m`.";

/// The comment posted when a command doesn't parse.
pub fn parse_failure(error: &ParseError) -> String {
    format!("## ⚠️ Could not run that command\n\n{error}\n\n{HELP}")
}

/// The comment posted when hours are logged directly on a parent issue.
pub fn parent_rejection(children: &[u64]) -> String {
    let list = children
        .iter()
        .map(|n| format!("#{n}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "## ⚠️ This is a parent issue\n\n\
         Hours for this work are tracked on its child issues ({list}); \
         log them there and they will roll up here automatically."
    )
}

/// A table of currently logged hours, for the show command.
pub fn hours_table(hours: &BTreeMap<Date, f64>) -> String {
    if hours.is_empty() {
        return "## Logged hours\n\n_No hours currently logged._".to_string();
    }

    let mut out = String::from("## Logged hours\n\n| Date | Hours |\n|------|-------|\n");
    let mut total = 0.0;
    for (date, h) in hours {
        total += h;
        out.push_str(&format!("| {date} | {h:.2}h |\n"));
    }
    out.push_str(&format!("\n**Total: {total:.2}h**"));
    out
}

/// The post-sync summary: the ledger's new state with a status per date,
/// plus a section for deleted entries.
pub fn change_summary(
    target: &BTreeMap<Date, f64>,
    existing: &[LedgerEntry],
    plan: &ReconciliationPlan,
) -> String {
    let mut out = String::from("## ✅ Hours synced to Wrike\n\n");

    if target.is_empty() && plan.to_delete.is_empty() {
        out.push_str("_No hours currently logged._");
        return out;
    }

    let mut status: BTreeMap<Date, String> = BTreeMap::new();
    for &(date, _) in &plan.to_add {
        status.insert(date, "Added".to_string());
    }
    for update in &plan.to_update {
        if let Some(entry) = existing.iter().find(|e| e.id == update.id) {
            status.insert(
                entry.date,
                format!("Updated ({:.2}h → {:.2}h)", update.old_hours, update.new_hours),
            );
        }
    }
    for &date in &plan.unchanged {
        status.insert(date, "Unchanged".to_string());
    }

    if !target.is_empty() {
        out.push_str("### Current state\n| Date | Hours | Status |\n|------|-------|--------|\n");
        let mut total = 0.0;
        for (date, hours) in target {
            total += hours;
            let note = status.get(date).map_or("✓", String::as_str);
            out.push_str(&format!("| {date} | {hours:.2}h | {note} |\n"));
        }
        out.push_str(&format!("\n**Total: {total:.2}h**\n"));
    }

    if !plan.to_delete.is_empty() {
        out.push_str("\n### Deleted entries\n");
        for id in &plan.to_delete {
            if let Some(entry) = existing.iter().find(|e| &e.id == id) {
                out.push_str(&format!(
                    "- {} (was {:.2}h)\n",
                    entry.date, entry.hours
                ));
            }
        }
    }

    out
}
