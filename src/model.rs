//! Core data model for tally.
//!
//! These types are the vocabulary of the reconciliation engine: commands
//! parsed from issue comments, the issue hierarchy they apply to, and the
//! remote ledger entries they are reconciled against.
//!
//! Everything here is a transient value constructed per invocation — no type
//! in this module holds state across runs.

mod command;
mod issue;
mod ledger;

pub use command::{Command, DeleteRequest, LogEntry};
pub use issue::{CommentRecord, IssueRef, IssueRelationship, RelationKind};
pub use ledger::{LedgerEntry, LedgerUpdate, ReconciliationPlan};
