//! Issue hierarchy types: how an issue relates to others, and its comments.

use jiff::Timestamp;

/// Where an issue sits in the two-level parent/child hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// No parent, no children.
    Standalone,

    /// References a parent issue; hours logged here roll up to the parent.
    Child,

    /// Referenced by child issues; its ledger task aggregates their hours.
    Parent,
}

/// The resolved relationship for one issue.
///
/// Invariants: `kind` is `Child` iff `parent` is set, and `Parent` iff
/// `children` is non-empty with no parent. A parent reference wins over any
/// child matches, so an issue is never both at once — deeper nesting than
/// two levels is unsupported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRelationship {
    pub kind: RelationKind,
    pub parent: Option<u64>,
    pub children: Vec<u64>,
}

/// A candidate issue from a body-text search, used to find children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRef {
    pub number: u64,
    pub body: String,
}

/// One issue comment, as supplied by the issue-tracking collaborator.
///
/// `created_at` is authoritative for "which log entry is latest" — the
/// aggregator compares timestamps rather than trusting fetch order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    pub body: String,
    pub created_at: Timestamp,
}
