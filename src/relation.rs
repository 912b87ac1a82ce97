//! Issue relationship resolution.
//!
//! Classifies an issue as standalone, child, or parent from cross-references
//! in issue bodies. The collaborator supplies the raw material — this issue's
//! body plus the bodies of candidate issues from a text search — and
//! classification itself is pure.
//!
//! A child declares its parent in its own body (`Parent: #12`,
//! `Related to #12`, `Part of #12`); a parent is an issue that other issues
//! declare, including via tasklist items (`- [ ] #12`). A parent reference
//! wins over any child matches: the hierarchy is two levels deep, and an
//! issue is never both.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{IssueRef, IssueRelationship, RelationKind};

static PARENT_REF_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)parent:\s*#(\d+)").unwrap(),
        Regex::new(r"(?i)related\s+to:?\s*#(\d+)").unwrap(),
        Regex::new(r"(?i)part\s+of:?\s*#(\d+)").unwrap(),
    ]
});

/// Classify `issue` given its body and the candidate issues that mention it.
pub fn classify(issue: u64, body: &str, candidates: &[IssueRef]) -> IssueRelationship {
    if let Some(parent) = parent_reference(body, issue) {
        return IssueRelationship {
            kind: RelationKind::Child,
            parent: Some(parent),
            children: Vec::new(),
        };
    }

    let children = child_issues(issue, candidates);
    if children.is_empty() {
        IssueRelationship {
            kind: RelationKind::Standalone,
            parent: None,
            children,
        }
    } else {
        IssueRelationship {
            kind: RelationKind::Parent,
            parent: None,
            children,
        }
    }
}

/// The parent issue number declared in `body`, if any.
///
/// A self-reference doesn't count: an issue can't be its own parent.
pub fn parent_reference(body: &str, issue: u64) -> Option<u64> {
    for pattern in PARENT_REF_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(body)
            && let Ok(number) = captures[1].parse::<u64>()
            && number != issue
        {
            return Some(number);
        }
    }
    None
}

/// The candidates whose bodies declare `issue` as their parent, sorted.
fn child_issues(issue: u64, candidates: &[IssueRef]) -> Vec<u64> {
    // These depend on the issue number, so they can't be precompiled.
    let Ok(declares_parent) = Regex::new(&format!(
        r"(?i)(?:parent|related\s+to|part\s+of):?\s*#{issue}\b"
    )) else {
        return Vec::new();
    };
    let Ok(tasklist_item) = Regex::new(&format!(r"-\s*\[[ x]\]\s*#{issue}\b")) else {
        return Vec::new();
    };

    let mut children: Vec<u64> = candidates
        .iter()
        .filter(|c| c.number != issue)
        .filter(|c| declares_parent.is_match(&c.body) || tasklist_item.is_match(&c.body))
        .map(|c| c.number)
        .collect();
    children.sort_unstable();
    children.dedup();
    children
}
