//! Full-scan aggregation: recompute ground truth from comment history.
//!
//! Instead of tracking deltas, the aggregator treats each child issue's
//! comment history as an append-only log and replays all of it. For a target
//! date, a child's contribution is its *latest* log entry for that date —
//! latest by comment creation timestamp, compared explicitly, so the result
//! is correct no matter what order comments were fetched in. Re-logging a
//! date is therefore an edit, not an addition.
//!
//! Comments that don't parse as log commands are noise to skip: one garbled
//! comment can never block aggregation, so this module has no error type.

use std::collections::{BTreeMap, BTreeSet};

use jiff::civil::Date;
use jiff::tz::TimeZone;

use crate::model::{CommentRecord, LogEntry};
use crate::parse::command;

/// Total hours per target date, summed over each child's latest entry.
///
/// A child with no entry for a date is excluded from that date's sum; a
/// child whose latest entry is `0h` contributes 0 but *is* a contribution.
/// Either way every target date gets a key in the output — deciding that a
/// zeroed date should disappear from the ledger is the caller's business,
/// not the scan's.
///
/// With no children at all the result is empty and the caller falls back to
/// the submitting issue's own history.
pub fn aggregate(
    child_comments: &BTreeMap<u64, Vec<CommentRecord>>,
    target_dates: &BTreeSet<Date>,
) -> BTreeMap<Date, f64> {
    if child_comments.is_empty() {
        return BTreeMap::new();
    }

    let mut totals = BTreeMap::new();
    for &date in target_dates {
        let total = child_comments
            .values()
            .filter_map(|comments| latest_hours_for(comments, date))
            .sum();
        totals.insert(date, total);
    }
    totals
}

/// Every date mentioned by any log command in the given histories.
///
/// This is how "show" and full resyncs discover which dates exist at all.
pub fn mentioned_dates(child_comments: &BTreeMap<u64, Vec<CommentRecord>>) -> BTreeSet<Date> {
    let mut dates = BTreeSet::new();
    for comments in child_comments.values() {
        for comment in comments {
            for entry in parsed_entries(comment).into_iter().flatten() {
                dates.insert(entry.date);
            }
        }
    }
    dates
}

/// A child's latest logged hours for one date, or `None` if it never
/// mentioned the date.
fn latest_hours_for(comments: &[CommentRecord], date: Date) -> Option<f64> {
    let mut latest: Option<(jiff::Timestamp, f64)> = None;

    for comment in comments {
        let Some(entries) = parsed_entries(comment) else {
            continue;
        };
        for entry in entries {
            if entry.date != date {
                continue;
            }
            // Strictly newer comments override; within one comment the
            // first entry for a date stands.
            if latest.is_none_or(|(seen, _)| comment.created_at > seen) {
                latest = Some((comment.created_at, entry.hours));
            }
        }
    }

    latest.map(|(_, hours)| hours)
}

/// Try-parse a comment as a log command.
///
/// Relative dates resolve against the comment's creation date: "yesterday"
/// in a comment posted last month means last month's yesterday.
fn parsed_entries(comment: &CommentRecord) -> Option<Vec<LogEntry>> {
    let posted_on = comment.created_at.to_zoned(TimeZone::UTC).date();
    command::try_log_entries(&comment.body, posted_on)
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;
    use jiff::civil::date;

    fn comment(body: &str, at: &str) -> CommentRecord {
        CommentRecord {
            body: body.to_string(),
            created_at: at.parse::<Timestamp>().unwrap(),
        }
    }

    fn one_child(comments: Vec<CommentRecord>) -> BTreeMap<u64, Vec<CommentRecord>> {
        BTreeMap::from([(101, comments)])
    }

    #[test]
    fn later_comment_overrides_earlier_for_same_date() {
        let comments = one_child(vec![
            comment("@tally log 2024-02-15 3h", "2024-02-15T10:00:00Z"),
            comment("@tally log 2024-02-15 5h", "2024-02-15T17:00:00Z"),
        ]);
        let totals = aggregate(&comments, &BTreeSet::from([date(2024, 2, 15)]));
        assert_eq!(totals[&date(2024, 2, 15)], 5.0);
    }

    #[test]
    fn override_follows_timestamps_not_list_order() {
        // Same history, fetched newest-first: the result must not change.
        let comments = one_child(vec![
            comment("@tally log 2024-02-15 5h", "2024-02-15T17:00:00Z"),
            comment("@tally log 2024-02-15 3h", "2024-02-15T10:00:00Z"),
        ]);
        let totals = aggregate(&comments, &BTreeSet::from([date(2024, 2, 15)]));
        assert_eq!(totals[&date(2024, 2, 15)], 5.0);
    }

    #[test]
    fn children_sum_per_date() {
        let comments = BTreeMap::from([
            (
                101,
                vec![comment("@tally log 2024-02-15 3h", "2024-02-15T09:00:00Z")],
            ),
            (
                102,
                vec![comment(
                    "@tally log 2024-02-15 2h, 2024-02-16 1h",
                    "2024-02-15T11:00:00Z",
                )],
            ),
        ]);
        let targets = BTreeSet::from([date(2024, 2, 15), date(2024, 2, 16)]);
        let totals = aggregate(&comments, &targets);
        assert_eq!(totals[&date(2024, 2, 15)], 5.0);
        assert_eq!(totals[&date(2024, 2, 16)], 1.0);
    }

    #[test]
    fn explicit_zeros_keep_the_date_key() {
        // Both children zero out the date: the sum is 0 and the key stays,
        // so the caller can see the date was explicitly addressed.
        let comments = BTreeMap::from([
            (
                101,
                vec![
                    comment("@tally log 2024-02-15 3h", "2024-02-14T09:00:00Z"),
                    comment("@tally log 2024-02-15 0h", "2024-02-16T09:00:00Z"),
                ],
            ),
            (
                102,
                vec![
                    comment("@tally log 2024-02-15 2h", "2024-02-14T10:00:00Z"),
                    comment("@tally log 2024-02-15 0h", "2024-02-16T10:00:00Z"),
                ],
            ),
        ]);
        let totals = aggregate(&comments, &BTreeSet::from([date(2024, 2, 15)]));
        assert_eq!(totals.get(&date(2024, 2, 15)), Some(&0.0));
    }

    #[test]
    fn unparseable_comments_are_skipped_silently() {
        let comments = one_child(vec![
            comment("looks good to me!", "2024-02-15T08:00:00Z"),
            comment("@tally log someday 3h", "2024-02-15T09:00:00Z"),
            comment("@tally log 2024-02-15 4h", "2024-02-15T10:00:00Z"),
            comment("@tally delete 2024-02-15", "2024-02-15T11:00:00Z"),
        ]);
        let totals = aggregate(&comments, &BTreeSet::from([date(2024, 2, 15)]));
        // Only the well-formed log command counts; the delete command is not
        // a log entry and does not disturb the scan.
        assert_eq!(totals[&date(2024, 2, 15)], 4.0);
    }

    #[test]
    fn relative_dates_resolve_against_comment_time() {
        // "yesterday" posted on Feb 16 means Feb 15, regardless of when the
        // scan itself runs.
        let comments = one_child(vec![comment(
            "@tally log yesterday 2h",
            "2024-02-16T09:00:00Z",
        )]);
        let totals = aggregate(&comments, &BTreeSet::from([date(2024, 2, 15)]));
        assert_eq!(totals[&date(2024, 2, 15)], 2.0);
    }

    #[test]
    fn no_children_yields_empty_map() {
        let totals = aggregate(&BTreeMap::new(), &BTreeSet::from([date(2024, 2, 15)]));
        assert!(totals.is_empty());
    }

    #[test]
    fn dates_without_entries_still_get_keys() {
        let comments = one_child(vec![comment(
            "@tally log 2024-02-15 3h",
            "2024-02-15T09:00:00Z",
        )]);
        let targets = BTreeSet::from([date(2024, 2, 15), date(2024, 2, 20)]);
        let totals = aggregate(&comments, &targets);
        assert_eq!(totals[&date(2024, 2, 20)], 0.0);
    }

    #[test]
    fn mentioned_dates_collects_across_children() {
        let comments = BTreeMap::from([
            (
                101,
                vec![comment(
                    "@tally log 2024-02-15 3h, 2024-02-16 1h",
                    "2024-02-15T09:00:00Z",
                )],
            ),
            (
                102,
                vec![comment("@tally log 2024-03-01 2h", "2024-03-01T09:00:00Z")],
            ),
        ]);
        let dates = mentioned_dates(&comments);
        assert_eq!(
            dates,
            BTreeSet::from([date(2024, 2, 15), date(2024, 2, 16), date(2024, 3, 1)])
        );
    }
}
