use chrono::NaiveDateTime;

use crate::models::Assignment;

/// Returns assignments whose due date lies inside the inclusive
/// [start, end] window, ascending by due date. Assignments without a due
/// date never appear here.
pub fn filter_due_within(
    assignments: &[Assignment],
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Vec<Assignment> {
    let mut due: Vec<Assignment> = assignments
        .iter()
        .filter(|assignment| {
            assignment
                .due_date
                .map(|date| date >= start && date <= end)
                .unwrap_or(false)
        })
        .cloned()
        .collect();

    due.sort_by_key(|assignment| assignment.due_date);
    due
}

/// Full listing sorted ascending by due date. Assignments without a due
/// date sort after every dated one, keeping their relative input order.
pub fn sort_by_due(assignments: &[Assignment]) -> Vec<Assignment> {
    let mut all = assignments.to_vec();
    all.sort_by(|a, b| match (a.due_date, b.due_date) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    all
}
