use std::collections::HashSet;

use uuid::Uuid;

use crate::models::{EnrollmentRow, NormalizedEnrollments};

/// Configured set of subject markers to drop before any aggregation,
/// e.g. the career-guidance category.
#[derive(Debug, Clone, Default)]
pub struct SubjectFilter {
    markers: Vec<String>,
}

impl SubjectFilter {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SubjectFilter {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn excludes(&self, subject: &str) -> bool {
        self.markers.iter().any(|marker| subject.contains(marker.as_str()))
    }
}

/// Collapses raw join rows into one logical entry per (class_id, year,
/// semester) and, independently, one entry per class_id. The first row seen
/// for a key wins; later duplicates from upstream join fan-out are dropped.
pub fn normalize_enrollments(
    rows: &[EnrollmentRow],
    filter: &SubjectFilter,
) -> NormalizedEnrollments {
    let mut seen_terms: HashSet<(Uuid, i32, i32)> = HashSet::new();
    let mut seen_classes: HashSet<Uuid> = HashSet::new();
    let mut term_entries = Vec::new();
    let mut class_entries = Vec::new();

    for row in rows {
        if filter.excludes(&row.subject) {
            continue;
        }
        if seen_terms.insert((row.class_id, row.year, row.semester)) {
            term_entries.push(row.clone());
        }
        if seen_classes.insert(row.class_id) {
            class_entries.push(row.clone());
        }
    }

    // Listing order: newest term first, then subject.
    term_entries.sort_by(|a, b| {
        b.year
            .cmp(&a.year)
            .then(b.semester.cmp(&a.semester))
            .then_with(|| a.subject.cmp(&b.subject))
    });

    NormalizedEnrollments {
        term_entries,
        class_entries,
    }
}
