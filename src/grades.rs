use crate::models::{GradeLine, GradeReport, NormalizedEnrollments};

/// Builds the per-term grade listing and the credit-weighted average.
///
/// Only rows with a resolvable grade point enter the average; unresolved
/// grades stay in the listing with no point. Total credit is summed over the
/// per-class view so a retaken class counts its credit once.
pub fn compute_grade_report(enrollments: &NormalizedEnrollments) -> GradeReport {
    let lines: Vec<GradeLine> = enrollments
        .term_entries
        .iter()
        .map(|row| GradeLine {
            subject: row.subject.clone(),
            professor: row.professor.clone(),
            credit: row.credit,
            grade: row.grade,
            grade_point: row.grade.point(),
            year: row.year,
            semester: row.semester,
        })
        .collect();

    let mut weighted_points = 0.0;
    let mut counted_credit = 0.0;
    let mut graded_subjects = 0usize;

    for line in &lines {
        if let Some(point) = line.grade_point {
            weighted_points += point * line.credit;
            counted_credit += line.credit;
            graded_subjects += 1;
        }
    }

    let average = if counted_credit > 0.0 {
        round2(weighted_points / counted_credit)
    } else {
        0.0
    };

    let total_credit: f64 = enrollments
        .class_entries
        .iter()
        .map(|row| row.credit)
        .sum();

    GradeReport {
        lines,
        total_credit,
        average,
        graded_subjects,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrollment::{normalize_enrollments, SubjectFilter};
    use crate::models::{EnrollmentRow, Grade};
    use uuid::Uuid;

    fn graded_row(subject: &str, credit: f64, grade: Option<&str>) -> EnrollmentRow {
        EnrollmentRow {
            student_id: "20230001".to_string(),
            class_id: Uuid::new_v4(),
            subject: subject.to_string(),
            professor: "Park".to_string(),
            credit,
            grade: Grade::parse(grade),
            course_type: "required-major".to_string(),
            year: 2025,
            semester: 1,
        }
    }

    fn report_for(rows: Vec<EnrollmentRow>) -> GradeReport {
        compute_grade_report(&normalize_enrollments(&rows, &SubjectFilter::default()))
    }

    #[test]
    fn average_is_credit_weighted_and_rounded() {
        let report = report_for(vec![
            graded_row("Databases", 3.0, Some("A+")),
            graded_row("Networks", 2.0, Some("B")),
        ]);

        // (4.5 * 3 + 3.0 * 2) / 5 = 3.9
        assert!((report.average - 3.9).abs() < 0.001);
        assert_eq!(report.graded_subjects, 2);
        assert!((report.total_credit - 5.0).abs() < 0.001);
    }

    #[test]
    fn unresolved_grades_stay_in_listing_but_not_in_average() {
        let report = report_for(vec![
            graded_row("Databases", 3.0, Some("A")),
            graded_row("Seminar", 1.0, None),
            graded_row("Colloquium", 1.0, Some("pass")),
        ]);

        assert_eq!(report.lines.len(), 3);
        assert_eq!(report.graded_subjects, 1);
        assert!((report.average - 4.0).abs() < 0.001);
        // Ungraded classes still carry credit in the per-class total.
        assert!((report.total_credit - 5.0).abs() < 0.001);
    }

    #[test]
    fn numeric_grades_contribute_their_raw_value() {
        let report = report_for(vec![
            graded_row("Databases", 3.0, Some("4.5")),
            graded_row("Networks", 3.0, Some("3.5")),
        ]);

        assert!((report.average - 4.0).abs() < 0.001);
    }

    #[test]
    fn zero_countable_credit_reports_zero_average() {
        let report = report_for(vec![
            graded_row("Seminar", 1.0, None),
            graded_row("Colloquium", 0.0, Some("A")),
        ]);

        assert_eq!(report.average, 0.0);
        assert_eq!(report.graded_subjects, 1);
    }

    #[test]
    fn empty_input_yields_zeroed_report() {
        let report = report_for(Vec::new());
        assert!(report.lines.is_empty());
        assert_eq!(report.average, 0.0);
        assert_eq!(report.total_credit, 0.0);
        assert_eq!(report.graded_subjects, 0);
    }

    #[test]
    fn letter_scale_average_stays_within_bounds() {
        let report = report_for(vec![
            graded_row("Databases", 3.0, Some("A+")),
            graded_row("Networks", 3.0, Some("F")),
            graded_row("Compilers", 2.0, Some("C+")),
        ]);

        assert!(report.average >= 0.0);
        assert!(report.average <= 4.5);
    }

    #[test]
    fn duplicate_term_rows_count_credit_once() {
        let class_id = Uuid::new_v4();
        let mut first = graded_row("Databases", 3.0, Some("A"));
        first.class_id = class_id;
        let mut second = graded_row("Databases", 3.0, Some("A"));
        second.class_id = class_id;

        let report = report_for(vec![first, second]);
        assert_eq!(report.lines.len(), 1);
        assert!((report.total_credit - 3.0).abs() < 0.001);
        assert!((report.average - 4.0).abs() < 0.001);
    }
}
