use anyhow::ensure;

use crate::models::{EnrollmentRow, GraduationRequirements, GraduationSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseCategory {
    MajorRequired,
    MajorElective,
    General,
}

/// Marker substrings used to classify a course_type value into a
/// requirement bucket. Course types matching none of the lists are left out
/// of every bucket sum.
#[derive(Debug, Clone)]
pub struct CategoryMarkers {
    pub major_required: Vec<String>,
    pub major_elective: Vec<String>,
    pub general: Vec<String>,
}

impl Default for CategoryMarkers {
    fn default() -> Self {
        CategoryMarkers {
            major_required: vec!["required-major".to_string()],
            major_elective: vec!["elective-major".to_string()],
            general: vec!["general-education".to_string()],
        }
    }
}

impl CategoryMarkers {
    pub fn classify(&self, course_type: &str) -> Option<CourseCategory> {
        let course_type = course_type.trim();
        if matches_any(course_type, &self.major_required) {
            Some(CourseCategory::MajorRequired)
        } else if matches_any(course_type, &self.major_elective) {
            Some(CourseCategory::MajorElective)
        } else if matches_any(course_type, &self.general) {
            Some(CourseCategory::General)
        } else {
            None
        }
    }
}

fn matches_any(course_type: &str, markers: &[String]) -> bool {
    markers.iter().any(|marker| course_type.contains(marker.as_str()))
}

/// Sums per-class credit into requirement buckets and turns them into
/// progress percentages against the configured targets. Requirements must
/// all be positive; a zero target would make the percentage undefined.
pub fn compute_graduation_summary(
    class_entries: &[EnrollmentRow],
    markers: &CategoryMarkers,
    requirements: &GraduationRequirements,
) -> anyhow::Result<GraduationSummary> {
    ensure!(
        requirements.total.is_finite() && requirements.total > 0.0,
        "total credit requirement must be positive, got {}",
        requirements.total
    );
    ensure!(
        requirements.major.is_finite() && requirements.major > 0.0,
        "major credit requirement must be positive, got {}",
        requirements.major
    );
    ensure!(
        requirements.general.is_finite() && requirements.general > 0.0,
        "general credit requirement must be positive, got {}",
        requirements.general
    );

    let mut major_required_credit = 0.0;
    let mut major_elective_credit = 0.0;
    let mut general_credit = 0.0;

    for row in class_entries {
        match markers.classify(&row.course_type) {
            Some(CourseCategory::MajorRequired) => major_required_credit += row.credit,
            Some(CourseCategory::MajorElective) => major_elective_credit += row.credit,
            Some(CourseCategory::General) => general_credit += row.credit,
            None => {}
        }
    }

    let major_credit = major_required_credit + major_elective_credit;
    let total_credit = major_credit + general_credit;

    Ok(GraduationSummary {
        major_required_credit,
        major_elective_credit,
        general_credit,
        major_credit,
        total_credit,
        progress_major: round1(major_credit / requirements.major * 100.0),
        progress_general: round1(general_credit / requirements.general * 100.0),
        progress_total: round1(total_credit / requirements.total * 100.0),
    })
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Grade;
    use uuid::Uuid;

    fn class_entry(course_type: &str, credit: f64) -> EnrollmentRow {
        EnrollmentRow {
            student_id: "20230001".to_string(),
            class_id: Uuid::new_v4(),
            subject: "Subject".to_string(),
            professor: "Lee".to_string(),
            credit,
            grade: Grade::parse(Some("A")),
            course_type: course_type.to_string(),
            year: 2025,
            semester: 1,
        }
    }

    fn default_requirements() -> GraduationRequirements {
        GraduationRequirements {
            total: 110.0,
            major: 78.0,
            general: 12.0,
        }
    }

    #[test]
    fn progress_matches_worked_example() {
        let entries = vec![
            class_entry("required-major", 40.0),
            class_entry("elective-major", 20.0),
            class_entry("general-education", 6.0),
        ];

        let summary = compute_graduation_summary(
            &entries,
            &CategoryMarkers::default(),
            &default_requirements(),
        )
        .unwrap();

        assert!((summary.major_credit - 60.0).abs() < 0.01);
        assert!((summary.total_credit - 66.0).abs() < 0.01);
        assert!((summary.progress_major - 76.9).abs() < 0.01);
        assert!((summary.progress_general - 50.0).abs() < 0.01);
        assert!((summary.progress_total - 60.0).abs() < 0.01);
    }

    #[test]
    fn unmatched_course_types_are_left_out_of_every_bucket() {
        let entries = vec![
            class_entry("required-major", 3.0),
            class_entry("field-practice", 2.0),
            class_entry("", 1.0),
        ];

        let summary = compute_graduation_summary(
            &entries,
            &CategoryMarkers::default(),
            &default_requirements(),
        )
        .unwrap();

        assert!((summary.total_credit - 3.0).abs() < 0.01);
        assert_eq!(summary.major_elective_credit, 0.0);
        assert_eq!(summary.general_credit, 0.0);
    }

    #[test]
    fn zero_requirement_is_rejected() {
        let requirements = GraduationRequirements {
            total: 110.0,
            major: 0.0,
            general: 12.0,
        };

        let result = compute_graduation_summary(
            &[class_entry("required-major", 3.0)],
            &CategoryMarkers::default(),
            &requirements,
        );
        assert!(result.is_err());
    }

    #[test]
    fn empty_input_reports_zero_progress() {
        let summary = compute_graduation_summary(
            &[],
            &CategoryMarkers::default(),
            &default_requirements(),
        )
        .unwrap();

        assert_eq!(summary.total_credit, 0.0);
        assert_eq!(summary.progress_major, 0.0);
        assert_eq!(summary.progress_general, 0.0);
        assert_eq!(summary.progress_total, 0.0);
    }

    #[test]
    fn custom_markers_drive_classification() {
        let markers = CategoryMarkers {
            major_required: vec!["core".to_string()],
            major_elective: vec!["option".to_string()],
            general: vec!["liberal".to_string(), "breadth".to_string()],
        };

        let entries = vec![
            class_entry("core-track", 3.0),
            class_entry("option-track", 2.0),
            class_entry("breadth seminar", 2.0),
        ];

        let summary =
            compute_graduation_summary(&entries, &markers, &default_requirements()).unwrap();
        assert!((summary.major_required_credit - 3.0).abs() < 0.01);
        assert!((summary.major_elective_credit - 2.0).abs() < 0.01);
        assert!((summary.general_credit - 2.0).abs() < 0.01);
    }

    #[test]
    fn summary_is_deterministic_for_identical_input() {
        let entries = vec![
            class_entry("required-major", 12.5),
            class_entry("elective-major", 7.5),
            class_entry("general-education", 4.0),
        ];
        let markers = CategoryMarkers::default();
        let requirements = default_requirements();

        let first = compute_graduation_summary(&entries, &markers, &requirements).unwrap();
        let second = compute_graduation_summary(&entries, &markers, &requirements).unwrap();
        assert_eq!(first.progress_total, second.progress_total);
        assert_eq!(first.major_credit, second.major_credit);
    }
}
