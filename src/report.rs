use std::fmt::Write;

use crate::models::{GradeReport, GraduationSummary};

pub fn build_report(
    student_id: &str,
    grades: &GradeReport,
    graduation: &GraduationSummary,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Academic Standing Report");
    let _ = writeln!(output, "Generated for student {student_id}");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Grade Summary");

    if grades.lines.is_empty() {
        let _ = writeln!(output, "No enrollments on record.");
    } else {
        for line in grades.lines.iter() {
            let point = line
                .grade_point
                .map(|p| format!("{p:.1}"))
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                output,
                "- {} ({}, {}-{}) {} credits, grade {} (point {})",
                line.subject,
                line.professor,
                line.year,
                line.semester,
                line.credit,
                line.grade,
                point
            );
        }
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "Average {:.2} over {} graded subjects, {} credits earned.",
            grades.average, grades.graded_subjects, grades.total_credit
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Graduation Progress");
    let _ = writeln!(
        output,
        "- Major: {} credits ({} required + {} elective), {:.1}% of requirement",
        graduation.major_credit,
        graduation.major_required_credit,
        graduation.major_elective_credit,
        graduation.progress_major
    );
    let _ = writeln!(
        output,
        "- General education: {} credits, {:.1}% of requirement",
        graduation.general_credit, graduation.progress_general
    );
    let _ = writeln!(
        output,
        "- Total: {} credits, {:.1}% of requirement",
        graduation.total_credit, graduation.progress_total
    );

    output
}
