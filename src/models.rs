use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LetterGrade {
    APlus,
    A,
    BPlus,
    B,
    CPlus,
    C,
    DPlus,
    D,
    F,
}

impl LetterGrade {
    pub fn parse(raw: &str) -> Option<LetterGrade> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "A+" => Some(LetterGrade::APlus),
            "A" => Some(LetterGrade::A),
            "B+" => Some(LetterGrade::BPlus),
            "B" => Some(LetterGrade::B),
            "C+" => Some(LetterGrade::CPlus),
            "C" => Some(LetterGrade::C),
            "D+" => Some(LetterGrade::DPlus),
            "D" => Some(LetterGrade::D),
            "F" => Some(LetterGrade::F),
            _ => None,
        }
    }

    pub fn point(self) -> f64 {
        match self {
            LetterGrade::APlus => 4.5,
            LetterGrade::A => 4.0,
            LetterGrade::BPlus => 3.5,
            LetterGrade::B => 3.0,
            LetterGrade::CPlus => 2.5,
            LetterGrade::C => 2.0,
            LetterGrade::DPlus => 1.5,
            LetterGrade::D => 1.0,
            LetterGrade::F => 0.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LetterGrade::APlus => "A+",
            LetterGrade::A => "A",
            LetterGrade::BPlus => "B+",
            LetterGrade::B => "B",
            LetterGrade::CPlus => "C+",
            LetterGrade::C => "C",
            LetterGrade::DPlus => "D+",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        }
    }
}

/// A grade is either a letter on the nine-step scale, a raw numeric score,
/// or unresolved (null, empty, or unrecognized in the source row).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Grade {
    Letter(LetterGrade),
    Numeric(f64),
    Unresolved,
}

impl Grade {
    pub fn parse(raw: Option<&str>) -> Grade {
        let Some(raw) = raw else {
            return Grade::Unresolved;
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Grade::Unresolved;
        }
        if let Some(letter) = LetterGrade::parse(trimmed) {
            return Grade::Letter(letter);
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Grade::Numeric(value),
            _ => Grade::Unresolved,
        }
    }

    pub fn point(self) -> Option<f64> {
        match self {
            Grade::Letter(letter) => Some(letter.point()),
            Grade::Numeric(value) => Some(value),
            Grade::Unresolved => None,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::Letter(letter) => write!(f, "{}", letter.as_str()),
            Grade::Numeric(value) => write!(f, "{value}"),
            Grade::Unresolved => write!(f, "-"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentRow {
    pub student_id: String,
    pub class_id: Uuid,
    pub subject: String,
    pub professor: String,
    pub credit: f64,
    pub grade: Grade,
    pub course_type: String,
    pub year: i32,
    pub semester: i32,
}

/// Output of the enrollment normalizer. `term_entries` holds one row per
/// distinct (class_id, year, semester); `class_entries` holds one row per
/// distinct class_id so total-credit sums count a retaken class once.
#[derive(Debug, Clone)]
pub struct NormalizedEnrollments {
    pub term_entries: Vec<EnrollmentRow>,
    pub class_entries: Vec<EnrollmentRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GradeLine {
    pub subject: String,
    pub professor: String,
    pub credit: f64,
    pub grade: Grade,
    pub grade_point: Option<f64>,
    pub year: i32,
    pub semester: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct GradeReport {
    pub lines: Vec<GradeLine>,
    pub total_credit: f64,
    pub average: f64,
    pub graded_subjects: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct GraduationRequirements {
    pub total: f64,
    pub major: f64,
    pub general: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraduationSummary {
    pub major_required_credit: f64,
    pub major_elective_credit: f64,
    pub general_credit: f64,
    pub major_credit: f64,
    pub total_credit: f64,
    pub progress_major: f64,
    pub progress_general: f64,
    pub progress_total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub id: i32,
    pub subject_name: String,
    pub title: String,
    pub due_date: Option<NaiveDateTime>,
    pub status: Option<String>,
    pub score: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Speaker {
    User,
    Bot,
}

impl Speaker {
    pub fn parse(raw: &str) -> Option<Speaker> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "USER" => Some(Speaker::User),
            "BOT" => Some(Speaker::Bot),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Speaker::User => "USER",
            Speaker::Bot => "BOT",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatLogEntry {
    pub id: i64,
    pub uid: String,
    pub speaker: Speaker,
    pub message: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayBucket {
    pub day: NaiveDate,
    pub count: usize,
    pub last_user_message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptLine {
    pub speaker: Speaker,
    pub message: String,
    pub created_at: NaiveDateTime,
}
