use std::path::PathBuf;

use anyhow::Context;
use chrono::{Duration, Local, NaiveDate};
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

mod assignments;
mod chat;
mod db;
mod enrollment;
mod grades;
mod graduation;
mod models;
mod report;

use enrollment::SubjectFilter;
use graduation::CategoryMarkers;
use models::GraduationRequirements;

#[derive(Parser)]
#[command(name = "campus-academic-analytics")]
#[command(about = "Grade, graduation and chat activity analytics for the campus portal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ImportKind {
    Enrollments,
    Assignments,
    ChatLogs,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import rows from a CSV file
    Import {
        #[arg(long, value_enum)]
        kind: ImportKind,
        #[arg(long)]
        csv: PathBuf,
    },
    /// Grade listing and grade-point average for one student
    Grades {
        #[arg(long)]
        student_id: String,
        #[arg(long, default_values_t = [String::from("Career Guidance")])]
        exclude_subject: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Graduation requirement progress for one student
    Graduation {
        #[arg(long)]
        student_id: String,
        #[arg(long, default_value_t = 110.0)]
        total: f64,
        #[arg(long, default_value_t = 78.0)]
        major: f64,
        #[arg(long, default_value_t = 12.0)]
        general: f64,
        #[arg(long, default_values_t = [String::from("Career Guidance")])]
        exclude_subject: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// List assignments due within a horizon, or all of them
    #[command(group(
        ArgGroup::new("scope")
            .args(["due_within_days", "all"])
            .multiple(false)
    ))]
    Assignments {
        #[arg(long, default_value_t = 30)]
        due_within_days: i64,
        #[arg(long)]
        all: bool,
        #[arg(long)]
        json: bool,
    },
    /// Per-day conversation activity for one user
    ChatDays {
        #[arg(long)]
        uid: String,
        #[arg(long, default_value_t = 7)]
        window_days: i64,
        #[arg(long)]
        json: bool,
    },
    /// Full transcript for one user and calendar day
    ChatDetail {
        #[arg(long)]
        uid: String,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown academic standing report
    Report {
        #[arg(long)]
        student_id: String,
        #[arg(long, default_value_t = 110.0)]
        total: f64,
        #[arg(long, default_value_t = 78.0)]
        major: f64,
        #[arg(long, default_value_t = 12.0)]
        general: f64,
        #[arg(long, default_values_t = [String::from("Career Guidance")])]
        exclude_subject: Vec<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { kind, csv } => {
            let inserted = match kind {
                ImportKind::Enrollments => db::import_enrollments(&pool, &csv).await?,
                ImportKind::Assignments => db::import_assignments(&pool, &csv).await?,
                ImportKind::ChatLogs => db::import_chat_logs(&pool, &csv).await?,
            };
            println!("Inserted {inserted} rows from {}.", csv.display());
        }
        Commands::Grades {
            student_id,
            exclude_subject,
            json,
        } => {
            let rows = db::fetch_enrollment_rows(&pool, &student_id).await?;
            let normalized =
                enrollment::normalize_enrollments(&rows, &SubjectFilter::new(exclude_subject));
            let report = grades::compute_grade_report(&normalized);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            if report.lines.is_empty() {
                println!("No enrollments found for {student_id}.");
                return Ok(());
            }

            println!("Grade report for {student_id}:");
            for line in report.lines.iter() {
                let point = line
                    .grade_point
                    .map(|p| format!("{p:.1}"))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "- {} ({}, {}-{}) {} credits, grade {} (point {})",
                    line.subject, line.professor, line.year, line.semester, line.credit,
                    line.grade, point
                );
            }
            println!(
                "Average {:.2} over {} graded subjects, {} credits earned.",
                report.average, report.graded_subjects, report.total_credit
            );
        }
        Commands::Graduation {
            student_id,
            total,
            major,
            general,
            exclude_subject,
            json,
        } => {
            let requirements = GraduationRequirements {
                total,
                major,
                general,
            };
            let rows = db::fetch_enrollment_rows(&pool, &student_id).await?;
            let normalized =
                enrollment::normalize_enrollments(&rows, &SubjectFilter::new(exclude_subject));
            let summary = graduation::compute_graduation_summary(
                &normalized.class_entries,
                &CategoryMarkers::default(),
                &requirements,
            )?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }

            println!("Graduation progress for {student_id}:");
            println!(
                "- Major: {} credits ({} required + {} elective), {:.1}%",
                summary.major_credit,
                summary.major_required_credit,
                summary.major_elective_credit,
                summary.progress_major
            );
            println!(
                "- General education: {} credits, {:.1}%",
                summary.general_credit, summary.progress_general
            );
            println!(
                "- Total: {} credits, {:.1}%",
                summary.total_credit, summary.progress_total
            );
        }
        Commands::Assignments {
            due_within_days,
            all,
            json,
        } => {
            let rows = db::fetch_assignments(&pool).await?;
            let listing = if all {
                assignments::sort_by_due(&rows)
            } else {
                let now = Local::now().naive_local();
                assignments::filter_due_within(&rows, now, now + Duration::days(due_within_days))
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
                return Ok(());
            }

            if listing.is_empty() {
                println!("No assignments in this view.");
                return Ok(());
            }

            for assignment in listing.iter() {
                let due = assignment
                    .due_date
                    .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "no due date".to_string());
                println!(
                    "- {} ({}) due {}, status {}",
                    assignment.title,
                    assignment.subject_name,
                    due,
                    assignment.status.as_deref().unwrap_or("-")
                );
            }
        }
        Commands::ChatDays {
            uid,
            window_days,
            json,
        } => {
            let now = Local::now().naive_local();
            let since = now - Duration::days(window_days.max(1));
            let entries = db::fetch_chat_entries(&pool, &uid, Some(since)).await?;
            let days = chat::aggregate_by_day(&entries, now, window_days);

            if json {
                println!("{}", serde_json::to_string_pretty(&days)?);
                return Ok(());
            }

            if days.is_empty() {
                println!("No chat activity for {uid} in the last {window_days} days.");
                return Ok(());
            }

            for bucket in days.iter() {
                println!(
                    "- {}: {} messages (last question: {})",
                    bucket.day,
                    bucket.count,
                    bucket.last_user_message.as_deref().unwrap_or("-")
                );
            }
        }
        Commands::ChatDetail { uid, date, json } => {
            let entries = db::fetch_chat_entries(&pool, &uid, None).await?;
            let transcript = chat::day_transcript(&entries, date);

            if json {
                println!("{}", serde_json::to_string_pretty(&transcript)?);
                return Ok(());
            }

            if transcript.is_empty() {
                println!("No conversation for {uid} on {date}.");
                return Ok(());
            }

            for line in transcript.iter() {
                println!(
                    "[{}] {}: {}",
                    line.created_at.format("%H:%M:%S"),
                    line.speaker.as_str(),
                    line.message
                );
            }
        }
        Commands::Report {
            student_id,
            total,
            major,
            general,
            exclude_subject,
            out,
        } => {
            let requirements = GraduationRequirements {
                total,
                major,
                general,
            };
            let rows = db::fetch_enrollment_rows(&pool, &student_id).await?;
            let normalized =
                enrollment::normalize_enrollments(&rows, &SubjectFilter::new(exclude_subject));
            let grade_report = grades::compute_grade_report(&normalized);
            let summary = graduation::compute_graduation_summary(
                &normalized.class_entries,
                &CategoryMarkers::default(),
                &requirements,
            )?;

            let report = report::build_report(&student_id, &grade_report, &summary);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
