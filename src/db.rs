use anyhow::Context;
use chrono::{Duration, NaiveDateTime};
use sqlx::{PgPool, Row};
use tracing::warn;
use uuid::Uuid;

use crate::models::{Assignment, ChatLogEntry, EnrollmentRow, Grade, Speaker};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS classes (
            id UUID PRIMARY KEY,
            subject TEXT NOT NULL UNIQUE,
            professor TEXT NOT NULL DEFAULT '',
            credit DOUBLE PRECISION,
            course_type TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS enrollments (
            id BIGSERIAL PRIMARY KEY,
            student_id TEXT NOT NULL,
            class_id UUID NOT NULL REFERENCES classes(id),
            year INT NOT NULL,
            semester INT NOT NULL,
            grade TEXT,
            source_key TEXT UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS assignments (
            id SERIAL PRIMARY KEY,
            subject_name TEXT NOT NULL,
            title TEXT NOT NULL,
            due_date TIMESTAMP,
            status TEXT,
            score TEXT,
            source_key TEXT UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chat_logs (
            id BIGSERIAL PRIMARY KEY,
            uid TEXT NOT NULL,
            speaker TEXT NOT NULL,
            message TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT now(),
            source_key TEXT UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn upsert_class(
    pool: &PgPool,
    subject: &str,
    professor: &str,
    credit: Option<f64>,
    course_type: &str,
) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query(
        r#"
        INSERT INTO classes (id, subject, professor, credit, course_type)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (subject) DO UPDATE
        SET professor = EXCLUDED.professor,
            credit = EXCLUDED.credit,
            course_type = EXCLUDED.course_type
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(subject)
    .bind(professor)
    .bind(credit)
    .bind(course_type)
    .fetch_one(pool)
    .await?
    .get("id");

    Ok(id)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let classes = vec![
        ("Data Structures", "Kim Jihye", Some(3.0), "required-major"),
        ("Operating Systems", "Park Minsu", Some(3.0), "required-major"),
        ("Web Programming", "Lee Soyeon", Some(3.0), "elective-major"),
        ("Technical Writing", "Choi Dongwook", Some(2.0), "general-education"),
        ("Career Guidance Seminar", "Han Yuna", Some(1.0), "other"),
    ];

    for (subject, professor, credit, course_type) in classes {
        upsert_class(pool, subject, professor, credit, course_type).await?;
    }

    // Duplicate term rows for Data Structures mimic upstream join fan-out;
    // the 2024 row is a retake of the same class.
    let enrollments = vec![
        ("seed-enr-001", "20230001", "Data Structures", 2025, 1, Some("A+")),
        ("seed-enr-002", "20230001", "Data Structures", 2025, 1, Some("A+")),
        ("seed-enr-003", "20230001", "Data Structures", 2024, 2, Some("F")),
        ("seed-enr-004", "20230001", "Operating Systems", 2025, 1, Some("A")),
        ("seed-enr-005", "20230001", "Web Programming", 2024, 2, Some("B+")),
        ("seed-enr-006", "20230001", "Technical Writing", 2024, 2, None),
        ("seed-enr-007", "20230001", "Career Guidance Seminar", 2025, 1, Some("A+")),
    ];

    for (source_key, student_id, subject, year, semester, grade) in enrollments {
        let class_id: Uuid = sqlx::query("SELECT id FROM classes WHERE subject = $1")
            .bind(subject)
            .fetch_one(pool)
            .await?
            .get("id");

        sqlx::query(
            r#"
            INSERT INTO enrollments (student_id, class_id, year, semester, grade, source_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(student_id)
        .bind(class_id)
        .bind(year)
        .bind(semester)
        .bind(grade)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    let now = chrono::Local::now().naive_local();
    let assignments = vec![
        ("seed-asg-001", "Data Structures", "Heap lab", Some(now + Duration::days(3)), Some("open"), None),
        ("seed-asg-002", "Operating Systems", "Scheduler report", Some(now + Duration::days(12)), Some("open"), None),
        ("seed-asg-003", "Web Programming", "Final project", Some(now + Duration::days(45)), Some("open"), None),
        ("seed-asg-004", "Technical Writing", "Peer review", None, Some("draft"), Some("92")),
    ];

    for (source_key, subject_name, title, due_date, status, score) in assignments {
        sqlx::query(
            r#"
            INSERT INTO assignments (subject_name, title, due_date, status, score, source_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(subject_name)
        .bind(title)
        .bind(due_date)
        .bind(status)
        .bind(score)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    let chat_logs = vec![
        ("seed-chat-001", "20230001", "USER", "When is the heap lab due?", now - Duration::hours(30)),
        ("seed-chat-002", "20230001", "BOT", "The heap lab is due in three days.", now - Duration::hours(30) + Duration::minutes(1)),
        ("seed-chat-003", "20230001", "USER", "Show my graduation progress.", now - Duration::hours(2)),
        ("seed-chat-004", "20230001", "BOT", "You have completed 66 credits so far.", now - Duration::hours(2) + Duration::minutes(1)),
        ("seed-chat-005", "20230001", "USER", "Thanks!", now - Duration::hours(1)),
    ];

    for (source_key, uid, speaker, message, created_at) in chat_logs {
        sqlx::query(
            r#"
            INSERT INTO chat_logs (uid, speaker, message, created_at, source_key)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(uid)
        .bind(speaker)
        .bind(message)
        .bind(created_at)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn fetch_enrollment_rows(
    pool: &PgPool,
    student_id: &str,
) -> anyhow::Result<Vec<EnrollmentRow>> {
    let records = sqlx::query(
        "SELECT e.student_id, e.class_id, e.year, e.semester, e.grade, \
         c.subject, c.professor, c.credit, c.course_type \
         FROM enrollments e \
         JOIN classes c ON c.id = e.class_id \
         WHERE e.student_id = $1 \
         ORDER BY e.year DESC, e.semester DESC, c.subject ASC",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    let mut rows = Vec::new();
    for record in records {
        let subject: String = record.get("subject");
        let credit: Option<f64> = record.get("credit");
        let credit = match credit {
            Some(value) => value,
            None => {
                warn!(subject = %subject, "class has no credit value, counting as 0");
                0.0
            }
        };
        let grade: Option<String> = record.get("grade");

        rows.push(EnrollmentRow {
            student_id: record.get("student_id"),
            class_id: record.get("class_id"),
            subject,
            professor: record.get("professor"),
            credit,
            grade: Grade::parse(grade.as_deref()),
            course_type: record.get("course_type"),
            year: record.get("year"),
            semester: record.get("semester"),
        });
    }

    Ok(rows)
}

pub async fn fetch_assignments(pool: &PgPool) -> anyhow::Result<Vec<Assignment>> {
    let records = sqlx::query(
        "SELECT id, subject_name, title, due_date, status, score FROM assignments",
    )
    .fetch_all(pool)
    .await?;

    let mut assignments = Vec::new();
    for record in records {
        assignments.push(Assignment {
            id: record.get("id"),
            subject_name: record.get("subject_name"),
            title: record.get("title"),
            due_date: record.get("due_date"),
            status: record.get("status"),
            score: record.get("score"),
        });
    }

    Ok(assignments)
}

pub async fn fetch_chat_entries(
    pool: &PgPool,
    uid: &str,
    since: Option<NaiveDateTime>,
) -> anyhow::Result<Vec<ChatLogEntry>> {
    let mut query = String::from(
        "SELECT id, uid, speaker, message, created_at FROM chat_logs WHERE uid = $1",
    );
    if since.is_some() {
        query.push_str(" AND created_at >= $2");
    }
    query.push_str(" ORDER BY created_at ASC, id ASC");

    let mut rows = sqlx::query(&query).bind(uid);
    if let Some(value) = since {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(pool).await?;
    let mut entries = Vec::new();

    for record in records {
        let raw_speaker: String = record.get("speaker");
        let Some(speaker) = Speaker::parse(&raw_speaker) else {
            warn!(speaker = %raw_speaker, "skipping chat row with unknown speaker");
            continue;
        };

        entries.push(ChatLogEntry {
            id: record.get("id"),
            uid: record.get("uid"),
            speaker,
            message: record.get("message"),
            created_at: record.get("created_at"),
        });
    }

    Ok(entries)
}

pub async fn import_enrollments(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        student_id: String,
        subject: String,
        professor: String,
        credit: Option<f64>,
        grade: Option<String>,
        course_type: String,
        year: i32,
        semester: i32,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let class_id = upsert_class(
            pool,
            &row.subject,
            &row.professor,
            row.credit,
            &row.course_type,
        )
        .await?;

        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let result = sqlx::query(
            r#"
            INSERT INTO enrollments (student_id, class_id, year, semester, grade, source_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(&row.student_id)
        .bind(class_id)
        .bind(row.year)
        .bind(row.semester)
        .bind(&row.grade)
        .bind(source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}

pub async fn import_assignments(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        subject_name: String,
        title: String,
        due_date: Option<NaiveDateTime>,
        status: Option<String>,
        score: Option<String>,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let result = sqlx::query(
            r#"
            INSERT INTO assignments (subject_name, title, due_date, status, score, source_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(&row.subject_name)
        .bind(&row.title)
        .bind(row.due_date)
        .bind(&row.status)
        .bind(&row.score)
        .bind(source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}

pub async fn import_chat_logs(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        uid: String,
        speaker: String,
        message: String,
        created_at: NaiveDateTime,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let speaker = Speaker::parse(&row.speaker)
            .with_context(|| format!("unknown speaker value '{}'", row.speaker))?;

        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let result = sqlx::query(
            r#"
            INSERT INTO chat_logs (uid, speaker, message, created_at, source_key)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(&row.uid)
        .bind(speaker.as_str())
        .bind(&row.message)
        .bind(row.created_at)
        .bind(source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}
