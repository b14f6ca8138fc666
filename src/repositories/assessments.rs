use sqlx::PgPool;
use time::{Date, OffsetDateTime, Time};

use crate::db::models::Assessment;

pub(crate) const COLUMNS: &str = "\
    id, title, subject, class_id, total_marks, passing_marks, duration_minutes, \
    scheduled_date, start_time, end_time, created_by, created_at";

pub(crate) struct CreateAssessment<'a> {
    pub(crate) id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) subject: &'a str,
    pub(crate) class_id: &'a str,
    pub(crate) total_marks: f64,
    pub(crate) passing_marks: f64,
    pub(crate) duration_minutes: Option<i32>,
    pub(crate) scheduled_date: Option<Date>,
    pub(crate) start_time: Option<Time>,
    pub(crate) end_time: Option<Time>,
    pub(crate) created_by: &'a str,
    pub(crate) created_at: OffsetDateTime,
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Assessment>, sqlx::Error> {
    sqlx::query_as::<_, Assessment>(&format!("SELECT {COLUMNS} FROM assessments WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    assessment: CreateAssessment<'_>,
) -> Result<Assessment, sqlx::Error> {
    sqlx::query_as::<_, Assessment>(&format!(
        "INSERT INTO assessments (
            id, title, subject, class_id, total_marks, passing_marks, duration_minutes,
            scheduled_date, start_time, end_time, created_by, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
        RETURNING {COLUMNS}"
    ))
    .bind(assessment.id)
    .bind(assessment.title)
    .bind(assessment.subject)
    .bind(assessment.class_id)
    .bind(assessment.total_marks)
    .bind(assessment.passing_marks)
    .bind(assessment.duration_minutes)
    .bind(assessment.scheduled_date)
    .bind(assessment.start_time)
    .bind(assessment.end_time)
    .bind(assessment.created_by)
    .bind(assessment.created_at)
    .fetch_one(executor)
    .await
}
