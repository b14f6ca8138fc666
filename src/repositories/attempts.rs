use sqlx::types::Json;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::db::models::{AnswerMap, Attempt};
use crate::db::types::AttemptStatus;

pub(crate) const COLUMNS: &str = "\
    id, assessment_id, student_id, status, started_at, ended_at, \
    submitted_answers, last_saved_at";

pub(crate) struct CreateAttempt<'a> {
    pub(crate) id: &'a str,
    pub(crate) assessment_id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) started_at: OffsetDateTime,
}

pub(crate) async fn find_for_student(
    executor: impl sqlx::PgExecutor<'_>,
    assessment_id: &str,
    student_id: &str,
) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "SELECT {COLUMNS} FROM attempts WHERE assessment_id = $1 AND student_id = $2"
    ))
    .bind(assessment_id)
    .bind(student_id)
    .fetch_optional(executor)
    .await
}

/// Row-locks the student's attempt for the rest of the transaction.
pub(crate) async fn lock_for_student(
    executor: impl sqlx::PgExecutor<'_>,
    assessment_id: &str,
    student_id: &str,
) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "SELECT {COLUMNS} FROM attempts WHERE assessment_id = $1 AND student_id = $2 FOR UPDATE"
    ))
    .bind(assessment_id)
    .bind(student_id)
    .fetch_optional(executor)
    .await
}

/// Returns `None` when an attempt already exists for the pair.
pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    attempt: CreateAttempt<'_>,
) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "INSERT INTO attempts (id, assessment_id, student_id, status, started_at, submitted_answers)
         VALUES ($1, $2, $3, $4, $5, '{{}}'::jsonb)
         ON CONFLICT (assessment_id, student_id) DO NOTHING
         RETURNING {COLUMNS}"
    ))
    .bind(attempt.id)
    .bind(attempt.assessment_id)
    .bind(attempt.student_id)
    .bind(AttemptStatus::InProgress)
    .bind(attempt.started_at)
    .fetch_optional(executor)
    .await
}

/// Moves an in-progress attempt to `completed`. `None` means it was no longer in progress.
pub(crate) async fn complete(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    answers: &AnswerMap,
    ended_at: OffsetDateTime,
) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "UPDATE attempts
         SET status = $1, ended_at = $2, submitted_answers = $3, last_saved_at = $2
         WHERE id = $4 AND status = $5
         RETURNING {COLUMNS}"
    ))
    .bind(AttemptStatus::Completed)
    .bind(ended_at)
    .bind(Json(answers))
    .bind(id)
    .bind(AttemptStatus::InProgress)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn save_progress(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    answers: &AnswerMap,
    now: OffsetDateTime,
) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "UPDATE attempts
         SET submitted_answers = $1, last_saved_at = $2
         WHERE id = $3 AND status = $4
         RETURNING {COLUMNS}"
    ))
    .bind(Json(answers))
    .bind(now)
    .bind(id)
    .bind(AttemptStatus::InProgress)
    .fetch_optional(executor)
    .await
}

/// Expires a single overdue attempt; `ended_at` is its deadline.
pub(crate) async fn expire(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    ended_at: OffsetDateTime,
) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "UPDATE attempts
         SET status = $1, ended_at = $2
         WHERE id = $3 AND status = $4
         RETURNING {COLUMNS}"
    ))
    .bind(AttemptStatus::Expired)
    .bind(ended_at)
    .bind(id)
    .bind(AttemptStatus::InProgress)
    .fetch_optional(executor)
    .await
}

/// Expires every in-progress attempt whose deadline plus grace lies before `now`.
pub(crate) async fn expire_overdue(
    pool: &PgPool,
    now: OffsetDateTime,
    grace_seconds: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE attempts AS a
         SET status = $1,
             ended_at = a.started_at + make_interval(mins => d.duration_minutes)
         FROM assessments AS d
         WHERE a.assessment_id = d.id
           AND a.status = $2
           AND d.duration_minutes IS NOT NULL
           AND a.started_at + make_interval(mins => d.duration_minutes)
               + make_interval(secs => $3) < $4",
    )
    .bind(AttemptStatus::Expired)
    .bind(AttemptStatus::InProgress)
    .bind(grace_seconds as f64)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
