use sqlx::PgPool;

use crate::db::models::Score;

pub(crate) const COLUMNS: &str = "\
    id, assessment_id, student_id, attempt_id, obtained_marks, total_marks, \
    percentage, passed, graded_at";

pub(crate) async fn find_for_student(
    pool: &PgPool,
    assessment_id: &str,
    student_id: &str,
) -> Result<Option<Score>, sqlx::Error> {
    sqlx::query_as::<_, Score>(&format!(
        "SELECT {COLUMNS} FROM scores WHERE assessment_id = $1 AND student_id = $2"
    ))
    .bind(assessment_id)
    .bind(student_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_by_assessment(
    pool: &PgPool,
    assessment_id: &str,
) -> Result<Vec<Score>, sqlx::Error> {
    sqlx::query_as::<_, Score>(&format!(
        "SELECT {COLUMNS} FROM scores WHERE assessment_id = $1 ORDER BY graded_at, student_id"
    ))
    .bind(assessment_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn insert(
    executor: impl sqlx::PgExecutor<'_>,
    score: &Score,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO scores (
            id, assessment_id, student_id, attempt_id, obtained_marks, total_marks,
            percentage, passed, graded_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)",
    )
    .bind(&score.id)
    .bind(&score.assessment_id)
    .bind(&score.student_id)
    .bind(&score.attempt_id)
    .bind(score.obtained_marks)
    .bind(score.total_marks)
    .bind(score.percentage)
    .bind(score.passed)
    .bind(score.graded_at)
    .execute(executor)
    .await?;
    Ok(())
}
