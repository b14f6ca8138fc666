use sqlx::types::Json;

use crate::db::models::Question;
use crate::db::types::QuestionKind;

pub(crate) const COLUMNS: &str =
    "id, assessment_id, kind, text, marks, position, options, correct_option";

pub(crate) struct CreateQuestion<'a> {
    pub(crate) id: &'a str,
    pub(crate) assessment_id: &'a str,
    pub(crate) kind: QuestionKind,
    pub(crate) text: &'a str,
    pub(crate) marks: f64,
    pub(crate) position: i32,
    pub(crate) options: Vec<String>,
    pub(crate) correct_option: Option<&'a str>,
}

pub(crate) async fn list_by_assessment(
    executor: impl sqlx::PgExecutor<'_>,
    assessment_id: &str,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions WHERE assessment_id = $1 ORDER BY position, id"
    ))
    .bind(assessment_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    question: CreateQuestion<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO questions (
            id, assessment_id, kind, text, marks, position, options, correct_option
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)",
    )
    .bind(question.id)
    .bind(question.assessment_id)
    .bind(question.kind)
    .bind(question.text)
    .bind(question.marks)
    .bind(question.position)
    .bind(Json(question.options))
    .bind(question.correct_option)
    .execute(executor)
    .await?;
    Ok(())
}
