use sqlx::types::Json;
use sqlx::FromRow;
use time::{Date, OffsetDateTime, Time};

use crate::db::types::{AttemptStatus, QuestionKind};
pub(crate) use crate::schemas::attempt::AnswerMap;

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Assessment {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) subject: String,
    pub(crate) class_id: String,
    pub(crate) total_marks: f64,
    pub(crate) passing_marks: f64,
    pub(crate) duration_minutes: Option<i32>,
    pub(crate) scheduled_date: Option<Date>,
    pub(crate) start_time: Option<Time>,
    pub(crate) end_time: Option<Time>,
    pub(crate) created_by: String,
    pub(crate) created_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Question {
    pub(crate) id: String,
    pub(crate) assessment_id: String,
    pub(crate) kind: QuestionKind,
    pub(crate) text: String,
    pub(crate) marks: f64,
    pub(crate) position: i32,
    pub(crate) options: Json<Vec<String>>,
    pub(crate) correct_option: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Attempt {
    pub(crate) id: String,
    pub(crate) assessment_id: String,
    pub(crate) student_id: String,
    pub(crate) status: AttemptStatus,
    pub(crate) started_at: OffsetDateTime,
    pub(crate) ended_at: Option<OffsetDateTime>,
    pub(crate) submitted_answers: Json<AnswerMap>,
    pub(crate) last_saved_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct Score {
    pub(crate) id: String,
    pub(crate) assessment_id: String,
    pub(crate) student_id: String,
    pub(crate) attempt_id: String,
    pub(crate) obtained_marks: f64,
    pub(crate) total_marks: f64,
    pub(crate) percentage: f64,
    pub(crate) passed: bool,
    pub(crate) graded_at: OffsetDateTime,
}
