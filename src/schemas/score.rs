use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::db::models::Score;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    pub id: String,
    pub test_id: String,
    pub student_id: String,
    pub attempt_id: String,
    pub obtained_marks: f64,
    pub total_marks: f64,
    pub percentage: f64,
    pub passed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub graded_at: OffsetDateTime,
}

impl From<Score> for ScoreResponse {
    fn from(value: Score) -> Self {
        Self {
            id: value.id,
            test_id: value.assessment_id,
            student_id: value.student_id,
            attempt_id: value.attempt_id,
            obtained_marks: value.obtained_marks,
            total_marks: value.total_marks,
            percentage: value.percentage,
            passed: value.passed,
            graded_at: value.graded_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScoreQuery {
    pub(crate) test_id: String,
}
