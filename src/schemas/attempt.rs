use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::db::models::Attempt;
use crate::db::types::AttemptStatus;

/// Question id to the student's answer. Values are opaque to the lifecycle.
pub type AnswerMap = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResponse {
    pub id: String,
    pub test_id: String,
    pub student_id: String,
    pub status: AttemptStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_time: Option<OffsetDateTime>,
    #[serde(default)]
    pub submitted_answers: AnswerMap,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_saved_at: Option<OffsetDateTime>,
}

impl From<Attempt> for AttemptResponse {
    fn from(value: Attempt) -> Self {
        Self {
            id: value.id,
            test_id: value.assessment_id,
            student_id: value.student_id,
            status: value.status,
            start_time: value.started_at,
            end_time: value.ended_at,
            submitted_answers: value.submitted_answers.0,
            last_saved_at: value.last_saved_at,
        }
    }
}

/// Body of both the submit and the progress-save calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptAnswersRequest {
    #[serde(default)]
    pub submitted_answers: AnswerMap,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn attempt_wire_shape() {
        let attempt = AttemptResponse {
            id: "a-1".to_string(),
            test_id: "t-1".to_string(),
            student_id: "s-1".to_string(),
            status: AttemptStatus::InProgress,
            start_time: datetime!(2025-03-01 09:00:00 UTC),
            end_time: None,
            submitted_answers: AnswerMap::new(),
            last_saved_at: None,
        };

        let value = serde_json::to_value(&attempt).unwrap();
        assert_eq!(value["testId"], "t-1");
        assert_eq!(value["status"], "in-progress");
        assert_eq!(value["startTime"], "2025-03-01T09:00:00Z");
        assert!(value["endTime"].is_null());
    }

    #[test]
    fn answers_request_defaults_to_empty() {
        let parsed: AttemptAnswersRequest = serde_json::from_value(json!({})).unwrap();
        assert!(parsed.submitted_answers.is_empty());

        let parsed: AttemptAnswersRequest =
            serde_json::from_value(json!({ "submittedAnswers": { "q1": "B" } })).unwrap();
        assert_eq!(parsed.submitted_answers["q1"], "B");
    }
}
