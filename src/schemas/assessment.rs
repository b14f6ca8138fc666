use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, Time};
use validator::Validate;

use crate::db::models::{Assessment, Question};
use crate::db::types::QuestionKind;
use crate::services::attempt_timing::{self, ScheduleIssue, StartWindow};

time::serde::format_description!(wire_date, Date, "[year]-[month]-[day]");
time::serde::format_description!(wire_time, Time, "[hour]:[minute]:[second]");

/// Test metadata as served by `GET /tests/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResponse {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub class_id: String,
    pub total_marks: f64,
    pub passing_marks: f64,
    #[serde(default)]
    pub duration_minutes: Option<i32>,
    #[serde(default, with = "wire_date::option")]
    pub scheduled_date: Option<Date>,
    #[serde(default, with = "wire_time::option")]
    pub start_time: Option<Time>,
    #[serde(default, with = "wire_time::option")]
    pub end_time: Option<Time>,
    pub created_by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl AssessmentResponse {
    /// The start window, or the reason the test cannot be timed.
    pub fn start_window(&self) -> Result<StartWindow, ScheduleIssue> {
        attempt_timing::start_window(
            self.duration_minutes,
            self.scheduled_date,
            self.start_time,
            self.end_time,
        )
    }
}

impl From<Assessment> for AssessmentResponse {
    fn from(value: Assessment) -> Self {
        Self {
            id: value.id,
            title: value.title,
            subject: value.subject,
            class_id: value.class_id,
            total_marks: value.total_marks,
            passing_marks: value.passing_marks,
            duration_minutes: value.duration_minutes,
            scheduled_date: value.scheduled_date,
            start_time: value.start_time,
            end_time: value.end_time,
            created_by: value.created_by,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: String,
    pub kind: QuestionKind,
    pub text: String,
    pub marks: f64,
    pub position: i32,
    #[serde(default)]
    pub options: Vec<String>,
    /// Present only for roles allowed to see answer keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_option: Option<String>,
}

impl QuestionResponse {
    pub(crate) fn from_model(question: Question, reveal_key: bool) -> Self {
        Self {
            id: question.id,
            kind: question.kind,
            text: question.text,
            marks: question.marks,
            position: question.position,
            options: question.options.0,
            correct_option: if reveal_key { question.correct_option } else { None },
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionCreate {
    pub(crate) kind: QuestionKind,
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub(crate) text: String,
    #[validate(range(min = 0.0, message = "marks must be non-negative"))]
    pub(crate) marks: f64,
    #[serde(default)]
    pub(crate) options: Vec<String>,
    #[serde(default)]
    pub(crate) correct_option: Option<String>,
}

impl QuestionCreate {
    /// Multiple-choice questions need options and a key that is one of them.
    pub(crate) fn shape_error(&self) -> Option<String> {
        match self.kind {
            QuestionKind::MultipleChoice => {
                if self.options.len() < 2 {
                    return Some(format!("'{}' needs at least two options", self.text));
                }
                match self.correct_option.as_deref() {
                    Some(correct) if self.options.iter().any(|option| option == correct) => None,
                    Some(_) => Some(format!("'{}' has a correct option outside its options", self.text)),
                    None => Some(format!("'{}' is missing its correct option", self.text)),
                }
            }
            QuestionKind::Descriptive => {
                if self.options.is_empty() && self.correct_option.is_none() {
                    None
                } else {
                    Some(format!("'{}' is descriptive and cannot carry options", self.text))
                }
            }
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssessmentCreate {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub(crate) title: String,
    #[validate(length(min = 1, max = 255, message = "subject must be 1-255 characters"))]
    pub(crate) subject: String,
    #[validate(length(min = 1, message = "classId must not be empty"))]
    pub(crate) class_id: String,
    #[validate(range(min = 0.0, message = "totalMarks must be non-negative"))]
    pub(crate) total_marks: f64,
    #[validate(range(min = 0.0, message = "passingMarks must be non-negative"))]
    pub(crate) passing_marks: f64,
    #[serde(default)]
    #[validate(range(min = 1, max = 1440, message = "durationMinutes must be 1-1440"))]
    pub(crate) duration_minutes: Option<i32>,
    #[serde(default, with = "wire_date::option")]
    pub(crate) scheduled_date: Option<Date>,
    #[serde(default, with = "wire_time::option")]
    pub(crate) start_time: Option<Time>,
    #[serde(default, with = "wire_time::option")]
    pub(crate) end_time: Option<Time>,
    #[validate(length(min = 1, message = "a test needs at least one question"), nested)]
    pub(crate) questions: Vec<QuestionCreate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssessmentCreated {
    #[serde(flatten)]
    pub(crate) assessment: AssessmentResponse,
    pub(crate) questions: Vec<QuestionResponse>,
}
