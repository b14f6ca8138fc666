use time::OffsetDateTime;

use crate::client::api::AttemptApi;
use crate::client::clock::Clock;
use crate::client::context::RequestContext;
use crate::client::error::ClientError;
use crate::db::types::AttemptStatus;
use crate::schemas::assessment::{AssessmentResponse, QuestionResponse};
use crate::schemas::attempt::AttemptResponse;
use crate::services::attempt_timing::{self, ScheduleIssue};

/// Where the taking view starts, derived from server data and the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedPhase {
    /// No attempt yet. Starting one is a separate, explicit action.
    NotStarted,
    InProgress { remaining_seconds: u64 },
    /// In progress on the server, but no time is left.
    TimeUp,
    Terminal(AttemptStatus),
    Misconfigured(ScheduleIssue),
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub test: AssessmentResponse,
    pub questions: Vec<QuestionResponse>,
    pub attempt: Option<AttemptResponse>,
    pub phase: ResolvedPhase,
}

pub async fn resolve(
    api: &dyn AttemptApi,
    ctx: &RequestContext,
    clock: &dyn Clock,
    test_id: &str,
) -> Result<Resolution, ClientError> {
    let (test, questions, attempt) = tokio::try_join!(
        api.fetch_test(ctx, test_id),
        api.fetch_questions(ctx, test_id),
        api.fetch_attempt(ctx, test_id),
    )?;

    let phase = derive_phase(&test, attempt.as_ref(), clock.now());
    tracing::debug!(
        test_id,
        questions = questions.len(),
        has_attempt = attempt.is_some(),
        phase = ?phase,
        "Attempt resolved"
    );

    Ok(Resolution { test, questions, attempt, phase })
}

pub fn derive_phase(
    test: &AssessmentResponse,
    attempt: Option<&AttemptResponse>,
    now: OffsetDateTime,
) -> ResolvedPhase {
    let Some(attempt) = attempt else {
        return match test.start_window() {
            Ok(_) => ResolvedPhase::NotStarted,
            Err(issue) => ResolvedPhase::Misconfigured(issue),
        };
    };

    if attempt.status.is_terminal() {
        return ResolvedPhase::Terminal(attempt.status);
    }

    match attempt_timing::validate_duration(test.duration_minutes) {
        Err(issue) => ResolvedPhase::Misconfigured(issue),
        Ok(duration) => match attempt_timing::remaining_seconds(duration, attempt.start_time, now) {
            0 => ResolvedPhase::TimeUp,
            remaining_seconds => ResolvedPhase::InProgress { remaining_seconds },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::attempt::AnswerMap;
    use time::macros::{date, datetime, time};
    use time::Duration;

    fn test_with(duration_minutes: Option<i32>) -> AssessmentResponse {
        AssessmentResponse {
            id: "t-1".to_string(),
            title: "Fractions".to_string(),
            subject: "Maths".to_string(),
            class_id: "7b".to_string(),
            total_marks: 10.0,
            passing_marks: 5.0,
            duration_minutes,
            scheduled_date: Some(date!(2025 - 03 - 01)),
            start_time: Some(time!(9:00)),
            end_time: Some(time!(12:00)),
            created_by: "teacher-1".to_string(),
            created_at: datetime!(2025-02-20 10:00:00 UTC),
        }
    }

    fn attempt(status: AttemptStatus, start_time: OffsetDateTime) -> AttemptResponse {
        AttemptResponse {
            id: "a-1".to_string(),
            test_id: "t-1".to_string(),
            student_id: "s-1".to_string(),
            status,
            start_time,
            end_time: None,
            submitted_answers: AnswerMap::new(),
            last_saved_at: None,
        }
    }

    #[test]
    fn twenty_five_minutes_into_thirty_leaves_five() {
        let now = datetime!(2025-03-01 10:00:00 UTC);
        let started = attempt(AttemptStatus::InProgress, now - Duration::minutes(25));

        let phase = derive_phase(&test_with(Some(30)), Some(&started), now);
        assert_eq!(phase, ResolvedPhase::InProgress { remaining_seconds: 300 });
    }

    #[test]
    fn overdue_attempt_is_time_up() {
        let now = datetime!(2025-03-01 10:00:00 UTC);
        let started = attempt(AttemptStatus::InProgress, now - Duration::minutes(31));

        assert_eq!(derive_phase(&test_with(Some(30)), Some(&started), now), ResolvedPhase::TimeUp);
    }

    #[test]
    fn terminal_status_wins_over_time() {
        let now = datetime!(2025-03-01 10:00:00 UTC);
        let done = attempt(AttemptStatus::Completed, now - Duration::minutes(1));

        assert_eq!(
            derive_phase(&test_with(Some(30)), Some(&done), now),
            ResolvedPhase::Terminal(AttemptStatus::Completed)
        );
    }

    #[test]
    fn missing_attempt_needs_explicit_start() {
        let now = datetime!(2025-03-01 10:00:00 UTC);
        assert_eq!(derive_phase(&test_with(Some(30)), None, now), ResolvedPhase::NotStarted);
    }

    #[test]
    fn missing_configuration_is_reported_not_computed() {
        let now = datetime!(2025-03-01 10:00:00 UTC);
        let started = attempt(AttemptStatus::InProgress, now);
        assert_eq!(
            derive_phase(&test_with(None), Some(&started), now),
            ResolvedPhase::Misconfigured(ScheduleIssue::MissingDuration)
        );

        let mut unscheduled = test_with(Some(30));
        unscheduled.end_time = None;
        assert_eq!(
            derive_phase(&unscheduled, None, now),
            ResolvedPhase::Misconfigured(ScheduleIssue::MissingEndTime)
        );
    }
}
