use crate::client::api::AttemptApi;
use crate::client::context::RequestContext;
use crate::client::error::ClientError;
use crate::db::types::AttemptStatus;
use crate::schemas::assessment::AssessmentResponse;
use crate::schemas::attempt::AttemptResponse;
use crate::schemas::score::ScoreResponse;
use crate::services::attempt_timing::elapsed_seconds;

/// Read-only figures for the result view of a completed attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSummary {
    pub test: AssessmentResponse,
    pub score: ScoreResponse,
    pub attempt: AttemptResponse,
    pub elapsed_seconds: u64,
    pub answered: usize,
    /// `None` when nothing was answered.
    pub average_seconds_per_answer: Option<f64>,
}

impl ResultSummary {
    pub async fn load(
        api: &dyn AttemptApi,
        ctx: &RequestContext,
        test_id: &str,
    ) -> Result<Self, ClientError> {
        let (test, score, attempt) = tokio::try_join!(
            api.fetch_test(ctx, test_id),
            api.fetch_score(ctx, test_id),
            api.fetch_attempt(ctx, test_id),
        )?;

        let attempt = attempt
            .ok_or_else(|| ClientError::ResultNotReady("no attempt for this test".to_string()))?;
        let score =
            score.ok_or_else(|| ClientError::ResultNotReady("attempt has not been graded".to_string()))?;

        Self::from_parts(test, score, attempt)
    }

    pub fn from_parts(
        test: AssessmentResponse,
        score: ScoreResponse,
        attempt: AttemptResponse,
    ) -> Result<Self, ClientError> {
        if attempt.status != AttemptStatus::Completed {
            return Err(ClientError::ResultNotReady(format!(
                "attempt is {}",
                attempt.status.as_str()
            )));
        }
        let end_time = attempt
            .end_time
            .ok_or_else(|| ClientError::ResultNotReady("attempt has no end time".to_string()))?;

        let elapsed_seconds = elapsed_seconds(attempt.start_time, end_time);
        let answered = attempt.submitted_answers.len();
        let average_seconds_per_answer =
            (answered > 0).then(|| elapsed_seconds as f64 / answered as f64);

        Ok(Self { test, score, attempt, elapsed_seconds, answered, average_seconds_per_answer })
    }
}
