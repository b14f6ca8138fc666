use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::api::assessments::fetch_assessment;
use crate::api::errors::ApiError;
use crate::api::guards::CurrentStudent;
use crate::core::metrics;
use crate::core::state::AppState;
use crate::core::time::{format_offset, now_utc};
use crate::db::models::{Assessment, Attempt};
use crate::db::types::AttemptStatus;
use crate::repositories;
use crate::schemas::attempt::{AttemptAnswersRequest, AttemptResponse};
use crate::services::attempt_timing::{self, accepts_submission};
use crate::services::grading;

fn duration_of(assessment: &Assessment) -> Result<i32, ApiError> {
    attempt_timing::validate_duration(assessment.duration_minutes)
        .map_err(|issue| ApiError::UnprocessableEntity(issue.to_string()))
}

fn ensure_in_progress(attempt: &Attempt) -> Result<(), ApiError> {
    match attempt.status {
        AttemptStatus::InProgress => Ok(()),
        AttemptStatus::Completed => Err(ApiError::Conflict("Attempt already submitted".to_string())),
        AttemptStatus::Expired => Err(ApiError::Conflict("Attempt has expired".to_string())),
    }
}

/// Marks an overdue attempt expired, with its deadline as the end time.
async fn expire_if_overdue(
    executor: impl sqlx::PgExecutor<'_>,
    attempt: Attempt,
    duration_minutes: i32,
    now: OffsetDateTime,
    grace_seconds: u64,
) -> Result<Attempt, ApiError> {
    if attempt.status != AttemptStatus::InProgress
        || accepts_submission(attempt.started_at, duration_minutes, now, grace_seconds)
    {
        return Ok(attempt);
    }

    let deadline = attempt_timing::deadline(attempt.started_at, duration_minutes);
    let expired = repositories::attempts::expire(executor, &attempt.id, deadline)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to expire attempt"))?;

    match expired {
        Some(expired) => {
            metrics::attempts_expired(1);
            tracing::info!(
                attempt_id = %expired.id,
                test_id = %expired.assessment_id,
                student_id = %expired.student_id,
                deadline = %format_offset(deadline),
                "Attempt expired on read"
            );
            Ok(expired)
        }
        None => Ok(attempt),
    }
}

pub(crate) async fn get_attempt(
    Path(test_id): Path<String>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<AttemptResponse>, ApiError> {
    let assessment = fetch_assessment(state.db(), &test_id).await?;

    let attempt = repositories::attempts::find_for_student(state.db(), &test_id, &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch attempt"))?
        .ok_or_else(|| ApiError::NotFound("No attempt for this test".to_string()))?;

    let attempt = match attempt_timing::validate_duration(assessment.duration_minutes) {
        Ok(duration) => {
            expire_if_overdue(
                state.db(),
                attempt,
                duration,
                now_utc(),
                state.submit_grace_seconds(),
            )
            .await?
        }
        Err(_) => attempt,
    };

    Ok(Json(attempt.into()))
}

pub(crate) async fn start_attempt(
    Path(test_id): Path<String>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<AttemptResponse>), ApiError> {
    let assessment = fetch_assessment(state.db(), &test_id).await?;

    let window = attempt_timing::start_window(
        assessment.duration_minutes,
        assessment.scheduled_date,
        assessment.start_time,
        assessment.end_time,
    )
    .map_err(|issue| ApiError::UnprocessableEntity(issue.to_string()))?;

    let now = now_utc();
    if now < window.opens_at {
        return Err(ApiError::BadRequest("Test has not opened yet".to_string()));
    }
    if now > window.closes_at {
        return Err(ApiError::BadRequest("Test window has closed".to_string()));
    }

    let attempt_id = Uuid::new_v4().to_string();
    let created = repositories::attempts::create(
        state.db(),
        repositories::attempts::CreateAttempt {
            id: &attempt_id,
            assessment_id: &assessment.id,
            student_id: &student.id,
            started_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create attempt"))?;

    let Some(attempt) = created else {
        return Err(ApiError::Conflict("An attempt already exists for this test".to_string()));
    };

    metrics::attempt_started();
    tracing::info!(
        attempt_id = %attempt.id,
        test_id = %attempt.assessment_id,
        student_id = %student.id,
        started_at = %format_offset(attempt.started_at),
        "Attempt started"
    );

    Ok((StatusCode::CREATED, Json(attempt.into())))
}

pub(crate) async fn submit_attempt(
    Path(test_id): Path<String>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Json(payload): Json<AttemptAnswersRequest>,
) -> Result<Json<AttemptResponse>, ApiError> {
    let assessment = fetch_assessment(state.db(), &test_id).await?;
    let duration = duration_of(&assessment)?;
    let grace_seconds = state.submit_grace_seconds();

    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let attempt = repositories::attempts::lock_for_student(&mut *tx, &test_id, &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch attempt"))?
        .ok_or_else(|| ApiError::NotFound("No attempt for this test".to_string()))?;
    if let Err(err) = ensure_in_progress(&attempt) {
        metrics::submission_rejected(attempt.status.as_str());
        return Err(err);
    }

    let now = now_utc();
    let attempt = expire_if_overdue(&mut *tx, attempt, duration, now, grace_seconds).await?;
    if attempt.status == AttemptStatus::Expired {
        tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;
        metrics::submission_rejected("past-deadline");
        return Err(ApiError::BadRequest("Submission deadline has passed".to_string()));
    }

    let completed =
        repositories::attempts::complete(&mut *tx, &attempt.id, &payload.submitted_answers, now)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to submit attempt"))?
            .ok_or_else(|| ApiError::Conflict("Attempt already submitted".to_string()))?;

    let questions = repositories::questions::list_by_assessment(&mut *tx, &test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch questions"))?;
    let summary = grading::grade(&assessment, &questions, &completed.submitted_answers.0);
    let score = grading::score_for(&completed, summary, now);
    repositories::scores::insert(&mut *tx, &score)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to store score"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    let late = now > attempt_timing::deadline(completed.started_at, duration);
    metrics::attempt_submitted(late);
    tracing::info!(
        attempt_id = %completed.id,
        test_id = %test_id,
        student_id = %student.id,
        answers = completed.submitted_answers.0.len(),
        obtained_marks = summary.obtained_marks,
        passed = summary.passed,
        late,
        "Attempt submitted and graded"
    );

    Ok(Json(completed.into()))
}

pub(crate) async fn save_progress(
    Path(test_id): Path<String>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Json(payload): Json<AttemptAnswersRequest>,
) -> Result<Json<AttemptResponse>, ApiError> {
    let assessment = fetch_assessment(state.db(), &test_id).await?;
    let duration = duration_of(&assessment)?;

    let attempt = repositories::attempts::find_for_student(state.db(), &test_id, &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch attempt"))?
        .ok_or_else(|| ApiError::NotFound("No attempt for this test".to_string()))?;
    ensure_in_progress(&attempt)?;

    let now = now_utc();
    let deadline = attempt_timing::deadline(attempt.started_at, duration);
    if now > deadline {
        return Err(ApiError::BadRequest("Attempt time is over".to_string()));
    }

    let saved =
        repositories::attempts::save_progress(state.db(), &attempt.id, &payload.submitted_answers, now)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to save progress"))?
            .ok_or_else(|| ApiError::Conflict("Attempt is no longer in progress".to_string()))?;

    tracing::debug!(
        attempt_id = %saved.id,
        test_id = %test_id,
        answers = saved.submitted_answers.0.len(),
        "Attempt progress saved"
    );

    Ok(Json(saved.into()))
}
