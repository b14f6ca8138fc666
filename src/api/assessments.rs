use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::attempts;
use crate::api::errors::ApiError;
use crate::api::guards::{CurrentStaff, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::now_utc;
use crate::db::models::Assessment;
use crate::repositories;
use crate::schemas::assessment::{
    AssessmentCreate, AssessmentCreated, AssessmentResponse, QuestionResponse,
};
use crate::schemas::score::ScoreResponse;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_assessment))
        .route("/:test_id", get(get_assessment))
        .route("/:test_id/questions", get(list_questions))
        .route("/:test_id/scores", get(list_scores))
        .route("/:test_id/attempts", get(attempts::get_attempt))
        .route("/:test_id/attempts/start", post(attempts::start_attempt))
        .route("/:test_id/attempts/submit", put(attempts::submit_attempt))
        .route("/:test_id/attempts/progress", put(attempts::save_progress))
}

pub(crate) async fn fetch_assessment(
    pool: &sqlx::PgPool,
    test_id: &str,
) -> Result<Assessment, ApiError> {
    repositories::assessments::find_by_id(pool, test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch test"))?
        .ok_or_else(|| ApiError::NotFound("Test not found".to_string()))
}

async fn get_assessment(
    Path(test_id): Path<String>,
    _user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<AssessmentResponse>, ApiError> {
    let assessment = fetch_assessment(state.db(), &test_id).await?;
    Ok(Json(assessment.into()))
}

async fn list_questions(
    Path(test_id): Path<String>,
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<QuestionResponse>>, ApiError> {
    fetch_assessment(state.db(), &test_id).await?;

    let questions = repositories::questions::list_by_assessment(state.db(), &test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch questions"))?;

    let reveal_key = user.capabilities.see_answer_keys;
    Ok(Json(
        questions
            .into_iter()
            .map(|question| QuestionResponse::from_model(question, reveal_key))
            .collect(),
    ))
}

async fn list_scores(
    Path(test_id): Path<String>,
    CurrentStaff(_staff): CurrentStaff,
    State(state): State<AppState>,
) -> Result<Json<Vec<ScoreResponse>>, ApiError> {
    fetch_assessment(state.db(), &test_id).await?;

    let scores = repositories::scores::list_by_assessment(state.db(), &test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch scores"))?;

    Ok(Json(scores.into_iter().map(ScoreResponse::from).collect()))
}

async fn create_assessment(
    CurrentStaff(staff): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<AssessmentCreate>,
) -> Result<(StatusCode, Json<AssessmentCreated>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    if let Some(problem) = payload.questions.iter().find_map(|question| question.shape_error()) {
        return Err(ApiError::BadRequest(problem));
    }
    if payload.passing_marks > payload.total_marks {
        return Err(ApiError::BadRequest("passingMarks cannot exceed totalMarks".to_string()));
    }

    let now = now_utc();
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let assessment_id = Uuid::new_v4().to_string();
    let assessment = repositories::assessments::create(
        &mut *tx,
        repositories::assessments::CreateAssessment {
            id: &assessment_id,
            title: &payload.title,
            subject: &payload.subject,
            class_id: &payload.class_id,
            total_marks: payload.total_marks,
            passing_marks: payload.passing_marks,
            duration_minutes: payload.duration_minutes,
            scheduled_date: payload.scheduled_date,
            start_time: payload.start_time,
            end_time: payload.end_time,
            created_by: &staff.id,
            created_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create test"))?;

    for (position, question) in payload.questions.iter().enumerate() {
        let question_id = Uuid::new_v4().to_string();
        repositories::questions::create(
            &mut *tx,
            repositories::questions::CreateQuestion {
                id: &question_id,
                assessment_id: &assessment.id,
                kind: question.kind,
                text: &question.text,
                marks: question.marks,
                position: position as i32,
                options: question.options.clone(),
                correct_option: question.correct_option.as_deref(),
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create question"))?;
    }

    let questions = repositories::questions::list_by_assessment(&mut *tx, &assessment.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch questions"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    tracing::info!(
        test_id = %assessment.id,
        created_by = %staff.id,
        role = staff.role.as_str(),
        questions = questions.len(),
        "Test created"
    );

    Ok((
        StatusCode::CREATED,
        Json(AssessmentCreated {
            assessment: assessment.into(),
            questions: questions
                .into_iter()
                .map(|question| QuestionResponse::from_model(question, true))
                .collect(),
        }),
    ))
}
