use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentStudent;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::score::{ScoreQuery, ScoreResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(get_my_score))
}

/// The caller's score for one test. 404 until the attempt has been graded.
async fn get_my_score(
    Query(query): Query<ScoreQuery>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<ScoreResponse>, ApiError> {
    let score = repositories::scores::find_for_student(state.db(), &query.test_id, &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch score"))?
        .ok_or_else(|| ApiError::NotFound("Score not found".to_string()))?;

    Ok(Json(score.into()))
}
