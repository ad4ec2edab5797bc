use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use std::sync::Arc;
use tracing::info;

use crate::api::error::ApiError;
use crate::api::payloads::{AddExerciseRequest, ExerciseResponse, JsonOrForm, LogParams};
use crate::api::server::AppState;
use crate::api::users::require_user;
use crate::db::NewExercise;
use crate::engine::dates::{display_date, today};
use crate::engine::log_query::{LogQuery, LogResponse};

const SAVE_FAILED: &str = "Error saving exercise";
const LOGS_FAILED: &str = "Error fetching exercise logs";

/// Like the logs route, the user is resolved before the body is validated.
pub async fn add_exercise(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    body: Result<JsonOrForm<AddExerciseRequest>, ApiError>,
) -> Result<Json<ExerciseResponse>, ApiError> {
    let user = require_user(state.store.as_ref(), &user_id, SAVE_FAILED).await?;
    let JsonOrForm(payload) = body?;

    if payload.description.trim().is_empty() {
        return Err(ApiError::BadRequest("description is required".to_string()));
    }

    let exercise = state
        .store
        .insert_exercise(NewExercise {
            user_id: user.id.clone(),
            description: payload.description,
            duration: payload.duration,
            date: payload.date.unwrap_or_else(today),
        })
        .await
        .map_err(ApiError::internal(SAVE_FAILED))?;

    info!(user_id = %user.id, exercise_id = %exercise.id, "saved exercise");

    Ok(Json(ExerciseResponse {
        id: user.id,
        username: user.username,
        date: display_date(exercise.date),
        duration: exercise.duration,
        description: exercise.description,
    }))
}

/// The user is resolved before the query string is validated, so an unknown
/// user is reported as such whatever parameters came with it.
pub async fn list_logs(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    params: Result<Query<LogParams>, QueryRejection>,
) -> Result<Json<LogResponse>, ApiError> {
    let user = require_user(state.store.as_ref(), &user_id, LOGS_FAILED).await?;

    let Query(params) = params.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let response = LogQuery::build(&user.id, params.from, params.to, params.limit.as_deref())
        .run(state.store.as_ref(), &user)
        .await
        .map_err(ApiError::internal(LOGS_FAILED))?;

    Ok(Json(response))
}
