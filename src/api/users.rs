use axum::{Json, extract::State};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::payloads::{CreateUserRequest, JsonOrForm};
use crate::api::server::AppState;
use crate::db::{Store, User};

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    JsonOrForm(payload): JsonOrForm<CreateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .store
        .insert_user(&payload.username)
        .await
        .map_err(ApiError::internal("Error creating user"))?;

    info!(user_id = %user.id, username = %user.username, "created user");
    Ok(Json(user))
}

/// Lists every user. An empty collection answers 404 rather than `[]`.
pub async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state
        .store
        .list_users()
        .await
        .map_err(ApiError::internal("Error fetching users"))?;

    if users.is_empty() {
        return Err(ApiError::NotFound("No users found".to_string()));
    }
    Ok(Json(users))
}

/// Looks up the user a nested route refers to. Identifiers that are not
/// UUIDs cannot name a stored user and are reported as not found.
pub async fn require_user(
    store: &dyn Store,
    id: &str,
    failure: &'static str,
) -> Result<User, ApiError> {
    if Uuid::parse_str(id).is_err() {
        debug!(user_id = id, "malformed user id");
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    match store.find_user(id).await.map_err(ApiError::internal(failure))? {
        Some(user) => Ok(user),
        None => {
            debug!(user_id = id, "unknown user");
            Err(ApiError::NotFound("User not found".to_string()))
        }
    }
}
