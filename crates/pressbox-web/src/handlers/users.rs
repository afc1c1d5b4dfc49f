//! User accounts and favorite players.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use pressbox_common::ApiError;

use crate::state::SharedState;

#[derive(Deserialize)]
pub struct NewUser {
    pub username: String,
}

#[derive(Deserialize)]
pub struct NewFavorite {
    pub player_id: String,
}

/// POST /users
pub async fn create_user(
    State(state): State<SharedState>,
    Json(body): Json<NewUser>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.insert_user(&body.username).await?;
    Ok(StatusCode::CREATED)
}

/// GET /users/{username} - profile with favorite players
pub async fn get_user(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .store
        .user_with_favorites(&username)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no user {username}")))?;
    Ok(Json(user))
}

/// DELETE /users/{username} - refused while the user still has articles or
/// comments on record
pub async fn delete_user(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if state.store.delete_user(&username).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("no user {username}")))
    }
}

/// POST /users/{username}/favorites
pub async fn add_favorite(
    State(state): State<SharedState>,
    Path(username): Path<String>,
    Json(body): Json<NewFavorite>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.add_favorite(&username, &body.player_id).await?;
    Ok(StatusCode::CREATED)
}

/// DELETE /users/{username}/favorites/{player_id}
pub async fn remove_favorite(
    State(state): State<SharedState>,
    Path((username, player_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    if state.store.remove_favorite(&username, &player_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!(
            "no favorite {username} -> {player_id}"
        )))
    }
}
