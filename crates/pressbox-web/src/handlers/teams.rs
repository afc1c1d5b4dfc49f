//! Team roster reads.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

use pressbox_common::ApiError;

use crate::state::SharedState;

/// GET /teams
pub async fn list_teams(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let teams = state.store.list_teams().await?;
    Ok(Json(teams))
}

/// GET /teams/{id}
pub async fn get_team(
    State(state): State<SharedState>,
    Path(team_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let team = state
        .store
        .team(team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no team {team_id}")))?;
    Ok(Json(team))
}
