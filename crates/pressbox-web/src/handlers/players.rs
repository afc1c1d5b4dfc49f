//! Player roster reads and per-player news feeds.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use pressbox_common::ApiError;
use pressbox_store::PlayerFilter;

use crate::state::SharedState;

#[derive(Deserialize, Default)]
pub struct PlayerQuery {
    pub name: Option<String>,
    pub position: Option<String>,
}

/// GET /players - optional name/position filters
pub async fn list_players(
    State(state): State<SharedState>,
    Query(query): Query<PlayerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = PlayerFilter {
        name: query.name,
        position: query.position,
    };
    let players = state.store.list_players(&filter).await?;
    Ok(Json(players))
}

/// GET /players/{id}
pub async fn get_player(
    State(state): State<SharedState>,
    Path(player_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let player = state
        .store
        .player(&player_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no player {player_id}")))?;
    Ok(Json(player))
}

/// GET /players/{id}/news - linked articles, newest first. A player nobody
/// has covered yields an empty list, unknown ids included.
pub async fn player_news(
    State(state): State<SharedState>,
    Path(player_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let articles = state.store.player_news(&player_id).await?;
    Ok(Json(articles))
}
