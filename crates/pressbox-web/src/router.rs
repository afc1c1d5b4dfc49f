//! Axum router — maps all URL paths to handlers.

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{articles, players, teams, users};
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Articles, votes, comments
        .route("/articles",           get(articles::list_articles).post(articles::create_article))
        .route("/articles/with-news", post(articles::publish_with_news))
        .route("/articles/{id}",          get(articles::get_article))
        .route("/articles/{id}/upvote",   post(articles::upvote))
        .route("/articles/{id}/downvote", post(articles::downvote))
        .route("/articles/{id}/comments", get(articles::list_comments).post(articles::create_comment))
        .route("/articles/{article_id}/comments/{comment_id}", delete(articles::delete_comment))

        // Players and teams
        .route("/players",           get(players::list_players))
        .route("/players/{id}",      get(players::get_player))
        .route("/players/{id}/news", get(players::player_news))
        .route("/teams",      get(teams::list_teams))
        .route("/teams/{id}", get(teams::get_team))

        // Users and favorites
        .route("/users",            post(users::create_user))
        .route("/users/{username}", get(users::get_user).delete(users::delete_user))
        .route("/users/{username}/favorites", post(users::add_favorite))
        .route("/users/{username}/favorites/{player_id}", delete(users::remove_favorite))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
