//! Articles: intake, votes, comments, and the gated news-link publish.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use pressbox_common::{ApiError, ArticleDraft, CommentDraft};
use pressbox_moderation::VoteOutcome;
use pressbox_store::CommentDelete;

use crate::state::SharedState;

// === Request bodies ===

#[derive(Deserialize)]
pub struct NewArticle {
    pub article_id: i64,
    pub headline: String,
    pub author: String,
}

impl NewArticle {
    fn into_draft(self) -> ArticleDraft {
        ArticleDraft {
            article_id: self.article_id,
            headline: self.headline,
            author: self.author,
        }
    }
}

#[derive(Deserialize)]
pub struct NewComment {
    pub comment_id: i64,
    pub author: String,
    pub body: String,
}

#[derive(Deserialize)]
pub struct CommentAuthor {
    pub username: String,
}

#[derive(Deserialize)]
pub struct GatedPublish {
    pub username: String,
    pub player_id: String,
    pub article: NewArticle,
}

// === Endpoints ===

/// GET /articles - every article, id order
pub async fn list_articles(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    let articles = state.store.list_articles().await?;
    Ok(Json(articles))
}

/// GET /articles/{id}
pub async fn get_article(
    State(state): State<SharedState>,
    Path(article_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let article = state
        .store
        .article(article_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no article {article_id}")))?;
    Ok(Json(article))
}

/// POST /articles - plain publish, no news link
pub async fn create_article(
    State(state): State<SharedState>,
    Json(body): Json<NewArticle>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.insert_article(&body.into_draft()).await?;
    Ok(StatusCode::CREATED)
}

/// POST /articles/{id}/upvote
pub async fn upvote(
    State(state): State<SharedState>,
    Path(article_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    match state.ledger.upvote(article_id).await? {
        VoteOutcome::NotFound => Err(ApiError::NotFound(format!("no article {article_id}"))),
        _ => Ok(StatusCode::NO_CONTENT),
    }
}

/// POST /articles/{id}/downvote - a removal answers the same as a recorded
/// vote; the article is simply gone afterwards
pub async fn downvote(
    State(state): State<SharedState>,
    Path(article_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    match state.ledger.downvote(article_id).await? {
        VoteOutcome::NotFound => Err(ApiError::NotFound(format!("no article {article_id}"))),
        _ => Ok(StatusCode::NO_CONTENT),
    }
}

/// GET /articles/{id}/comments - oldest first
pub async fn list_comments(
    State(state): State<SharedState>,
    Path(article_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let comments = state.store.comments_for_article(article_id).await?;
    Ok(Json(comments))
}

/// POST /articles/{id}/comments
pub async fn create_comment(
    State(state): State<SharedState>,
    Path(article_id): Path<i64>,
    Json(body): Json<NewComment>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = CommentDraft {
        comment_id: body.comment_id,
        article_id,
        author: body.author,
        body: body.body,
    };
    state.store.insert_comment(&draft).await?;
    Ok(StatusCode::CREATED)
}

/// DELETE /articles/{article_id}/comments/{comment_id}?username= - owner only
pub async fn delete_comment(
    State(state): State<SharedState>,
    Path((_article_id, comment_id)): Path<(i64, i64)>,
    Query(who): Query<CommentAuthor>,
) -> Result<impl IntoResponse, ApiError> {
    match state.store.delete_comment(comment_id, &who.username).await? {
        CommentDelete::Deleted => Ok(StatusCode::NO_CONTENT),
        CommentDelete::NotFound => {
            Err(ApiError::NotFound(format!("no comment {comment_id}")))
        }
        CommentDelete::NotOwner => Err(ApiError::Forbidden(format!(
            "comment {comment_id} belongs to another user"
        ))),
    }
}

/// POST /articles/with-news - publish an article linked to a player, subject
/// to the credibility gate. The response never reveals the verdict; an
/// admitted and a rejected publish answer identically.
pub async fn publish_with_news(
    State(state): State<SharedState>,
    Json(body): Json<GatedPublish>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = body.article.into_draft();
    state
        .gate
        .publish_and_link(&body.username, &draft, &body.player_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
