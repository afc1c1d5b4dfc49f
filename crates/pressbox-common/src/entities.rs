/// Core entity types mirroring the relational schema.
/// Identifiers are caller-assigned: article and comment ids are integers,
/// player ids and usernames are strings, team ids are small integers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Article
// ---------------------------------------------------------------------------

/// A published news article with its vote ledger counters.
///
/// Counters never go negative; an article whose `num_downvotes` reaches the
/// removal threshold is deleted outright, so no persisted row ever carries a
/// breached counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub article_id: i64,
    pub headline: String,
    pub author: String,
    pub num_upvotes: i32,
    pub num_downvotes: i32,
    pub created_at: DateTime<Utc>,
}

/// Input for publishing a new article. Counters always start at zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleDraft {
    pub article_id: i64,
    pub headline: String,
    pub author: String,
}

// ---------------------------------------------------------------------------
// Comment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: i64,
    pub article_id: i64,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Input for adding a comment to an existing article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDraft {
    pub comment_id: i64,
    pub article_id: i64,
    pub author: String,
    pub body: String,
}

// ---------------------------------------------------------------------------
// Player / Team
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub player_id: String,
    pub player_name: String,
    pub player_age: i32,
    pub team_id: i32,
    pub position: String, // e.g. QB, RB, WR, TE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub team_id: i32,
    pub team_name: String,
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A user account together with their favorite players.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub favorites: Vec<Player>,
}
