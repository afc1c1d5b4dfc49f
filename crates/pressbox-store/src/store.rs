//! Storage trait for the news service.
//!
//! [`NewsStore`] is the seam between domain logic and persistence. The
//! operations that must be atomic (vote-and-remove, gated publish, owned
//! comment deletion) are single trait methods so each backend can wrap them
//! in whatever transaction mechanism it has, and callers never compose
//! multi-statement sequences across the seam.
//!
//! Policy stays with the caller: vote methods receive the removal threshold,
//! credibility queries receive the [`CredibilityRule`], and the gated publish
//! receives the admission decision as a closure evaluated mid-transaction.

use async_trait::async_trait;
use pressbox_common::{
    Article, ArticleDraft, Comment, CommentDraft, CredibilityRule, Player, Team, User,
};

use crate::error::StoreError;

/// Admission decision for a gated publish: `(user_credibility,
/// player_credibility)` to admit-or-not. Evaluated inside the publish
/// transaction, against figures read in that same transaction.
pub type AdmissionFn = dyn Fn(i64, Option<i64>) -> bool + Send + Sync;

/// What a downvote did to the targeted article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownvoteApplied {
    /// No article carries that id.
    NotFound,
    /// Counter bumped; the article survives with this many downvotes.
    Recorded { downvotes: i32 },
    /// Counter bumped to the removal threshold; the article and every row
    /// referencing it are gone.
    Removed,
}

/// Outcome of a gated publish, carrying the credibility figures the
/// decision was made from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateDecision {
    pub admitted: bool,
    pub user_credibility: i64,
    pub player_credibility: Option<i64>,
}

/// Outcome of an owner-checked comment deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentDelete {
    Deleted,
    NotFound,
    /// The comment exists but the requester did not write it.
    NotOwner,
}

/// Optional filters for player listings.
#[derive(Debug, Clone, Default)]
pub struct PlayerFilter {
    /// Case-insensitive substring match on the player name.
    pub name: Option<String>,
    /// Exact match on the fielding position.
    pub position: Option<String>,
}

#[async_trait]
pub trait NewsStore: Send + Sync {
    // ── votes ────────────────────────────────────────────────────────────

    /// Bump the upvote counter. Returns `false` when no such article exists.
    async fn apply_upvote(&self, article_id: i64) -> Result<bool, StoreError>;

    /// Bump the downvote counter and, if the new count reaches
    /// `removal_threshold`, remove the article and its dependents in the
    /// same transaction. At most one caller observes the removal.
    async fn apply_downvote(
        &self,
        article_id: i64,
        removal_threshold: i32,
    ) -> Result<DownvoteApplied, StoreError>;

    // ── credibility ──────────────────────────────────────────────────────

    /// Number of articles authored by `username` that satisfy `rule`.
    /// A user with no articles scores zero.
    async fn author_credibility(
        &self,
        username: &str,
        rule: &CredibilityRule,
    ) -> Result<i64, StoreError>;

    /// Number of articles linked to `player_id` that satisfy `rule`, or
    /// `None` when the player has no linked articles at all. `Some(0)` means
    /// links exist but none qualifies.
    async fn linked_credibility(
        &self,
        player_id: &str,
        rule: &CredibilityRule,
    ) -> Result<Option<i64>, StoreError>;

    // ── gated publish ────────────────────────────────────────────────────

    /// Atomically score `username` and `player_id` under `rule`, ask `admit`
    /// for a verdict, and on admission insert the article and its news link.
    /// A rejected publish writes nothing. Both credibility reads and both
    /// inserts happen in one transaction.
    async fn publish_gated(
        &self,
        username: &str,
        draft: &ArticleDraft,
        player_id: &str,
        rule: &CredibilityRule,
        admit: &AdmissionFn,
    ) -> Result<GateDecision, StoreError>;

    // ── articles ─────────────────────────────────────────────────────────

    /// Insert an ungated article with zeroed vote counters.
    async fn insert_article(&self, draft: &ArticleDraft) -> Result<(), StoreError>;

    async fn article(&self, article_id: i64) -> Result<Option<Article>, StoreError>;

    async fn list_articles(&self) -> Result<Vec<Article>, StoreError>;

    // ── comments ─────────────────────────────────────────────────────────

    async fn insert_comment(&self, draft: &CommentDraft) -> Result<(), StoreError>;

    /// Comments on an article, oldest first. An unknown article yields an
    /// empty list rather than an error.
    async fn comments_for_article(&self, article_id: i64) -> Result<Vec<Comment>, StoreError>;

    /// Delete a comment if and only if `requester` wrote it.
    async fn delete_comment(
        &self,
        comment_id: i64,
        requester: &str,
    ) -> Result<CommentDelete, StoreError>;

    // ── news links ───────────────────────────────────────────────────────

    /// Articles linked to a player, newest first.
    async fn player_news(&self, player_id: &str) -> Result<Vec<Article>, StoreError>;

    // ── users and favorites ──────────────────────────────────────────────

    async fn insert_user(&self, username: &str) -> Result<(), StoreError>;

    async fn user_with_favorites(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Delete a user. Fails with [`StoreError::StillReferenced`] while the
    /// user still has articles or comments; favorites go with the user.
    async fn delete_user(&self, username: &str) -> Result<bool, StoreError>;

    async fn add_favorite(&self, username: &str, player_id: &str) -> Result<(), StoreError>;

    async fn remove_favorite(&self, username: &str, player_id: &str)
        -> Result<bool, StoreError>;

    // ── players and teams ────────────────────────────────────────────────

    async fn insert_player(&self, player: &Player) -> Result<(), StoreError>;

    async fn list_players(&self, filter: &PlayerFilter) -> Result<Vec<Player>, StoreError>;

    async fn player(&self, player_id: &str) -> Result<Option<Player>, StoreError>;

    async fn insert_team(&self, team: &Team) -> Result<(), StoreError>;

    async fn list_teams(&self) -> Result<Vec<Team>, StoreError>;

    async fn team(&self, team_id: i32) -> Result<Option<Team>, StoreError>;
}
