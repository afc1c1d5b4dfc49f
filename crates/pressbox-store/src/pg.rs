//! PostgreSQL implementation of NewsStore.
//!
//! Multi-statement operations (downvote-and-remove, gated publish, owned
//! comment deletion) run inside a single transaction at the default
//! read-committed level. The downvote path relies on the row lock taken by
//! `UPDATE ... RETURNING`: concurrent downvoters serialize on the article
//! row, so exactly one of them sees the counter cross the threshold.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool};

use pressbox_common::{
    Article, ArticleDraft, Comment, CommentDraft, CredibilityRule, Player, Team, User,
};

use crate::error::StoreError;
use crate::schema::SCHEMA_DDL;
use crate::store::{
    AdmissionFn, CommentDelete, DownvoteApplied, GateDecision, NewsStore, PlayerFilter,
};

/// PostgreSQL-backed news store.
#[derive(Clone)]
pub struct PgNewsStore {
    pool: PgPool,
}

impl PgNewsStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    /// Connect with a bounded pool.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Create every table and index the store needs. Idempotent, so it runs
    /// on every startup.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for ddl in SCHEMA_DDL {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        tracing::debug!("news schema ensured");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl NewsStore for PgNewsStore {
    async fn apply_upvote(&self, article_id: i64) -> Result<bool, StoreError> {
        let result =
            sqlx::query("UPDATE articles SET num_upvotes = num_upvotes + 1 WHERE article_id = $1")
                .bind(article_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn apply_downvote(
        &self,
        article_id: i64,
        removal_threshold: i32,
    ) -> Result<DownvoteApplied, StoreError> {
        let mut tx = self.pool.begin().await?;

        let bumped: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE articles
            SET num_downvotes = num_downvotes + 1
            WHERE article_id = $1
            RETURNING num_downvotes
            "#,
        )
        .bind(article_id)
        .fetch_optional(&mut *tx)
        .await?;

        match bumped {
            None => {
                tx.rollback().await?;
                Ok(DownvoteApplied::NotFound)
            }
            Some(n) if n >= removal_threshold => {
                sqlx::query("DELETE FROM articles WHERE article_id = $1")
                    .bind(article_id)
                    .execute(&mut *tx)
                    .await?;
                tx.commit().await?;
                tracing::debug!(article_id, downvotes = n, "downvote crossed removal threshold");
                Ok(DownvoteApplied::Removed)
            }
            Some(n) => {
                tx.commit().await?;
                Ok(DownvoteApplied::Recorded { downvotes: n })
            }
        }
    }

    async fn author_credibility(
        &self,
        username: &str,
        rule: &CredibilityRule,
    ) -> Result<i64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(author_credibility_on(&mut conn, username, rule).await?)
    }

    async fn linked_credibility(
        &self,
        player_id: &str,
        rule: &CredibilityRule,
    ) -> Result<Option<i64>, StoreError> {
        // Two statements, so read them inside one transaction for a
        // consistent snapshot of the link set.
        let mut tx = self.pool.begin().await?;
        let figure = linked_credibility_on(&mut tx, player_id, rule).await?;
        tx.commit().await?;
        Ok(figure)
    }

    async fn publish_gated(
        &self,
        username: &str,
        draft: &ArticleDraft,
        player_id: &str,
        rule: &CredibilityRule,
        admit: &AdmissionFn,
    ) -> Result<GateDecision, StoreError> {
        let mut tx = self.pool.begin().await?;

        let user_credibility = author_credibility_on(&mut tx, username, rule).await?;
        let player_credibility = linked_credibility_on(&mut tx, player_id, rule).await?;

        if !admit(user_credibility, player_credibility) {
            tx.rollback().await?;
            return Ok(GateDecision {
                admitted: false,
                user_credibility,
                player_credibility,
            });
        }

        sqlx::query("INSERT INTO articles (article_id, headline, author) VALUES ($1, $2, $3)")
            .bind(draft.article_id)
            .bind(&draft.headline)
            .bind(&draft.author)
            .execute(&mut *tx)
            .await
            .map_err(|e| integrity(e, &format!("article {}", draft.article_id)))?;

        sqlx::query("INSERT INTO player_news (player_id, article_id) VALUES ($1, $2)")
            .bind(player_id)
            .bind(draft.article_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                integrity(e, &format!("news link {player_id} -> {}", draft.article_id))
            })?;

        tx.commit().await?;
        tracing::debug!(
            article_id = draft.article_id,
            player_id,
            user_credibility,
            "gated publish committed"
        );
        Ok(GateDecision {
            admitted: true,
            user_credibility,
            player_credibility,
        })
    }

    async fn insert_article(&self, draft: &ArticleDraft) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO articles (article_id, headline, author) VALUES ($1, $2, $3)")
            .bind(draft.article_id)
            .bind(&draft.headline)
            .bind(&draft.author)
            .execute(&self.pool)
            .await
            .map_err(|e| integrity(e, &format!("article {}", draft.article_id)))?;
        Ok(())
    }

    async fn article(&self, article_id: i64) -> Result<Option<Article>, StoreError> {
        let row = sqlx::query_as::<_, ArticleRow>(
            r#"
            SELECT article_id, headline, author, num_upvotes, num_downvotes, created_at
            FROM articles
            WHERE article_id = $1
            "#,
        )
        .bind(article_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Article::from))
    }

    async fn list_articles(&self) -> Result<Vec<Article>, StoreError> {
        let rows = sqlx::query_as::<_, ArticleRow>(
            r#"
            SELECT article_id, headline, author, num_upvotes, num_downvotes, created_at
            FROM articles
            ORDER BY article_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Article::from).collect())
    }

    async fn insert_comment(&self, draft: &CommentDraft) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO comments (comment_id, article_id, author, body) VALUES ($1, $2, $3, $4)",
        )
        .bind(draft.comment_id)
        .bind(draft.article_id)
        .bind(&draft.author)
        .bind(&draft.body)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            integrity(
                e,
                &format!("comment {} on article {}", draft.comment_id, draft.article_id),
            )
        })?;
        Ok(())
    }

    async fn comments_for_article(&self, article_id: i64) -> Result<Vec<Comment>, StoreError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT comment_id, article_id, author, body, created_at
            FROM comments
            WHERE article_id = $1
            ORDER BY comment_id
            "#,
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn delete_comment(
        &self,
        comment_id: i64,
        requester: &str,
    ) -> Result<CommentDelete, StoreError> {
        let mut tx = self.pool.begin().await?;

        let author: Option<String> =
            sqlx::query_scalar("SELECT author FROM comments WHERE comment_id = $1 FOR UPDATE")
                .bind(comment_id)
                .fetch_optional(&mut *tx)
                .await?;

        let outcome = match author.as_deref() {
            None => CommentDelete::NotFound,
            Some(a) if a != requester => CommentDelete::NotOwner,
            Some(_) => {
                sqlx::query("DELETE FROM comments WHERE comment_id = $1")
                    .bind(comment_id)
                    .execute(&mut *tx)
                    .await?;
                CommentDelete::Deleted
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }

    async fn player_news(&self, player_id: &str) -> Result<Vec<Article>, StoreError> {
        let rows = sqlx::query_as::<_, ArticleRow>(
            r#"
            SELECT a.article_id, a.headline, a.author,
                   a.num_upvotes, a.num_downvotes, a.created_at
            FROM player_news pn
            JOIN articles a USING (article_id)
            WHERE pn.player_id = $1
            ORDER BY a.created_at DESC, a.article_id DESC
            "#,
        )
        .bind(player_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Article::from).collect())
    }

    async fn insert_user(&self, username: &str) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO users (username) VALUES ($1)")
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(|e| integrity(e, &format!("user {username}")))?;
        Ok(())
    }

    async fn user_with_favorites(&self, username: &str) -> Result<Option<User>, StoreError> {
        let known: Option<String> =
            sqlx::query_scalar("SELECT username FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        let Some(username) = known else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, PlayerRow>(
            r#"
            SELECT p.player_id, p.player_name, p.player_age, p.team_id, p.position
            FROM favorites f
            JOIN players p USING (player_id)
            WHERE f.username = $1
            ORDER BY p.player_name, p.player_id
            "#,
        )
        .bind(&username)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(User {
            username,
            favorites: rows.into_iter().map(Player::from).collect(),
        }))
    }

    async fn delete_user(&self, username: &str) -> Result<bool, StoreError> {
        // Favorites cascade with the user; authored articles and comments do
        // not, and their foreign keys make the delete fail instead.
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(|e| match pg_code(&e).as_deref() {
                Some(FOREIGN_KEY_VIOLATION) => StoreError::StillReferenced(format!(
                    "user {username} still has articles or comments"
                )),
                _ => StoreError::Backend(e),
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_favorite(&self, username: &str, player_id: &str) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO favorites (username, player_id) VALUES ($1, $2)")
            .bind(username)
            .bind(player_id)
            .execute(&self.pool)
            .await
            .map_err(|e| integrity(e, &format!("favorite {username} -> {player_id}")))?;
        Ok(())
    }

    async fn remove_favorite(
        &self,
        username: &str,
        player_id: &str,
    ) -> Result<bool, StoreError> {
        let result =
            sqlx::query("DELETE FROM favorites WHERE username = $1 AND player_id = $2")
                .bind(username)
                .bind(player_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_player(&self, player: &Player) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO players (player_id, player_name, player_age, team_id, position)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&player.player_id)
        .bind(&player.player_name)
        .bind(player.player_age)
        .bind(player.team_id)
        .bind(&player.position)
        .execute(&self.pool)
        .await
        .map_err(|e| integrity(e, &format!("player {}", player.player_id)))?;
        Ok(())
    }

    async fn list_players(&self, filter: &PlayerFilter) -> Result<Vec<Player>, StoreError> {
        let rows = sqlx::query_as::<_, PlayerRow>(
            r#"
            SELECT player_id, player_name, player_age, team_id, position
            FROM players
            WHERE ($1::TEXT IS NULL OR player_name ILIKE '%' || $1 || '%')
              AND ($2::TEXT IS NULL OR position = $2)
            ORDER BY player_name, player_id
            "#,
        )
        .bind(filter.name.as_deref())
        .bind(filter.position.as_deref())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Player::from).collect())
    }

    async fn player(&self, player_id: &str) -> Result<Option<Player>, StoreError> {
        let row = sqlx::query_as::<_, PlayerRow>(
            r#"
            SELECT player_id, player_name, player_age, team_id, position
            FROM players
            WHERE player_id = $1
            "#,
        )
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Player::from))
    }

    async fn insert_team(&self, team: &Team) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO teams (team_id, team_name) VALUES ($1, $2)")
            .bind(team.team_id)
            .bind(&team.team_name)
            .execute(&self.pool)
            .await
            .map_err(|e| integrity(e, &format!("team {}", team.team_id)))?;
        Ok(())
    }

    async fn list_teams(&self) -> Result<Vec<Team>, StoreError> {
        let rows =
            sqlx::query_as::<_, TeamRow>("SELECT team_id, team_name FROM teams ORDER BY team_id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Team::from).collect())
    }

    async fn team(&self, team_id: i32) -> Result<Option<Team>, StoreError> {
        let row =
            sqlx::query_as::<_, TeamRow>("SELECT team_id, team_name FROM teams WHERE team_id = $1")
                .bind(team_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Team::from))
    }
}

// ── Credibility aggregates ───────────────────────────────────────────────────

/// Articles by `username` that pass the rule: vote ratio checked per article,
/// comment volume via a strict HAVING over the join.
async fn author_credibility_on(
    conn: &mut PgConnection,
    username: &str,
    rule: &CredibilityRule,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM (
            SELECT a.article_id
            FROM articles a
            JOIN comments c USING (article_id)
            WHERE a.author = $1
              AND a.num_upvotes >= $2 * a.num_downvotes
            GROUP BY a.article_id
            HAVING COUNT(*) > $3
        ) AS credible
        "#,
    )
    .bind(username)
    .bind(rule.upvote_factor)
    .bind(rule.min_comment_count)
    .fetch_one(conn)
    .await
}

/// Credible articles among those linked to `player_id`, or `None` when the
/// player has no links at all. The distinction matters: no links means
/// unvetted, links-but-zero-credible means vetted and found wanting.
async fn linked_credibility_on(
    conn: &mut PgConnection,
    player_id: &str,
    rule: &CredibilityRule,
) -> Result<Option<i64>, sqlx::Error> {
    let linked: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM player_news WHERE player_id = $1")
        .bind(player_id)
        .fetch_one(&mut *conn)
        .await?;
    if linked == 0 {
        return Ok(None);
    }

    let credible: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM (
            SELECT pn.article_id
            FROM player_news pn
            JOIN articles a USING (article_id)
            JOIN comments c USING (article_id)
            WHERE pn.player_id = $1
              AND a.num_upvotes >= $2 * a.num_downvotes
            GROUP BY pn.article_id
            HAVING COUNT(*) > $3
        ) AS credible
        "#,
    )
    .bind(player_id)
    .bind(rule.upvote_factor)
    .bind(rule.min_comment_count)
    .fetch_one(&mut *conn)
    .await?;
    Ok(Some(credible))
}

// ── Integrity error mapping ──────────────────────────────────────────────────

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

fn pg_code(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) => db.code().map(|c| c.into_owned()),
        _ => None,
    }
}

/// Map constraint violations raised by an insert to the storage taxonomy.
fn integrity(err: sqlx::Error, what: &str) -> StoreError {
    match pg_code(&err).as_deref() {
        Some(UNIQUE_VIOLATION) => StoreError::Duplicate(format!("{what} already exists")),
        Some(FOREIGN_KEY_VIOLATION) => {
            StoreError::MissingReference(format!("{what} references a missing row"))
        }
        _ => StoreError::Backend(err),
    }
}

// ── Internal sqlx row mapping ────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct ArticleRow {
    article_id: i64,
    headline: String,
    author: String,
    num_upvotes: i32,
    num_downvotes: i32,
    created_at: DateTime<Utc>,
}

impl From<ArticleRow> for Article {
    fn from(r: ArticleRow) -> Self {
        Article {
            article_id: r.article_id,
            headline: r.headline,
            author: r.author,
            num_upvotes: r.num_upvotes,
            num_downvotes: r.num_downvotes,
            created_at: r.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    comment_id: i64,
    article_id: i64,
    author: String,
    body: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(r: CommentRow) -> Self {
        Comment {
            comment_id: r.comment_id,
            article_id: r.article_id,
            author: r.author,
            body: r.body,
            created_at: r.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PlayerRow {
    player_id: String,
    player_name: String,
    player_age: i32,
    team_id: i32,
    position: String,
}

impl From<PlayerRow> for Player {
    fn from(r: PlayerRow) -> Self {
        Player {
            player_id: r.player_id,
            player_name: r.player_name,
            player_age: r.player_age,
            team_id: r.team_id,
            position: r.position,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TeamRow {
    team_id: i32,
    team_name: String,
}

impl From<TeamRow> for Team {
    fn from(r: TeamRow) -> Self {
        Team {
            team_id: r.team_id,
            team_name: r.team_name,
        }
    }
}
