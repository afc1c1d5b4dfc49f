//! Table definitions for the news schema.
//!
//! Statements are ordered so every foreign key targets a table created
//! earlier in the list. Comments and news links cascade when their article
//! goes; favorites cascade when their user goes. Authorship never cascades,
//! so deleting a user with surviving articles or comments is refused by the
//! database rather than silently orphaning rows.

pub(crate) const SCHEMA_DDL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        username TEXT PRIMARY KEY
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS teams (
        team_id   INT  PRIMARY KEY,
        team_name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS players (
        player_id   TEXT PRIMARY KEY,
        player_name TEXT NOT NULL,
        player_age  INT  NOT NULL,
        team_id     INT  NOT NULL REFERENCES teams(team_id),
        position    TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        article_id    BIGINT PRIMARY KEY,
        headline      TEXT   NOT NULL,
        author        TEXT   NOT NULL REFERENCES users(username),
        num_upvotes   INT    NOT NULL DEFAULT 0,
        num_downvotes INT    NOT NULL DEFAULT 0,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        comment_id BIGINT PRIMARY KEY,
        article_id BIGINT NOT NULL REFERENCES articles(article_id) ON DELETE CASCADE,
        author     TEXT   NOT NULL REFERENCES users(username),
        body       TEXT   NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS player_news (
        player_id  TEXT   NOT NULL REFERENCES players(player_id),
        article_id BIGINT NOT NULL REFERENCES articles(article_id) ON DELETE CASCADE,
        PRIMARY KEY (player_id, article_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS favorites (
        username  TEXT NOT NULL REFERENCES users(username) ON DELETE CASCADE,
        player_id TEXT NOT NULL REFERENCES players(player_id),
        PRIMARY KEY (username, player_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_articles_author ON articles(author)",
    "CREATE INDEX IF NOT EXISTS idx_comments_article ON comments(article_id)",
    "CREATE INDEX IF NOT EXISTS idx_player_news_article ON player_news(article_id)",
];
