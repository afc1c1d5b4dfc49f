//! In-memory implementation of NewsStore.
//!
//! Backs tests and local development. One mutex guards the whole state and
//! every operation takes it exactly once, so each trait call is atomic and
//! calls are fully serialized. Error messages and result ordering mirror the
//! PostgreSQL backend, letting callers swap the two without behavioral
//! surprises.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use pressbox_common::{
    Article, ArticleDraft, Comment, CommentDraft, CredibilityRule, Player, Team, User,
};

use crate::error::StoreError;
use crate::store::{
    AdmissionFn, CommentDelete, DownvoteApplied, GateDecision, NewsStore, PlayerFilter,
};

#[derive(Default)]
struct MemoryState {
    users: HashSet<String>,
    teams: BTreeMap<i32, Team>,
    players: BTreeMap<String, Player>,
    articles: BTreeMap<i64, Article>,
    comments: BTreeMap<i64, Comment>,
    /// (player_id, article_id)
    news_links: BTreeSet<(String, i64)>,
    /// (username, player_id)
    favorites: BTreeSet<(String, String)>,
}

impl MemoryState {
    fn comment_count(&self, article_id: i64) -> i64 {
        self.comments
            .values()
            .filter(|c| c.article_id == article_id)
            .count() as i64
    }

    fn is_credible(&self, article: &Article, rule: &CredibilityRule) -> bool {
        rule.satisfied_by(
            article.num_upvotes,
            article.num_downvotes,
            self.comment_count(article.article_id),
        )
    }

    fn author_credibility(&self, username: &str, rule: &CredibilityRule) -> i64 {
        self.articles
            .values()
            .filter(|a| a.author == username && self.is_credible(a, rule))
            .count() as i64
    }

    fn linked_credibility(&self, player_id: &str, rule: &CredibilityRule) -> Option<i64> {
        let linked: Vec<i64> = self
            .news_links
            .iter()
            .filter(|(p, _)| p.as_str() == player_id)
            .map(|(_, article_id)| *article_id)
            .collect();
        if linked.is_empty() {
            return None;
        }
        let credible = linked
            .iter()
            .filter_map(|id| self.articles.get(id))
            .filter(|a| self.is_credible(a, rule))
            .count() as i64;
        Some(credible)
    }

    /// The validation an article insert would trip on, in the order the
    /// PostgreSQL backend hits its constraints.
    fn article_insert_error(&self, draft: &ArticleDraft) -> Option<StoreError> {
        if self.articles.contains_key(&draft.article_id) {
            return Some(StoreError::Duplicate(format!(
                "article {} already exists",
                draft.article_id
            )));
        }
        if !self.users.contains(&draft.author) {
            return Some(StoreError::MissingReference(format!(
                "article {} references a missing row",
                draft.article_id
            )));
        }
        None
    }

    fn put_article(&mut self, draft: &ArticleDraft) {
        self.articles.insert(
            draft.article_id,
            Article {
                article_id: draft.article_id,
                headline: draft.headline.clone(),
                author: draft.author.clone(),
                num_upvotes: 0,
                num_downvotes: 0,
                created_at: Utc::now(),
            },
        );
    }

    fn remove_article(&mut self, article_id: i64) {
        self.articles.remove(&article_id);
        self.comments.retain(|_, c| c.article_id != article_id);
        self.news_links.retain(|(_, a)| *a != article_id);
    }
}

/// Shared in-memory news store. Clones share the same state.
#[derive(Clone, Default)]
pub struct MemoryNewsStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryNewsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NewsStore for MemoryNewsStore {
    async fn apply_upvote(&self, article_id: i64) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        match state.articles.get_mut(&article_id) {
            Some(article) => {
                article.num_upvotes += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn apply_downvote(
        &self,
        article_id: i64,
        removal_threshold: i32,
    ) -> Result<DownvoteApplied, StoreError> {
        let mut state = self.state.lock().await;
        let Some(article) = state.articles.get_mut(&article_id) else {
            return Ok(DownvoteApplied::NotFound);
        };
        article.num_downvotes += 1;
        let downvotes = article.num_downvotes;
        if downvotes >= removal_threshold {
            state.remove_article(article_id);
            Ok(DownvoteApplied::Removed)
        } else {
            Ok(DownvoteApplied::Recorded { downvotes })
        }
    }

    async fn author_credibility(
        &self,
        username: &str,
        rule: &CredibilityRule,
    ) -> Result<i64, StoreError> {
        let state = self.state.lock().await;
        Ok(state.author_credibility(username, rule))
    }

    async fn linked_credibility(
        &self,
        player_id: &str,
        rule: &CredibilityRule,
    ) -> Result<Option<i64>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.linked_credibility(player_id, rule))
    }

    async fn publish_gated(
        &self,
        username: &str,
        draft: &ArticleDraft,
        player_id: &str,
        rule: &CredibilityRule,
        admit: &AdmissionFn,
    ) -> Result<GateDecision, StoreError> {
        let mut state = self.state.lock().await;

        let user_credibility = state.author_credibility(username, rule);
        let player_credibility = state.linked_credibility(player_id, rule);

        if !admit(user_credibility, player_credibility) {
            return Ok(GateDecision {
                admitted: false,
                user_credibility,
                player_credibility,
            });
        }

        if let Some(err) = state.article_insert_error(draft) {
            return Err(err);
        }
        if !state.players.contains_key(player_id) {
            return Err(StoreError::MissingReference(format!(
                "news link {player_id} -> {} references a missing row",
                draft.article_id
            )));
        }
        state.put_article(draft);
        state
            .news_links
            .insert((player_id.to_string(), draft.article_id));

        Ok(GateDecision {
            admitted: true,
            user_credibility,
            player_credibility,
        })
    }

    async fn insert_article(&self, draft: &ArticleDraft) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if let Some(err) = state.article_insert_error(draft) {
            return Err(err);
        }
        state.put_article(draft);
        Ok(())
    }

    async fn article(&self, article_id: i64) -> Result<Option<Article>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.articles.get(&article_id).cloned())
    }

    async fn list_articles(&self) -> Result<Vec<Article>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.articles.values().cloned().collect())
    }

    async fn insert_comment(&self, draft: &CommentDraft) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if state.comments.contains_key(&draft.comment_id) {
            return Err(StoreError::Duplicate(format!(
                "comment {} on article {} already exists",
                draft.comment_id, draft.article_id
            )));
        }
        if !state.articles.contains_key(&draft.article_id) || !state.users.contains(&draft.author)
        {
            return Err(StoreError::MissingReference(format!(
                "comment {} on article {} references a missing row",
                draft.comment_id, draft.article_id
            )));
        }
        state.comments.insert(
            draft.comment_id,
            Comment {
                comment_id: draft.comment_id,
                article_id: draft.article_id,
                author: draft.author.clone(),
                body: draft.body.clone(),
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn comments_for_article(&self, article_id: i64) -> Result<Vec<Comment>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .comments
            .values()
            .filter(|c| c.article_id == article_id)
            .cloned()
            .collect())
    }

    async fn delete_comment(
        &self,
        comment_id: i64,
        requester: &str,
    ) -> Result<CommentDelete, StoreError> {
        let mut state = self.state.lock().await;
        let Some(comment) = state.comments.get(&comment_id) else {
            return Ok(CommentDelete::NotFound);
        };
        if comment.author != requester {
            return Ok(CommentDelete::NotOwner);
        }
        state.comments.remove(&comment_id);
        Ok(CommentDelete::Deleted)
    }

    async fn player_news(&self, player_id: &str) -> Result<Vec<Article>, StoreError> {
        let state = self.state.lock().await;
        let mut articles: Vec<Article> = state
            .news_links
            .iter()
            .filter(|(p, _)| p.as_str() == player_id)
            .filter_map(|(_, id)| state.articles.get(id))
            .cloned()
            .collect();
        articles.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.article_id.cmp(&a.article_id))
        });
        Ok(articles)
    }

    async fn insert_user(&self, username: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if !state.users.insert(username.to_string()) {
            return Err(StoreError::Duplicate(format!("user {username} already exists")));
        }
        Ok(())
    }

    async fn user_with_favorites(&self, username: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.lock().await;
        if !state.users.contains(username) {
            return Ok(None);
        }
        let mut favorites: Vec<Player> = state
            .favorites
            .iter()
            .filter(|(u, _)| u.as_str() == username)
            .filter_map(|(_, p)| state.players.get(p))
            .cloned()
            .collect();
        favorites.sort_by(|a, b| {
            a.player_name
                .cmp(&b.player_name)
                .then(a.player_id.cmp(&b.player_id))
        });
        Ok(Some(User {
            username: username.to_string(),
            favorites,
        }))
    }

    async fn delete_user(&self, username: &str) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        if !state.users.contains(username) {
            return Ok(false);
        }
        let referenced = state.articles.values().any(|a| a.author == username)
            || state.comments.values().any(|c| c.author == username);
        if referenced {
            return Err(StoreError::StillReferenced(format!(
                "user {username} still has articles or comments"
            )));
        }
        state.favorites.retain(|(u, _)| u.as_str() != username);
        state.users.remove(username);
        Ok(true)
    }

    async fn add_favorite(&self, username: &str, player_id: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if !state.users.contains(username) || !state.players.contains_key(player_id) {
            return Err(StoreError::MissingReference(format!(
                "favorite {username} -> {player_id} references a missing row"
            )));
        }
        if !state
            .favorites
            .insert((username.to_string(), player_id.to_string()))
        {
            return Err(StoreError::Duplicate(format!(
                "favorite {username} -> {player_id} already exists"
            )));
        }
        Ok(())
    }

    async fn remove_favorite(
        &self,
        username: &str,
        player_id: &str,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        Ok(state
            .favorites
            .remove(&(username.to_string(), player_id.to_string())))
    }

    async fn insert_player(&self, player: &Player) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if state.players.contains_key(&player.player_id) {
            return Err(StoreError::Duplicate(format!(
                "player {} already exists",
                player.player_id
            )));
        }
        if !state.teams.contains_key(&player.team_id) {
            return Err(StoreError::MissingReference(format!(
                "player {} references a missing row",
                player.player_id
            )));
        }
        state.players.insert(player.player_id.clone(), player.clone());
        Ok(())
    }

    async fn list_players(&self, filter: &PlayerFilter) -> Result<Vec<Player>, StoreError> {
        let state = self.state.lock().await;
        let name = filter.name.as_deref().map(str::to_lowercase);
        let mut players: Vec<Player> = state
            .players
            .values()
            .filter(|p| {
                name.as_deref()
                    .map_or(true, |n| p.player_name.to_lowercase().contains(n))
            })
            .filter(|p| {
                filter
                    .position
                    .as_deref()
                    .map_or(true, |pos| p.position == pos)
            })
            .cloned()
            .collect();
        players.sort_by(|a, b| {
            a.player_name
                .cmp(&b.player_name)
                .then(a.player_id.cmp(&b.player_id))
        });
        Ok(players)
    }

    async fn player(&self, player_id: &str) -> Result<Option<Player>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.players.get(player_id).cloned())
    }

    async fn insert_team(&self, team: &Team) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if state.teams.contains_key(&team.team_id) {
            return Err(StoreError::Duplicate(format!(
                "team {} already exists",
                team.team_id
            )));
        }
        state.teams.insert(team.team_id, team.clone());
        Ok(())
    }

    async fn list_teams(&self) -> Result<Vec<Team>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.teams.values().cloned().collect())
    }

    async fn team(&self, team_id: i32) -> Result<Option<Team>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.teams.get(&team_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIT_ALL: &AdmissionFn = &|_, _| true;

    fn rule() -> CredibilityRule {
        CredibilityRule::default()
    }

    fn draft(article_id: i64, author: &str) -> ArticleDraft {
        ArticleDraft {
            article_id,
            headline: format!("Headline {article_id}"),
            author: author.to_string(),
        }
    }

    async fn seed_basics(store: &MemoryNewsStore) {
        store.insert_user("ana").await.unwrap();
        store.insert_user("ben").await.unwrap();
        store
            .insert_team(&Team {
                team_id: 1,
                team_name: "Harbor City Nine".to_string(),
            })
            .await
            .unwrap();
        store
            .insert_player(&Player {
                player_id: "p-100".to_string(),
                player_name: "Sam Alvarez".to_string(),
                player_age: 27,
                team_id: 1,
                position: "SS".to_string(),
            })
            .await
            .unwrap();
    }

    async fn add_comments(store: &MemoryNewsStore, article_id: i64, first_id: i64, count: i64) {
        for i in 0..count {
            store
                .insert_comment(&CommentDraft {
                    comment_id: first_id + i,
                    article_id,
                    author: "ben".to_string(),
                    body: "hot take".to_string(),
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_duplicate_article_rejected() {
        let store = MemoryNewsStore::new();
        seed_basics(&store).await;

        store.insert_article(&draft(1, "ana")).await.unwrap();
        let err = store.insert_article(&draft(1, "ana")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_comment_requires_article_and_author() {
        let store = MemoryNewsStore::new();
        seed_basics(&store).await;

        let orphan = CommentDraft {
            comment_id: 1,
            article_id: 404,
            author: "ana".to_string(),
            body: "where is this".to_string(),
        };
        let err = store.insert_comment(&orphan).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingReference(_)));
    }

    #[tokio::test]
    async fn test_vote_on_missing_article() {
        let store = MemoryNewsStore::new();
        assert!(!store.apply_upvote(999).await.unwrap());
        assert_eq!(
            store.apply_downvote(999, 5).await.unwrap(),
            DownvoteApplied::NotFound
        );
    }

    #[tokio::test]
    async fn test_downvote_removal_cascades() {
        let store = MemoryNewsStore::new();
        seed_basics(&store).await;
        store
            .publish_gated("ana", &draft(1, "ana"), "p-100", &rule(), ADMIT_ALL)
            .await
            .unwrap();
        add_comments(&store, 1, 10, 3).await;

        for expected in 1..5 {
            assert_eq!(
                store.apply_downvote(1, 5).await.unwrap(),
                DownvoteApplied::Recorded { downvotes: expected }
            );
        }
        assert_eq!(
            store.apply_downvote(1, 5).await.unwrap(),
            DownvoteApplied::Removed
        );

        assert!(store.article(1).await.unwrap().is_none());
        assert!(store.comments_for_article(1).await.unwrap().is_empty());
        assert!(store.player_news("p-100").await.unwrap().is_empty());
        assert_eq!(store.linked_credibility("p-100", &rule()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_linked_credibility_none_vs_zero() {
        let store = MemoryNewsStore::new();
        seed_basics(&store).await;

        assert_eq!(store.linked_credibility("p-100", &rule()).await.unwrap(), None);

        store
            .publish_gated("ana", &draft(1, "ana"), "p-100", &rule(), ADMIT_ALL)
            .await
            .unwrap();
        // Linked but uncommented, so the article is not credible.
        assert_eq!(
            store.linked_credibility("p-100", &rule()).await.unwrap(),
            Some(0)
        );
    }

    #[tokio::test]
    async fn test_rejected_publish_writes_nothing() {
        let store = MemoryNewsStore::new();
        seed_basics(&store).await;

        let decision = store
            .publish_gated("ana", &draft(1, "ana"), "p-100", &rule(), &|_, _| false)
            .await
            .unwrap();
        assert!(!decision.admitted);
        assert!(store.article(1).await.unwrap().is_none());
        assert!(store.player_news("p-100").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_author_credibility_counts_only_qualifying_articles() {
        let store = MemoryNewsStore::new();
        seed_basics(&store).await;

        // Qualifies: six comments, clean vote ratio.
        store.insert_article(&draft(1, "ana")).await.unwrap();
        add_comments(&store, 1, 10, 6).await;

        // Fails the ratio: a lone downvote on a never-upvoted article.
        store.insert_article(&draft(2, "ana")).await.unwrap();
        add_comments(&store, 2, 20, 6).await;
        store.apply_downvote(2, 5).await.unwrap();

        // Fails the comment volume.
        store.insert_article(&draft(3, "ana")).await.unwrap();
        add_comments(&store, 3, 30, 3).await;

        assert_eq!(store.author_credibility("ana", &rule()).await.unwrap(), 1);
        assert_eq!(store.author_credibility("ben", &rule()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_comment_deletion_is_owner_only() {
        let store = MemoryNewsStore::new();
        seed_basics(&store).await;
        store.insert_article(&draft(1, "ana")).await.unwrap();
        store
            .insert_comment(&CommentDraft {
                comment_id: 7,
                article_id: 1,
                author: "ana".to_string(),
                body: "mine".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(
            store.delete_comment(7, "ben").await.unwrap(),
            CommentDelete::NotOwner
        );
        assert_eq!(
            store.delete_comment(7, "ana").await.unwrap(),
            CommentDelete::Deleted
        );
        assert_eq!(
            store.delete_comment(7, "ana").await.unwrap(),
            CommentDelete::NotFound
        );
    }

    #[tokio::test]
    async fn test_delete_user_blocked_while_referenced() {
        let store = MemoryNewsStore::new();
        seed_basics(&store).await;
        store.insert_article(&draft(1, "ana")).await.unwrap();

        let err = store.delete_user("ana").await.unwrap_err();
        assert!(matches!(err, StoreError::StillReferenced(_)));

        assert!(store.delete_user("ben").await.unwrap());
        assert!(!store.delete_user("nobody").await.unwrap());
    }

    #[tokio::test]
    async fn test_favorites_roundtrip() {
        let store = MemoryNewsStore::new();
        seed_basics(&store).await;

        store.add_favorite("ana", "p-100").await.unwrap();
        let user = store.user_with_favorites("ana").await.unwrap().unwrap();
        assert_eq!(user.favorites.len(), 1);
        assert_eq!(user.favorites[0].player_id, "p-100");

        let err = store.add_favorite("ana", "p-100").await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));

        assert!(store.remove_favorite("ana", "p-100").await.unwrap());
        assert!(!store.remove_favorite("ana", "p-100").await.unwrap());
    }

    #[tokio::test]
    async fn test_player_listing_filters() {
        let store = MemoryNewsStore::new();
        seed_basics(&store).await;
        store
            .insert_player(&Player {
                player_id: "p-200".to_string(),
                player_name: "Jordan Vance".to_string(),
                player_age: 31,
                team_id: 1,
                position: "C".to_string(),
            })
            .await
            .unwrap();

        let by_name = store
            .list_players(&PlayerFilter {
                name: Some("ALVA".to_string()),
                position: None,
            })
            .await
            .unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].player_id, "p-100");

        let by_position = store
            .list_players(&PlayerFilter {
                name: None,
                position: Some("C".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(by_position.len(), 1);
        assert_eq!(by_position[0].player_id, "p-200");

        let all = store.list_players(&PlayerFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
