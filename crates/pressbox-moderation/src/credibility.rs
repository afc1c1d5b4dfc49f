//! Credibility scoring for users and players.
//!
//! An article counts as credible when its upvotes hold at or above twice its
//! downvotes and more than five comments sit under it. A user's credibility
//! is the number of credible articles they have authored. A player's
//! credibility is the number of credible articles linked to them, and is
//! absent entirely for a player no article has ever covered. Absent and
//! zero are different verdicts: unvetted versus vetted and found wanting.

use std::sync::Arc;

use pressbox_common::CredibilityRule;
use pressbox_store::{NewsStore, StoreError};

/// Computes credibility figures from live store contents. Figures are never
/// cached; every read reflects the votes and comments at call time, so a
/// removal or a fresh comment shows up in the very next score.
#[derive(Clone)]
pub struct CredibilityScorer {
    store: Arc<dyn NewsStore>,
    rule: CredibilityRule,
}

impl CredibilityScorer {
    pub fn new(store: Arc<dyn NewsStore>) -> Self {
        Self {
            store,
            rule: CredibilityRule::default(),
        }
    }

    pub fn with_rule(store: Arc<dyn NewsStore>, rule: CredibilityRule) -> Self {
        Self { store, rule }
    }

    pub fn rule(&self) -> &CredibilityRule {
        &self.rule
    }

    /// Credible articles authored by `username`. A user with no articles
    /// scores zero; the figure never goes negative.
    pub async fn user_credibility(&self, username: &str) -> Result<i64, StoreError> {
        self.store.author_credibility(username, &self.rule).await
    }

    /// Credible articles linked to `player_id`, or `None` when nothing was
    /// ever linked.
    pub async fn player_credibility(&self, player_id: &str) -> Result<Option<i64>, StoreError> {
        self.store.linked_credibility(player_id, &self.rule).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressbox_common::{ArticleDraft, CommentDraft, Player, Team};
    use pressbox_store::MemoryNewsStore;

    async fn seed(store: &MemoryNewsStore) {
        store.insert_user("ana").await.unwrap();
        store.insert_user("crowd").await.unwrap();
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

    async fn publish(store: &MemoryNewsStore, article_id: i64, author: &str) {
        store
            .insert_article(&ArticleDraft {
                article_id,
                headline: format!("Story {article_id}"),
                author: author.to_string(),
            })
            .await
            .unwrap();
    }

    async fn comment_n(store: &MemoryNewsStore, article_id: i64, count: i64) {
        let existing = store.comments_for_article(article_id).await.unwrap().len() as i64;
        for i in 0..count {
            store
                .insert_comment(&CommentDraft {
                    comment_id: article_id * 1000 + existing + i,
                    article_id,
                    author: "crowd".to_string(),
                    body: "take".to_string(),
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_user_with_no_articles_scores_zero() {
        let store = Arc::new(MemoryNewsStore::new());
        seed(&store).await;
        let scorer = CredibilityScorer::new(store);
        assert_eq!(scorer.user_credibility("ana").await.unwrap(), 0);
        assert_eq!(scorer.user_credibility("nobody").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_comment_volume_gate_is_strict() {
        let store = Arc::new(MemoryNewsStore::new());
        seed(&store).await;
        let scorer = CredibilityScorer::new(store.clone());

        publish(&store, 1, "ana").await;
        comment_n(&store, 1, 5).await;
        assert_eq!(
            scorer.user_credibility("ana").await.unwrap(),
            0,
            "exactly five comments must not count"
        );

        comment_n(&store, 1, 1).await;
        assert_eq!(scorer.user_credibility("ana").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_vote_ratio_boundary() {
        let store = Arc::new(MemoryNewsStore::new());
        seed(&store).await;
        let scorer = CredibilityScorer::new(store.clone());

        publish(&store, 1, "ana").await;
        comment_n(&store, 1, 6).await;
        for _ in 0..10 {
            store.apply_upvote(1).await.unwrap();
        }
        for _ in 0..4 {
            store.apply_downvote(1, i32::MAX).await.unwrap();
        }
        // 10 upvotes against 4 downvotes clears the ratio.
        assert_eq!(scorer.user_credibility("ana").await.unwrap(), 1);

        // A fifth downvote lands exactly on the 10 >= 10 boundary, which
        // still qualifies. The sixth breaks it.
        store.apply_downvote(1, i32::MAX).await.unwrap();
        assert_eq!(scorer.user_credibility("ana").await.unwrap(), 1);
        store.apply_downvote(1, i32::MAX).await.unwrap();
        assert_eq!(scorer.user_credibility("ana").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_user_credibility_counts_each_credible_article() {
        let store = Arc::new(MemoryNewsStore::new());
        seed(&store).await;
        let scorer = CredibilityScorer::new(store.clone());

        publish(&store, 1, "ana").await;
        comment_n(&store, 1, 6).await;
        assert_eq!(scorer.user_credibility("ana").await.unwrap(), 1);

        publish(&store, 2, "ana").await;
        comment_n(&store, 2, 6).await;
        assert_eq!(scorer.user_credibility("ana").await.unwrap(), 2);

        // A third article that never draws comments adds nothing.
        publish(&store, 3, "ana").await;
        assert_eq!(scorer.user_credibility("ana").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_player_credibility_absent_until_first_link() {
        let store = Arc::new(MemoryNewsStore::new());
        seed(&store).await;
        let scorer = CredibilityScorer::new(store.clone());

        assert_eq!(scorer.player_credibility("p-100").await.unwrap(), None);

        store
            .publish_gated(
                "ana",
                &ArticleDraft {
                    article_id: 1,
                    headline: "First coverage".to_string(),
                    author: "ana".to_string(),
                },
                "p-100",
                scorer.rule(),
                &|_, _| true,
            )
            .await
            .unwrap();

        // Linked but not credible yet: zero, not absent.
        assert_eq!(scorer.player_credibility("p-100").await.unwrap(), Some(0));

        comment_n(&store, 1, 6).await;
        assert_eq!(scorer.player_credibility("p-100").await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_removal_feeds_back_into_scores() {
        let store = Arc::new(MemoryNewsStore::new());
        seed(&store).await;
        let scorer = CredibilityScorer::new(store.clone());

        store
            .publish_gated(
                "ana",
                &ArticleDraft {
                    article_id: 1,
                    headline: "Soon buried".to_string(),
                    author: "ana".to_string(),
                },
                "p-100",
                scorer.rule(),
                &|_, _| true,
            )
            .await
            .unwrap();
        comment_n(&store, 1, 6).await;
        for _ in 0..12 {
            store.apply_upvote(1).await.unwrap();
        }
        assert_eq!(scorer.user_credibility("ana").await.unwrap(), 1);
        assert_eq!(scorer.player_credibility("p-100").await.unwrap(), Some(1));

        for _ in 0..5 {
            store.apply_downvote(1, 5).await.unwrap();
        }
        assert_eq!(scorer.user_credibility("ana").await.unwrap(), 0);
        assert_eq!(
            scorer.player_credibility("p-100").await.unwrap(),
            None,
            "removing the only linked article leaves the player unvetted again"
        );
    }
}
