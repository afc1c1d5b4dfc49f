//! Vote intake and downvote-driven removal.
//!
//! Every article carries two monotonic counters. Upvotes only ever climb.
//! Downvotes climb until they reach [`DOWNVOTE_REMOVAL_THRESHOLD`], at which
//! point the article is removed outright together with its comments and
//! news links. Removal is part of the same store operation as the counter
//! bump, so no article is ever observable at the threshold.

use std::sync::Arc;

use pressbox_store::{DownvoteApplied, NewsStore, StoreError};

/// Downvote count at which an article is removed.
pub const DOWNVOTE_REMOVAL_THRESHOLD: i32 = 5;

/// What a recorded vote did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Vote landed; the article survives.
    Recorded,
    /// The downvote pushed the article to the removal threshold and it is
    /// gone, dependents included.
    Removed,
    /// No article carries that id.
    NotFound,
}

/// Applies votes and enforces the removal threshold.
#[derive(Clone)]
pub struct VoteLedger {
    store: Arc<dyn NewsStore>,
}

impl VoteLedger {
    pub fn new(store: Arc<dyn NewsStore>) -> Self {
        Self { store }
    }

    pub async fn upvote(&self, article_id: i64) -> Result<VoteOutcome, StoreError> {
        if self.store.apply_upvote(article_id).await? {
            tracing::debug!(article_id, "upvote recorded");
            Ok(VoteOutcome::Recorded)
        } else {
            Ok(VoteOutcome::NotFound)
        }
    }

    /// Record a downvote. Under concurrent downvoting the store serializes
    /// the counter bump, so exactly one caller observes the removal and
    /// later callers find nothing.
    pub async fn downvote(&self, article_id: i64) -> Result<VoteOutcome, StoreError> {
        match self
            .store
            .apply_downvote(article_id, DOWNVOTE_REMOVAL_THRESHOLD)
            .await?
        {
            DownvoteApplied::NotFound => Ok(VoteOutcome::NotFound),
            DownvoteApplied::Recorded { downvotes } => {
                tracing::debug!(article_id, downvotes, "downvote recorded");
                Ok(VoteOutcome::Recorded)
            }
            DownvoteApplied::Removed => {
                tracing::info!(article_id, "article removed at downvote threshold");
                Ok(VoteOutcome::Removed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressbox_common::ArticleDraft;
    use pressbox_store::MemoryNewsStore;

    async fn store_with_article(article_id: i64) -> Arc<MemoryNewsStore> {
        let store = Arc::new(MemoryNewsStore::new());
        store.insert_user("ana").await.unwrap();
        store
            .insert_article(&ArticleDraft {
                article_id,
                headline: "Trade rumors heat up".to_string(),
                author: "ana".to_string(),
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_upvotes_accumulate_without_removal() {
        let store = store_with_article(1).await;
        let ledger = VoteLedger::new(store.clone());

        for _ in 0..20 {
            assert_eq!(ledger.upvote(1).await.unwrap(), VoteOutcome::Recorded);
        }
        let article = store.article(1).await.unwrap().unwrap();
        assert_eq!(article.num_upvotes, 20);
        assert_eq!(article.num_downvotes, 0);
    }

    #[tokio::test]
    async fn test_downvotes_below_threshold_keep_article() {
        let store = store_with_article(1).await;
        let ledger = VoteLedger::new(store.clone());

        for _ in 0..4 {
            assert_eq!(ledger.downvote(1).await.unwrap(), VoteOutcome::Recorded);
        }
        let article = store.article(1).await.unwrap().unwrap();
        assert_eq!(article.num_downvotes, 4);
    }

    #[tokio::test]
    async fn test_fifth_downvote_removes_article() {
        let store = store_with_article(1).await;
        let ledger = VoteLedger::new(store.clone());

        for _ in 0..4 {
            ledger.downvote(1).await.unwrap();
        }
        assert_eq!(ledger.downvote(1).await.unwrap(), VoteOutcome::Removed);
        assert!(store.article(1).await.unwrap().is_none());
        assert_eq!(ledger.downvote(1).await.unwrap(), VoteOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_upvotes_do_not_soften_removal() {
        let store = store_with_article(1).await;
        let ledger = VoteLedger::new(store.clone());

        // A pile of upvotes has no bearing on the downvote counter.
        for _ in 0..100 {
            ledger.upvote(1).await.unwrap();
        }
        for _ in 0..4 {
            assert_eq!(ledger.downvote(1).await.unwrap(), VoteOutcome::Recorded);
        }
        assert_eq!(ledger.downvote(1).await.unwrap(), VoteOutcome::Removed);
    }

    #[tokio::test]
    async fn test_votes_on_missing_article() {
        let store = Arc::new(MemoryNewsStore::new());
        let ledger = VoteLedger::new(store);
        assert_eq!(ledger.upvote(42).await.unwrap(), VoteOutcome::NotFound);
        assert_eq!(ledger.downvote(42).await.unwrap(), VoteOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_concurrent_downvotes_remove_exactly_once() {
        let store = store_with_article(1).await;
        let ledger = VoteLedger::new(store.clone());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move { ledger.downvote(1).await.unwrap() }));
        }

        let mut recorded = 0;
        let mut removed = 0;
        let mut not_found = 0;
        for handle in handles {
            match handle.await.unwrap() {
                VoteOutcome::Recorded => recorded += 1,
                VoteOutcome::Removed => removed += 1,
                VoteOutcome::NotFound => not_found += 1,
            }
        }

        assert_eq!(removed, 1, "exactly one voter must observe the removal");
        assert_eq!(recorded, 4);
        assert_eq!(not_found, 3);
        assert!(store.article(1).await.unwrap().is_none());
    }
}
