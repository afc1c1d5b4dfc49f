//! Admission control for player-linked articles.
//!
//! Linking an article to a player is a claim about that player, so the
//! author's track record has to measure up to the coverage already on file.
//! A player nobody has written about admits anyone. Otherwise the author's
//! credibility must reach the player's; ties admit. Refusals write nothing
//! and are reported without detail to the caller's audience, though the
//! figures behind the verdict are kept for logs and tests.

use std::sync::Arc;

use pressbox_common::ArticleDraft;
use pressbox_store::{NewsStore, StoreError};

use crate::credibility::CredibilityScorer;

/// Outcome of a gated publish attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Article and news link were written.
    Admitted,
    /// Nothing was written. Carries the figures the refusal was based on.
    Rejected {
        user_credibility: i64,
        player_credibility: Option<i64>,
    },
}

/// Gates article-with-link publication on author credibility.
#[derive(Clone)]
pub struct CredibleLinkGate {
    store: Arc<dyn NewsStore>,
    scorer: CredibilityScorer,
}

impl CredibleLinkGate {
    pub fn new(store: Arc<dyn NewsStore>, scorer: CredibilityScorer) -> Self {
        Self { store, scorer }
    }

    /// The admission rule, on its own for table tests: an unvetted player
    /// admits anyone; a vetted one requires the author to match their
    /// figure, ties included.
    pub fn admits(user_credibility: i64, player_credibility: Option<i64>) -> bool {
        match player_credibility {
            None => true,
            Some(player) => user_credibility >= player,
        }
    }

    /// Publish `draft` linked to `player_id`, judging admission on
    /// `username`'s track record. Scoring and writes share one store
    /// transaction, so the figures can never include the article they are
    /// deciding about, and a refusal leaves no trace in the data.
    pub async fn publish_and_link(
        &self,
        username: &str,
        draft: &ArticleDraft,
        player_id: &str,
    ) -> Result<GateOutcome, StoreError> {
        let decision = self
            .store
            .publish_gated(username, draft, player_id, self.scorer.rule(), &Self::admits)
            .await?;

        if decision.admitted {
            tracing::info!(
                article_id = draft.article_id,
                player_id,
                author = username,
                "gated publish admitted"
            );
            Ok(GateOutcome::Admitted)
        } else {
            tracing::info!(
                article_id = draft.article_id,
                player_id,
                author = username,
                user_credibility = decision.user_credibility,
                player_credibility = ?decision.player_credibility,
                "gated publish rejected"
            );
            Ok(GateOutcome::Rejected {
                user_credibility: decision.user_credibility,
                player_credibility: decision.player_credibility,
            })
        }
    }
}
