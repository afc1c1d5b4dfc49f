//! The credible-article rule.
//!
//! An article is *credible* when its upvotes dominate its downvotes by a
//! fixed factor AND enough readers have commented on it. Credibility is
//! never stored: it is a pure function of the current counters and comment
//! count, recomputed on every query, so it stays consistent with whatever
//! the vote ledger has done since — including removals.

use serde::{Deserialize, Serialize};

/// Parameters of the credible-article predicate.
///
/// `Default` yields the canonical rule: `num_upvotes >= 2 * num_downvotes`
/// and strictly more than 5 comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredibilityRule {
    /// Upvotes must be at least this multiple of downvotes.
    pub upvote_factor: i32,
    /// Comment count must strictly exceed this.
    pub min_comment_count: i64,
}

impl Default for CredibilityRule {
    fn default() -> Self {
        Self {
            upvote_factor: 2,
            min_comment_count: 5,
        }
    }
}

impl CredibilityRule {
    /// Evaluate the predicate against raw counters.
    pub fn satisfied_by(&self, upvotes: i32, downvotes: i32, comment_count: i64) -> bool {
        i64::from(upvotes) >= i64::from(self.upvote_factor) * i64::from(downvotes)
            && comment_count > self.min_comment_count
    }
}
