//! pressbox-moderation — Vote handling, credibility scoring, and the
//! credible-link admission gate.

pub mod credibility;
pub mod gate;
pub mod ledger;

pub use credibility::CredibilityScorer;
pub use gate::{CredibleLinkGate, GateOutcome};
pub use ledger::{VoteLedger, VoteOutcome, DOWNVOTE_REMOVAL_THRESHOLD};
