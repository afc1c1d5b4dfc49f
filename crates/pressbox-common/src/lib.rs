//! pressbox-common — Shared types, errors, and rules used across all Pressbox crates.

pub mod credibility;
pub mod entities;
pub mod error;

// Re-export commonly used types
pub use credibility::CredibilityRule;
pub use entities::{Article, ArticleDraft, Comment, CommentDraft, Player, Team, User};
pub use error::ApiError;
