//! pressbox-web — HTTP boundary for the Pressbox news service.

pub mod config;
pub mod handlers;
pub mod router;
pub mod state;
