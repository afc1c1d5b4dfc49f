//! pressbox-store — Persistence for articles, votes, comments, and rosters.

pub mod error;
pub mod memory;
pub mod pg;
pub mod store;

mod schema;

pub use error::StoreError;
pub use memory::MemoryNewsStore;
pub use pg::PgNewsStore;
pub use store::{
    AdmissionFn, CommentDelete, DownvoteApplied, GateDecision, NewsStore, PlayerFilter,
};
