//! Request handlers, grouped by resource.

pub mod articles;
pub mod players;
pub mod teams;
pub mod users;
