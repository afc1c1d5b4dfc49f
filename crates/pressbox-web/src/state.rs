//! Shared application state for the web server.

use std::sync::Arc;

use pressbox_moderation::{CredibilityScorer, CredibleLinkGate, VoteLedger};
use pressbox_store::NewsStore;

/// Shared state injected into every Axum handler. The moderation components
/// all see the same store the plumbing handlers use.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn NewsStore>,
    pub ledger: VoteLedger,
    pub gate: CredibleLinkGate,
}

impl AppState {
    pub fn new(store: Arc<dyn NewsStore>) -> Self {
        let ledger = VoteLedger::new(store.clone());
        let scorer = CredibilityScorer::new(store.clone());
        let gate = CredibleLinkGate::new(store.clone(), scorer);
        Self { store, ledger, gate }
    }
}

pub type SharedState = Arc<AppState>;
