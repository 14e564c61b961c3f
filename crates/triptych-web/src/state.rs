//! Application state for the web service.

use std::sync::Arc;
use triptych_agents::Orchestrator;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The agent pipeline, shared across request handlers.
    pub orchestrator: Arc<Orchestrator>,
    /// Result count used when a query does not ask for one.
    pub default_top_k: usize,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, default_top_k: usize) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            default_top_k,
        }
    }
}
