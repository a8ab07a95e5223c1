// ABOUTME: Shared state handed to every request handler.
// ABOUTME: Just the orchestrator; everything else lives inside it.

use std::sync::Arc;

use crate::deploy::Orchestrator;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}
