use std::sync::Arc;

use crate::visualizer::generator::Visualizer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Read-only after startup; shared by every request task.
    pub visualizer: Arc<Visualizer>,
}
