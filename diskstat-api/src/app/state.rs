use diskstat_core::StatsProvider;
use std::sync::Arc;

/// Shared application state for handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub stats: Arc<StatsProvider>,
}
