use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use super::handlers::{get_disk_stats, handler_404, health};
use super::state::AppState;

/// Build the router with routes and middleware wired.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/disk", get(get_disk_stats))
        .fallback(handler_404)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
