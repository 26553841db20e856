//! HTTP API module
//!
//! Local control surface: hotkeys, countdown, auto-restore, restore target and status.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/hotkey/:action", post(hotkey_handler))
        .route("/countdown/start", post(countdown_start_handler))
        .route("/countdown/stop", post(countdown_stop_handler))
        .route("/auto-restore/on", post(auto_restore_on_handler))
        .route("/auto-restore/off", post(auto_restore_off_handler))
        .route("/restore-target/clear", post(restore_target_clear_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
