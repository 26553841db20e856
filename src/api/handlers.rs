//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, warn};

use crate::{
    dispatch::{HotkeyAction, UiMessage},
    state::AppState,
};
use super::responses::{ActionResponse, HealthResponse, StatusResponse};

fn post_action(state: &AppState, action: &str, message: UiMessage) -> Result<Json<ActionResponse>, StatusCode> {
    match state.post(action, message) {
        Ok(()) => Ok(Json(ActionResponse::accepted(action))),
        Err(e) => {
            error!("Failed to post {}: {}", action, e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Handle POST /hotkey/:action - Deliver a hotkey press
pub async fn hotkey_handler(
    State(state): State<Arc<AppState>>,
    Path(action): Path<String>,
) -> Result<Json<ActionResponse>, StatusCode> {
    let Some(hotkey) = HotkeyAction::from_name(&action) else {
        warn!("Unknown hotkey action: {}", action);
        return Err(StatusCode::NOT_FOUND);
    };

    post_action(&state, &format!("hotkey-{}", action), UiMessage::Hotkey(hotkey))
}

/// Handle POST /countdown/start - Start the activation countdown
pub async fn countdown_start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ActionResponse>, StatusCode> {
    post_action(&state, "countdown-start", UiMessage::StartCountdown)
}

/// Handle POST /countdown/stop - Cancel the activation countdown
pub async fn countdown_stop_handler(State(state): State<Arc<AppState>>) -> Result<Json<ActionResponse>, StatusCode> {
    post_action(&state, "countdown-stop", UiMessage::StopCountdown)
}

/// Handle POST /auto-restore/on
pub async fn auto_restore_on_handler(State(state): State<Arc<AppState>>) -> Json<ActionResponse> {
    state.set_auto_restore(true);
    Json(ActionResponse::accepted("auto-restore-on"))
}

/// Handle POST /auto-restore/off
pub async fn auto_restore_off_handler(State(state): State<Arc<AppState>>) -> Json<ActionResponse> {
    state.set_auto_restore(false);
    Json(ActionResponse::accepted("auto-restore-off"))
}

/// Handle POST /restore-target/clear - Dismiss the pending restore
pub async fn restore_target_clear_handler(State(state): State<Arc<AppState>>) -> Result<Json<ActionResponse>, StatusCode> {
    post_action(&state, "restore-target-clear", UiMessage::ClearRestoreTarget)
}

/// Handle GET /status - Return the controller snapshot
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        controller: state.get_snapshot(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
