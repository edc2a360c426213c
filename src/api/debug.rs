//! Destructive helpers for local development. Only mounted when
//! `ENABLE_DEBUG_ROUTES` is set.

use axum::{Extension, Json, extract::State};
use serde_json::{Value, json};
use tracing::error;

use crate::api::{AppState, SessionId, SessionInvalidated};

pub async fn clear_all_tokens(State(state): State<AppState>) -> Json<Value> {
    if let Err(e) = state.manager.clear_all_tokens().await {
        error!("Failed to clear tokens: {e}");
    }

    Json(json!({ "success": true, "message": "All tokens cleared" }))
}

pub async fn force_unauthorized(
    State(state): State<AppState>,
    session: SessionId,
) -> (Extension<SessionInvalidated>, Json<Value>) {
    if let Err(e) = state.manager.logout(session.as_str()).await {
        error!("Failed to delete tokens on forced logout: {e}");
    }

    (
        Extension(SessionInvalidated),
        Json(json!({ "success": true, "message": "Forced logout" })),
    )
}
