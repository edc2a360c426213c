use axum::{extract::State, response::Json};
use serde_json::{Value, json};

use crate::api::AppState;

/// Liveness probe. Also reports whether the token store answers queries.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let store = match state.manager.store().count().await {
        Ok(_) => "ok",
        Err(e) => {
            tracing::error!("Token store health check failed: {e}");
            "unavailable"
        }
    };

    Json(json!({
        "status": "ok",
        "store": store,
        "version": env!("CARGO_PKG_VERSION")
    }))
}
