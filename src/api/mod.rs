//! # API Module
//!
//! HTTP handlers of the tunebroker service. Every handler is a thin mapping
//! from one inbound request to one call on the
//! [`TokenManager`](crate::management::TokenManager), keyed by the caller's
//! session identifier.
//!
//! ## Endpoints
//!
//! All Spotify endpoints live under `/api/spotify`:
//!
//! ### Authentication
//!
//! - [`auth_url`] - Authorization URL for the caller's session
//! - [`exchange_token`] - Exchanges an authorization code posted by the frontend
//! - [`callback`] - OAuth redirect target rendering a popup-closing page
//! - [`logout`] - Deletes stored tokens and invalidates the session
//!
//! ### Playback
//!
//! - [`current_playback`], [`devices`], [`search`] - Provider JSON passthrough,
//!   `401` when the session is not authenticated
//! - [`play`], [`pause`], [`next`], [`previous`], [`add_to_queue`] -
//!   Fire-and-forget commands that always answer `{ "success": true }`
//!
//! ### Debug
//!
//! - [`clear_all_tokens`], [`force_unauthorized`] - Destructive helpers,
//!   mounted only when debug routes are enabled
//!
//! ### Monitoring
//!
//! - [`health`] - Liveness probe, served outside the session and allowlist layers
//!
//! ## Sessions
//!
//! [`session_layer`] assigns each caller a session identifier carried in a
//! cookie. Handlers receive it through the [`SessionId`] extractor and may
//! return [`SessionInvalidated`] to drop it.
//!
//! ## Access Control
//!
//! When an allowlist is configured, [`enforce_allowlist`] rejects clients
//! outside the configured IPv4 ranges before any handler runs.

mod allowlist;
mod auth;
mod callback;
mod debug;
mod health;
mod player;
mod session;

pub use allowlist::{IpAllowlist, client_ip, enforce_allowlist};
pub use auth::{auth_url, exchange_token, logout};
pub use callback::callback;
pub use debug::{clear_all_tokens, force_unauthorized};
pub use health::health;
pub use player::{add_to_queue, current_playback, devices, next, pause, play, previous, search};
pub use session::{SESSION_COOKIE, SessionId, SessionInvalidated, session_from_headers, session_layer};

use axum::{
    Json,
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::debug;

use crate::management::TokenManager;

/// State shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub manager: TokenManager,
}

/// Maps an unreadable JSON request body to the façade's failure envelope,
/// keeping the rejection's status (400, 415 or 422).
pub(crate) fn bad_request(rejection: &JsonRejection) -> Response {
    debug!("Rejected request body: {}", rejection.body_text());
    (
        rejection.status(),
        Json(json!({ "success": false, "error": "Invalid request body" })),
    )
        .into_response()
}
