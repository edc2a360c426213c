//! Fixed set of playback and search operations proxied to the Web API.
//!
//! Read operations return the provider's JSON untouched. Commands
//! (play, pause, next, previous, queue) are fire-and-forget: their outcome is
//! logged by the manager but never reported to the caller.

use reqwest::Method;
use serde_json::Value;

use crate::{error::GatewayError, management::TokenManager, utils};

/// Fetches the user's current playback state (`GET /me/player`).
///
/// # Arguments
///
/// * `manager` - Token manager used to authorize the call
/// * `session_id` - Web session whose tokens are used
///
/// # Returns
///
/// The provider's JSON as-is. When nothing is playing Spotify answers
/// `204 No Content`, which surfaces as [`GatewayError::Malformed`].
pub async fn current_playback(
    manager: &TokenManager,
    session_id: &str,
) -> Result<Value, GatewayError> {
    manager
        .call_api(session_id, "/me/player", Method::GET, None)
        .await
}

/// Lists the user's available playback devices (`GET /me/player/devices`).
pub async fn devices(manager: &TokenManager, session_id: &str) -> Result<Value, GatewayError> {
    manager
        .call_api(session_id, "/me/player/devices", Method::GET, None)
        .await
}

/// Searches the catalog (`GET /search`).
///
/// # Arguments
///
/// * `query` - Free-text search, percent-encoded here
/// * `kind` - Comma-separated item types, e.g. `track` or `album,artist`
/// * `limit` - Maximum number of results per type
pub async fn search(
    manager: &TokenManager,
    session_id: &str,
    query: &str,
    kind: &str,
    limit: u32,
) -> Result<Value, GatewayError> {
    let path = search_path(query, kind, limit);
    manager.call_api(session_id, &path, Method::GET, None).await
}

/// Resumes playback on the active device.
pub async fn play(manager: &TokenManager, session_id: &str) {
    let _ = manager
        .call_api(session_id, "/me/player/play", Method::PUT, None)
        .await;
}

/// Pauses playback on the active device.
pub async fn pause(manager: &TokenManager, session_id: &str) {
    let _ = manager
        .call_api(session_id, "/me/player/pause", Method::PUT, None)
        .await;
}

pub async fn next(manager: &TokenManager, session_id: &str) {
    let _ = manager
        .call_api(session_id, "/me/player/next", Method::POST, None)
        .await;
}

pub async fn previous(manager: &TokenManager, session_id: &str) {
    let _ = manager
        .call_api(session_id, "/me/player/previous", Method::POST, None)
        .await;
}

/// Appends a track or episode URI to the user's queue.
pub async fn add_to_queue(manager: &TokenManager, session_id: &str, uri: &str) {
    let path = queue_path(uri);
    let _ = manager
        .call_api(session_id, &path, Method::POST, None)
        .await;
}

/// Builds the Web API path of a search request.
pub fn search_path(query: &str, kind: &str, limit: u32) -> String {
    format!(
        "/search?q={q}&type={kind}&limit={limit}",
        q = utils::encode_query_value(query),
        kind = utils::encode_query_value(kind),
    )
}

pub fn queue_path(uri: &str) -> String {
    format!("/me/player/queue?uri={}", utils::encode_query_value(uri))
}
