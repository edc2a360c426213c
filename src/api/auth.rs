use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::{
    api::{self, AppState, SessionId, SessionInvalidated},
    types::{AuthUrlResponse, ExchangeTokenRequest},
};

pub async fn auth_url(State(state): State<AppState>, session: SessionId) -> Json<AuthUrlResponse> {
    Json(AuthUrlResponse {
        auth_url: state.manager.spotify().authorization_url(session.as_str()),
        session_id: session.0,
    })
}

/// Exchanges the authorization code from the request body for the caller's
/// session.
///
/// # Returns
///
/// - `200 {success:true, accessToken}` when tokens were stored
/// - `400 {success:false, error}` when the code is missing or the exchange failed
pub async fn exchange_token(
    State(state): State<AppState>,
    session: SessionId,
    body: Result<Json<ExchangeTokenRequest>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => return api::bad_request(&rejection),
    };

    let Some(code) = body.code.filter(|c| !c.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "Missing authorization code" })),
        )
            .into_response();
    };

    match state
        .manager
        .exchange_code_for_token(&code, session.as_str())
        .await
    {
        Ok(access_token) => {
            Json(json!({ "success": true, "accessToken": access_token })).into_response()
        }
        Err(_) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "Token exchange failed" })),
        )
            .into_response(),
    }
}

pub async fn logout(
    State(state): State<AppState>,
    session: SessionId,
) -> (Extension<SessionInvalidated>, Json<serde_json::Value>) {
    if let Err(e) = state.manager.logout(session.as_str()).await {
        error!("Failed to delete tokens on logout: {e}");
    }

    (
        Extension(SessionInvalidated),
        Json(json!({ "success": true })),
    )
}
