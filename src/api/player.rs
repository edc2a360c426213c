use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use crate::{
    api::{self, AppState, SessionId},
    error::GatewayError,
    spotify::player,
    types::{AddToQueueRequest, SearchParams},
};

/// Provider JSON on success; every failure is reported as `401`.
fn passthrough(result: Result<Value, GatewayError>) -> Response {
    match result {
        Ok(value) => Json(value).into_response(),
        Err(_) => StatusCode::UNAUTHORIZED.into_response(),
    }
}

fn sent() -> Json<Value> {
    Json(json!({ "success": true }))
}

pub async fn current_playback(State(state): State<AppState>, session: SessionId) -> Response {
    passthrough(player::current_playback(&state.manager, session.as_str()).await)
}

pub async fn devices(State(state): State<AppState>, session: SessionId) -> Response {
    passthrough(player::devices(&state.manager, session.as_str()).await)
}

pub async fn search(
    State(state): State<AppState>,
    session: SessionId,
    Query(params): Query<SearchParams>,
) -> Response {
    passthrough(
        player::search(
            &state.manager,
            session.as_str(),
            &params.q,
            &params.kind,
            params.limit,
        )
        .await,
    )
}

pub async fn play(State(state): State<AppState>, session: SessionId) -> Json<Value> {
    player::play(&state.manager, session.as_str()).await;
    sent()
}

pub async fn pause(State(state): State<AppState>, session: SessionId) -> Json<Value> {
    player::pause(&state.manager, session.as_str()).await;
    sent()
}

pub async fn next(State(state): State<AppState>, session: SessionId) -> Json<Value> {
    player::next(&state.manager, session.as_str()).await;
    sent()
}

pub async fn previous(State(state): State<AppState>, session: SessionId) -> Json<Value> {
    player::previous(&state.manager, session.as_str()).await;
    sent()
}

pub async fn add_to_queue(
    State(state): State<AppState>,
    session: SessionId,
    body: Result<Json<AddToQueueRequest>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => return api::bad_request(&rejection),
    };

    let Some(uri) = body.uri.filter(|u| !u.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "Missing track uri" })),
        )
            .into_response();
    };

    player::add_to_queue(&state.manager, session.as_str(), &uri).await;
    sent().into_response()
}
