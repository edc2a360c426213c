//! Local stand-in for the Spotify accounts service and Web API.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Form, Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tunebroker::{
    config::{Config, SpotifyConfig},
    management::{TokenManager, TokenStore},
    spotify::SpotifyClient,
    types::TokenRecord,
};

/// Canned answers and call counters of the fake provider.
#[derive(Default)]
pub struct FakeSpotify {
    pub token_calls: AtomicUsize,
    pub api_calls: AtomicUsize,
    pub token_forms: Mutex<Vec<HashMap<String, String>>>,
    pub bearer_tokens: Mutex<Vec<String>>,
    token_reply: Mutex<Option<(StatusCode, Value)>>,
    playback_reply: Mutex<Option<(StatusCode, Value)>>,
}

impl FakeSpotify {
    pub fn reply_token(&self, status: StatusCode, body: Value) {
        *self.token_reply.lock().unwrap() = Some((status, body));
    }

    pub fn reply_playback(&self, status: StatusCode, body: Value) {
        *self.playback_reply.lock().unwrap() = Some((status, body));
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }

    pub fn api_calls(&self) -> usize {
        self.api_calls.load(Ordering::SeqCst)
    }

    pub fn last_token_form(&self) -> Option<HashMap<String, String>> {
        self.token_forms.lock().unwrap().last().cloned()
    }

    pub fn last_bearer(&self) -> Option<String> {
        self.bearer_tokens.lock().unwrap().last().cloned()
    }
}

async fn token(
    State(fake): State<Arc<FakeSpotify>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    fake.token_calls.fetch_add(1, Ordering::SeqCst);

    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Basic "));
    fake.token_forms.lock().unwrap().push(form);

    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid_client" }))).into_response();
    }

    match fake.token_reply.lock().unwrap().clone() {
        Some((status, body)) => (status, Json(body)).into_response(),
        None => (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_grant" }))).into_response(),
    }
}

fn record_api_call(fake: &FakeSpotify, headers: &HeaderMap) {
    fake.api_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(bearer) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        fake.bearer_tokens.lock().unwrap().push(bearer.to_string());
    }
}

async fn playback(State(fake): State<Arc<FakeSpotify>>, headers: HeaderMap) -> Response {
    record_api_call(&fake, &headers);
    match fake.playback_reply.lock().unwrap().clone() {
        Some((status, body)) => (status, Json(body)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn devices(State(fake): State<Arc<FakeSpotify>>, headers: HeaderMap) -> Json<Value> {
    record_api_call(&fake, &headers);
    Json(json!({ "devices": [{ "id": "d1", "name": "Kitchen", "is_active": true }] }))
}

async fn command(State(fake): State<Arc<FakeSpotify>>, headers: HeaderMap) -> StatusCode {
    record_api_call(&fake, &headers);
    StatusCode::NO_CONTENT
}

/// Starts the fake provider on an ephemeral port.
pub async fn spawn_fake_spotify() -> (Arc<FakeSpotify>, SocketAddr) {
    let fake = Arc::new(FakeSpotify::default());

    let app = Router::new()
        .route("/api/token", post(token))
        .route("/v1/me/player", get(playback))
        .route("/v1/me/player/devices", get(devices))
        .route("/v1/me/player/play", put(command))
        .route("/v1/me/player/pause", put(command))
        .route("/v1/me/player/next", post(command))
        .route("/v1/me/player/previous", post(command))
        .route("/v1/me/player/queue", post(command))
        .with_state(Arc::clone(&fake));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (fake, addr)
}

pub fn spotify_config(addr: SocketAddr) -> SpotifyConfig {
    SpotifyConfig {
        client_id: "test-client".to_string(),
        client_secret: "test-secret".to_string(),
        redirect_uri: "https://localhost:3000".to_string(),
        scope: "user-read-playback-state user-modify-playback-state".to_string(),
        auth_url: format!("http://{addr}/authorize"),
        token_url: format!("http://{addr}/api/token"),
        api_url: format!("http://{addr}/v1"),
        http_timeout: Duration::from_secs(5),
    }
}

pub fn service_config(addr: SocketAddr, debug_routes: bool) -> Config {
    Config {
        server_addr: "127.0.0.1:0".to_string(),
        database_url: "sqlite::memory:".to_string(),
        cors_origins: vec!["https://localhost:3000".to_string()],
        allowlist: None,
        debug_routes,
        spotify: spotify_config(addr),
    }
}

/// Token manager backed by a fresh in-memory store and the fake provider.
pub async fn manager(addr: SocketAddr) -> TokenManager {
    let store = TokenStore::in_memory().await.unwrap();
    store.migrate().await.unwrap();

    let spotify = SpotifyClient::new(spotify_config(addr), reqwest::Client::new());
    TokenManager::new(store, spotify)
}

pub fn record(
    session_id: &str,
    access_token: &str,
    refresh_token: Option<&str>,
    expires_at: DateTime<Utc>,
) -> TokenRecord {
    let now = Utc::now();
    TokenRecord {
        session_id: session_id.to_string(),
        access_token: access_token.to_string(),
        refresh_token: refresh_token.map(str::to_string),
        expires_at,
        created_at: now,
        updated_at: now,
    }
}
