use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    Res, api,
    config::Config,
    management::{TokenManager, TokenStore},
    spotify::SpotifyClient,
};

/// Assembles the service router.
///
/// Spotify endpoints are nested under `/api/spotify` behind the session layer
/// and, when configured, the IP allowlist. `/health` bypasses both.
pub fn router(state: api::AppState, config: &Config) -> Router {
    let mut spotify = Router::new()
        .route("/auth-url", get(api::auth_url))
        .route("/exchange-token", post(api::exchange_token))
        .route("/callback", get(api::callback))
        .route("/current-playback", get(api::current_playback))
        .route("/play", post(api::play))
        .route("/pause", post(api::pause))
        .route("/next", post(api::next))
        .route("/previous", post(api::previous))
        .route("/search", get(api::search))
        .route("/add-to-queue", post(api::add_to_queue))
        .route("/devices", get(api::devices))
        .route("/logout", post(api::logout));

    if config.debug_routes {
        spotify = spotify
            .route("/debug/clear-all-tokens", post(api::clear_all_tokens))
            .route("/debug/force-unauthorized", post(api::force_unauthorized));
    }

    let mut app = Router::new().nest(
        "/api/spotify",
        spotify.layer(middleware::from_fn(api::session_layer)),
    );

    if let Some(allowlist) = &config.allowlist {
        app = app.layer(middleware::from_fn_with_state(
            Arc::new(allowlist.clone()),
            api::enforce_allowlist,
        ));
    }

    app.route("/health", get(api::health))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin `{origin}`");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Connects the token store and builds the manager the handlers share.
pub async fn build_state(config: &Config) -> Res<api::AppState> {
    let store = TokenStore::connect(&config.database_url).await?;
    store.migrate().await?;

    let spotify = SpotifyClient::from_config(config.spotify.clone())?;

    Ok(api::AppState {
        manager: TokenManager::new(store, spotify),
    })
}

/// Runs the HTTP service until Ctrl-C.
pub async fn start_api_server(config: Config) -> Res<()> {
    let state = build_state(&config).await?;
    let app = router(state, &config);

    let addr: SocketAddr = config.server_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    if config.debug_routes {
        warn!("Debug routes are enabled; do not expose this instance publicly");
    }
    info!("Listening on http://{addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
