//! # Spotify Integration Module
//!
//! This module is the gateway between tunebroker and the two Spotify services
//! it talks to: the accounts service (authorization and token endpoints) and
//! the Web API.
//!
//! ## Overview
//!
//! The gateway is deliberately stateless. It never reads or writes stored
//! credentials itself; the token lifecycle lives in
//! [`crate::management::TokenManager`], which hands access tokens to the
//! gateway and persists whatever the gateway obtains.
//!
//! ```text
//! API handlers
//!      ↓
//! TokenManager (lifecycle, persistence)
//!      ↓
//! SpotifyClient
//!     ├── auth   (authorize URL, code exchange, refresh)
//!     ├── api    (authenticated Web API requests)
//!     └── player (fixed playback/search operations)
//!      ↓
//! reqwest::Client
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns a [`crate::error::GatewayError`] that
//! separates transport failures, non-2xx statuses and malformed bodies.
//! Nothing is retried.
//!
//! ## HTTP Client
//!
//! The `reqwest::Client` is injected at construction so that connection pools
//! are shared and tests can point the gateway at a local fake server.

pub mod api;
pub mod auth;
pub mod player;

use crate::{config::SpotifyConfig, utils};

/// Client for the Spotify accounts service and Web API.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: reqwest::Client,
    config: SpotifyConfig,
    basic_auth: String,
}

impl SpotifyClient {
    pub fn new(config: SpotifyConfig, http: reqwest::Client) -> Self {
        let basic_auth = utils::basic_auth_header(&config.client_id, &config.client_secret);
        Self {
            http,
            config,
            basic_auth,
        }
    }

    /// Builds a client with its own `reqwest::Client`, honouring the
    /// configured request timeout.
    pub fn from_config(config: SpotifyConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self::new(config, http))
    }

    pub fn config(&self) -> &SpotifyConfig {
        &self.config
    }
}
