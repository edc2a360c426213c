//! Configuration management for the tunebroker service.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. Everything the service needs at
//! runtime is resolved once into a [`Config`] value that is passed to the
//! components that need it, instead of being read from the environment on
//! every call.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory, then in the working directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf, time::Duration};

use crate::api::IpAllowlist;

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_CLIENT_ID: &str = "2c4bd3a5174e4a2b8791221489ac5360";
pub const DEFAULT_REDIRECT_URI: &str = "https://localhost:3000";
pub const DEFAULT_SCOPE: &str = "user-read-playback-state user-modify-playback-state user-read-currently-playing playlist-modify-public playlist-modify-private user-library-read user-library-modify";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_CORS_ORIGINS: &str = "https://localhost:3000,http://127.0.0.1:3000";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Errors raised while resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("cannot prepare data directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Credentials and endpoints for the Spotify accounts service and Web API.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub http_timeout: Duration,
}

/// Fully resolved service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub database_url: String,
    pub cors_origins: Vec<String>,
    pub allowlist: Option<IpAllowlist>,
    pub debug_routes: bool,
    pub spotify: SpotifyConfig,
}

impl Config {
    /// Resolves the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `SPOTIFY_API_AUTH_CLIENT_SECRET`
    /// is not set and [`ConfigError::Invalid`] when a value cannot be parsed.
    ///
    /// # Example
    ///
    /// ```
    /// use tunebroker::config::{self, Config};
    ///
    /// config::load_env().await?;
    /// let config = Config::from_env()?;
    /// println!("listening on {}", config.server_addr);
    /// ```
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolves the configuration through an arbitrary key lookup.
    ///
    /// Empty values are treated as unset, so `FOO=` in a `.env` file falls
    /// back to the default for `FOO`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let http_timeout = match get("SPOTIFY_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                key: "SPOTIFY_HTTP_TIMEOUT_SECS",
                reason: e.to_string(),
            })?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let allowlist = match get("ALLOWED_IP_RANGES") {
            Some(raw) => Some(IpAllowlist::parse(&raw).map_err(|reason| {
                ConfigError::Invalid {
                    key: "ALLOWED_IP_RANGES",
                    reason,
                }
            })?),
            None => None,
        };

        let debug_routes = match get("ENABLE_DEBUG_ROUTES") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::Invalid {
                key: "ENABLE_DEBUG_ROUTES",
                reason: format!("expected a boolean, got `{raw}`"),
            })?,
            None => false,
        };

        Ok(Config {
            server_addr: or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
            database_url: get("DATABASE_URL").unwrap_or_else(default_database_url),
            cors_origins: split_list(&or("CORS_ALLOWED_ORIGINS", DEFAULT_CORS_ORIGINS)),
            allowlist,
            debug_routes,
            spotify: SpotifyConfig {
                client_id: or("SPOTIFY_API_AUTH_CLIENT_ID", DEFAULT_CLIENT_ID),
                client_secret: get("SPOTIFY_API_AUTH_CLIENT_SECRET")
                    .ok_or(ConfigError::Missing("SPOTIFY_API_AUTH_CLIENT_SECRET"))?,
                redirect_uri: or("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI),
                scope: or("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE),
                auth_url: or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL),
                token_url: or("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL),
                api_url: or("SPOTIFY_API_URL", DEFAULT_API_URL),
                http_timeout: Duration::from_secs(http_timeout),
            },
        })
    }
}

/// Loads environment variables from `.env` files.
///
/// Creates the platform-specific data directory if it doesn't exist and loads
/// `tunebroker/.env` from it, followed by a `.env` in the working directory.
/// Variables that are already set are never overwritten, and a missing file is
/// not an error.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/tunebroker/.env`
/// - macOS: `~/Library/Application Support/tunebroker/.env`
/// - Windows: `%LOCALAPPDATA%/tunebroker/.env`
///
/// # Errors
///
/// Fails only when the data directory cannot be created.
pub async fn load_env() -> Result<(), ConfigError> {
    let dir = data_dir();
    async_fs::create_dir_all(&dir).await?;

    let path = dir.join(".env");
    if path.is_file() {
        if let Err(e) = dotenv::from_path(&path) {
            crate::warning!("Ignoring unreadable env file {}. Err: {}", path.display(), e);
        }
    }
    dotenv::dotenv().ok();

    Ok(())
}

/// Platform data directory holding the `.env` file and the default database.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("tunebroker");
    path
}

fn default_database_url() -> String {
    format!(
        "sqlite://{path}?mode=rwc",
        path = data_dir().join("tokens.db").display()
    )
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
