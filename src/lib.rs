//! Spotify OAuth Token Broker Library
//!
//! This library implements a server-side OAuth2 proxy for the Spotify Web
//! API. It builds authorization URLs, exchanges authorization codes for
//! tokens stored per web session, keeps those tokens fresh, and forwards a
//! small set of playback and search operations with the session's bearer
//! token.
//!
//! # Modules
//!
//! - `api` - HTTP handlers, session cookie and IP allowlist middleware
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error kinds of the token lifecycle and the Spotify gateway
//! - `management` - Token store and token lifecycle management
//! - `server` - Router assembly and the HTTP server loop
//! - `spotify` - Spotify accounts service and Web API client
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use tunebroker::{config, server};
//!
//! #[tokio::main]
//! async fn main() -> tunebroker::Res<()> {
//!     config::load_env().await?;
//!     let config = config::Config::from_env()?;
//!     server::start_api_server(config).await
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used by the binary and the server bootstrap, where errors of several
/// kinds (configuration, database, socket) are only reported, never matched.
/// Library operations with meaningful failure kinds return their own error
/// types instead.
///
/// # Type Parameters
///
/// - `T` - The success type returned on successful operations
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints a console status line prefixed with a blue `o`.
///
/// Console macros are meant for the CLI commands; the service itself logs
/// through `tracing`.
///
/// # Example
///
/// ```
/// info!("Starting tunebroker on {}", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a console line prefixed with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a red `!` line to stderr and terminates the process with exit
/// code 1.
///
/// Evaluates to `!`, so it can end a `match` arm that otherwise yields a
/// value:
///
/// ```
/// let store = match TokenStore::connect(url).await {
///     Ok(store) => store,
///     Err(e) => error!("Cannot open token store. Err: {}", e),
/// };
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a yellow `!` line to stderr without terminating.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
