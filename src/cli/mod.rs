//! # CLI Module
//!
//! Command implementations behind the `tunebroker` binary. Each command
//! resolves its own configuration, reports progress through the crate's
//! console macros (`info!`, `success!`, `warning!`, `error!`) and exits
//! non-zero on fatal errors.
//!
//! ## Commands
//!
//! - [`serve`] - Runs the HTTP token broker
//! - [`sessions`] - Lists stored sessions and the state of their tokens
//! - [`clear_tokens`] - Deletes the tokens of every session
//!
//! ## Usage Patterns
//!
//! ```bash
//! tunebroker serve --addr 0.0.0.0:8080   # Run the service
//! tunebroker sessions                    # Inspect the token store
//! tunebroker clear-tokens                # Force every session to log in again
//! ```
//!
//! Tokens are never printed; session identifiers are shortened.

mod serve;
mod sessions;

pub use serve::serve;
pub use sessions::clear_tokens;
pub use sessions::sessions;
