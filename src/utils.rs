use base64::{Engine, engine::general_purpose::STANDARD};
use rand::{Rng, distr::Alphanumeric};

/// Length of generated session identifiers.
pub const SESSION_ID_LEN: usize = 32;

/// Generates a random alphanumeric session identifier.
pub fn generate_session_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}

/// Builds the value of an HTTP Basic `Authorization` header for the client
/// credentials, i.e. `Basic base64(client_id:client_secret)`.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    let credentials = format!("{client_id}:{client_secret}");
    format!("Basic {}", STANDARD.encode(credentials.as_bytes()))
}

/// Percent-encodes a single query parameter value. Only RFC 3986 unreserved
/// characters are left as-is; spaces become `%20`, not `+`.
///
/// # Example
///
/// ```
/// assert_eq!(encode_query_value("daft punk"), "daft%20punk");
/// ```
pub fn encode_query_value(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Shortens a session identifier for display, keeping only its head.
pub fn mask_session_id(session_id: &str) -> String {
    let head: String = session_id.chars().take(8).collect();
    if head.len() < session_id.len() {
        format!("{head}…")
    } else {
        head
    }
}
