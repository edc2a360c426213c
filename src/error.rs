use reqwest::StatusCode;

/// Failure kinds of the token lifecycle and the Spotify gateway.
///
/// Callers that only care about "did it work" can collapse every variant to
/// an unauthenticated outcome; the variants exist so that logs and tests can
/// tell the causes apart.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("no stored credentials for session")]
    NotAuthenticated,

    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("upstream responded with status {0}")]
    Status(StatusCode),

    #[error("malformed upstream response: {0}")]
    Malformed(String),

    #[error("token store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl GatewayError {
    /// True when the caller simply has no usable credentials, as opposed to
    /// an upstream or storage fault.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, GatewayError::NotAuthenticated)
    }
}
