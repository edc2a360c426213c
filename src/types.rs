use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Upper bound for an accepted token lifetime. Spotify issues one-hour
/// tokens; anything beyond a day is treated as a malformed response.
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

/// Stored Spotify credentials for a single web session.
///
/// There is at most one record per `session_id`. A record only comes into
/// existence after a successful authorization-code exchange, so the access
/// token is always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub session_id: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Builds a fresh record from a token grant received at `received_at`.
    pub fn from_grant(session_id: &str, grant: &TokenGrant, received_at: DateTime<Utc>) -> Self {
        Self {
            session_id: session_id.to_string(),
            access_token: grant.access_token.clone(),
            refresh_token: grant.refresh_token.clone(),
            expires_at: grant.expires_at(received_at),
            created_at: received_at,
            updated_at: received_at,
        }
    }
}

/// Raw body of the Spotify `/api/token` endpoint.
///
/// Every field is optional so that an incomplete body can be told apart from
/// an unparseable one; see [`TokenResponse::into_grant`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
}

impl TokenResponse {
    /// Validates the response, requiring both an access token and a lifetime.
    ///
    /// # Returns
    ///
    /// `None` when `access_token` is missing or empty, or when `expires_in` is
    /// missing or outside `1..=MAX_TOKEN_LIFETIME_SECS`.
    pub fn into_grant(self) -> Option<TokenGrant> {
        let access_token = self.access_token.filter(|t| !t.is_empty())?;
        let expires_in = self
            .expires_in
            .filter(|secs| (1..=MAX_TOKEN_LIFETIME_SECS).contains(secs))?;

        Some(TokenGrant {
            access_token,
            refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
            expires_in,
            scope: self.scope,
        })
    }
}

/// A validated token grant from the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    pub scope: Option<String>,
}

impl TokenGrant {
    /// Absolute expiry of the access token when received at `received_at`.
    pub fn expires_at(&self, received_at: DateTime<Utc>) -> DateTime<Utc> {
        received_at + chrono::Duration::seconds(self.expires_in)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeTokenRequest {
    pub code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddToQueueRequest {
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(rename = "type", default = "default_search_type")]
    pub kind: String,
    #[serde(default = "default_search_limit")]
    pub limit: u32,
}

fn default_search_type() -> String {
    "track".to_string()
}

fn default_search_limit() -> u32 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUrlResponse {
    pub auth_url: String,
    pub session_id: String,
}

#[derive(Tabled)]
pub struct SessionTableRow {
    pub session: String,
    pub expires: String,
    pub status: String,
    pub updated: String,
}
