use chrono::{Duration, Utc};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    error::GatewayError,
    management::TokenStore,
    spotify::SpotifyClient,
    types::TokenRecord,
    utils,
};

/// Stored tokens expiring within this many minutes are refreshed before use,
/// so a token cannot lapse between validation and the downstream call.
pub const REFRESH_BUFFER_MINUTES: i64 = 5;

/// Token lifecycle manager: hands out valid access tokens per web session,
/// refreshing and persisting them as needed.
#[derive(Debug, Clone)]
pub struct TokenManager {
    store: TokenStore,
    spotify: SpotifyClient,
}

impl TokenManager {
    pub fn new(store: TokenStore, spotify: SpotifyClient) -> Self {
        TokenManager { store, spotify }
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn spotify(&self) -> &SpotifyClient {
        &self.spotify
    }

    /// Exchanges an authorization code and stores the resulting tokens for
    /// the session, replacing any record it already had.
    ///
    /// Nothing is written unless the exchange succeeds.
    pub async fn exchange_code_for_token(
        &self,
        code: &str,
        session_id: &str,
    ) -> Result<String, GatewayError> {
        let grant = self.spotify.request_token(code).await.inspect_err(|e| {
            warn!(
                session = %utils::mask_session_id(session_id),
                "Authorization code exchange failed: {e}"
            )
        })?;

        let record = TokenRecord::from_grant(session_id, &grant, Utc::now());
        self.store.replace(&record).await?;

        info!(
            session = %utils::mask_session_id(session_id),
            expires_at = %record.expires_at,
            "Stored tokens for session"
        );
        Ok(record.access_token)
    }

    /// Returns a currently valid access token for the session.
    ///
    /// The stored token is returned as-is while it has more than
    /// [`REFRESH_BUFFER_MINUTES`] left. Otherwise exactly one refresh is attempted;
    /// on failure the stored record is left untouched.
    ///
    /// # Errors
    ///
    /// [`GatewayError::NotAuthenticated`] when the session has no record,
    /// or whatever the refresh failed with.
    pub async fn get_valid_access_token(&self, session_id: &str) -> Result<String, GatewayError> {
        let Some(record) = self.store.find(session_id).await? else {
            return Err(GatewayError::NotAuthenticated);
        };

        if record.expires_at > Utc::now() + Duration::minutes(REFRESH_BUFFER_MINUTES) {
            return Ok(record.access_token);
        }

        debug!(
            session = %utils::mask_session_id(session_id),
            expires_at = %record.expires_at,
            "Stored token is due for refresh"
        );
        self.refresh_access_token(&record).await
    }

    /// Refreshes the record's access token and updates it in place.
    ///
    /// A refresh response without a refresh token keeps the stored one.
    pub async fn refresh_access_token(&self, record: &TokenRecord) -> Result<String, GatewayError> {
        let session = utils::mask_session_id(&record.session_id);

        let Some(refresh_token) = record.refresh_token.as_deref() else {
            warn!(%session, "Cannot refresh: no refresh token on file");
            return Err(GatewayError::NotAuthenticated);
        };

        let grant = self
            .spotify
            .refresh_grant(refresh_token)
            .await
            .inspect_err(|e| warn!(%session, "Token refresh failed: {e}"))?;

        let expires_at = grant.expires_at(Utc::now());
        let updated = self
            .store
            .update_refreshed(
                &record.session_id,
                &grant.access_token,
                grant.refresh_token.as_deref(),
                expires_at,
            )
            .await?;

        // logged out while the refresh was in flight
        if !updated {
            warn!(%session, "Refreshed token discarded: record no longer exists");
            return Err(GatewayError::NotAuthenticated);
        }

        info!(%session, %expires_at, "Refreshed access token");
        Ok(grant.access_token)
    }

    /// Calls the Spotify Web API on behalf of the session.
    ///
    /// When no valid token can be obtained no upstream request is issued.
    pub async fn call_api(
        &self,
        session_id: &str,
        path: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<Value, GatewayError> {
        let token = self.get_valid_access_token(session_id).await?;

        self.spotify
            .request(&token, method.clone(), path, body)
            .await
            .inspect_err(|e| {
                warn!(
                    session = %utils::mask_session_id(session_id),
                    %method,
                    path,
                    "Spotify API call failed: {e}"
                )
            })
    }

    /// Forgets the session's tokens. Returns whether a record existed.
    pub async fn logout(&self, session_id: &str) -> Result<bool, GatewayError> {
        let removed = self.store.delete(session_id).await?;
        info!(
            session = %utils::mask_session_id(session_id),
            removed,
            "Logged out session"
        );
        Ok(removed)
    }

    /// Deletes the tokens of every session.
    pub async fn clear_all_tokens(&self) -> Result<u64, GatewayError> {
        let removed = self.store.delete_all().await?;
        warn!(removed, "Cleared all stored tokens");
        Ok(removed)
    }
}
