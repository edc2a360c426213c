use reqwest::header::AUTHORIZATION;

use crate::{
    error::GatewayError,
    spotify::SpotifyClient,
    types::{TokenGrant, TokenResponse},
};

impl SpotifyClient {
    /// Builds the Spotify authorization URL for a web session.
    ///
    /// The URL is a plain concatenation of the authorize endpoint, the client
    /// id, the configured redirect URI, the scope list and `state`. The
    /// session identifier doubles as the OAuth `state` so the callback can be
    /// correlated with the session that started the flow.
    ///
    /// # Arguments
    ///
    /// * `session_id` - Identifier of the web session starting the flow
    ///
    /// # Security Note
    ///
    /// Nothing in this crate checks that the `state` coming back on the
    /// callback matches the caller's session. A mismatch is only logged.
    ///
    /// # Example
    ///
    /// ```
    /// let url = client.authorization_url("a1b2c3");
    /// assert!(url.ends_with("&state=a1b2c3"));
    /// ```
    pub fn authorization_url(&self, session_id: &str) -> String {
        format!(
            "{auth_url}?client_id={client_id}&response_type=code&redirect_uri={redirect_uri}&scope={scope}&state={state}",
            auth_url = &self.config.auth_url,
            client_id = &self.config.client_id,
            redirect_uri = &self.config.redirect_uri,
            scope = self.config.scope.split_whitespace().collect::<Vec<_>>().join("%20"),
            state = session_id,
        )
    }

    /// Exchanges an authorization code for an access token.
    ///
    /// Posts `grant_type=authorization_code` together with the code and the
    /// redirect URI to the token endpoint, authenticating with the client
    /// credentials as HTTP Basic auth.
    ///
    /// # Arguments
    ///
    /// * `code` - Authorization code received on the OAuth callback
    ///
    /// # Returns
    ///
    /// - `Ok(TokenGrant)` - The response carried both `access_token` and `expires_in`
    /// - `Err(GatewayError::Status)` - The token endpoint answered with a non-2xx status
    /// - `Err(GatewayError::Malformed)` - The body was not JSON or lacked required fields
    /// - `Err(GatewayError::Upstream)` - The request never completed
    ///
    /// # Note
    ///
    /// The authorization code is single-use and short-lived. The exchange
    /// should happen immediately after receiving the code.
    pub async fn request_token(&self, code: &str) -> Result<TokenGrant, GatewayError> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ])
        .await
    }

    /// Mints a new access token from a refresh token.
    ///
    /// Same contract as [`SpotifyClient::request_token`]. The returned grant
    /// carries a refresh token only if Spotify rotated it.
    pub async fn refresh_grant(&self, refresh_token: &str) -> Result<TokenGrant, GatewayError> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenGrant, GatewayError> {
        let res = self
            .http
            .post(&self.config.token_url)
            .header(AUTHORIZATION, &self.basic_auth)
            .form(form)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status));
        }

        let body = res.text().await?;
        let response: TokenResponse =
            serde_json::from_str(&body).map_err(|e| GatewayError::Malformed(e.to_string()))?;

        response.into_grant().ok_or_else(|| {
            GatewayError::Malformed("token response lacks access_token or expires_in".to_string())
        })
    }
}
