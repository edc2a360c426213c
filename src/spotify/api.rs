use reqwest::{Method, header::CONTENT_TYPE};
use serde_json::Value;

use crate::{error::GatewayError, spotify::SpotifyClient};

impl SpotifyClient {
    /// Sends an authenticated request to the Spotify Web API.
    ///
    /// `path` is appended verbatim to the configured API base URL, so any
    /// query values must already be percent-encoded by the caller.
    ///
    /// # Arguments
    ///
    /// * `access_token` - Valid bearer token for the session
    /// * `method` - HTTP method of the call
    /// * `path` - Endpoint path starting with `/`, e.g. `/me/player`
    /// * `body` - Optional JSON request body
    ///
    /// # Returns
    ///
    /// The parsed JSON body of a 2xx response. A 2xx without a body (Spotify
    /// answers `204 No Content` for most player commands) or with a non-JSON
    /// body is reported as [`GatewayError::Malformed`].
    pub async fn request(
        &self,
        access_token: &str,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, GatewayError> {
        let url = format!("{base}{path}", base = &self.config.api_url);

        let mut req = self
            .http
            .request(method, &url)
            .bearer_auth(access_token)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            req = req.json(body);
        }

        let res = req.send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status));
        }

        let text = res.text().await?;
        if text.trim().is_empty() {
            return Err(GatewayError::Malformed(format!(
                "empty body with status {status}"
            )));
        }

        serde_json::from_str(&text).map_err(|e| GatewayError::Malformed(e.to_string()))
    }
}
