use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderMap, HeaderValue, StatusCode, header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::utils;

pub const SESSION_COOKIE: &str = "tunebroker_sid";

/// Session identifier of the current request, as assigned by [`session_layer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Response marker asking [`session_layer`] to expire the session cookie.
#[derive(Debug, Clone, Copy)]
pub struct SessionInvalidated;

impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionId>()
            .cloned()
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Middleware that gives every request a session identifier.
///
/// The identifier is read from the session cookie; when the cookie is missing
/// or malformed a new one is generated and set on the response. Handlers that
/// return [`SessionInvalidated`] get the cookie expired instead.
pub async fn session_layer(mut req: Request, next: Next) -> Response {
    let (session_id, is_new) = match session_from_headers(req.headers()) {
        Some(id) => (id, false),
        None => (utils::generate_session_id(), true),
    };
    req.extensions_mut().insert(SessionId(session_id.clone()));

    let mut res = next.run(req).await;

    let cookie = if res.extensions().get::<SessionInvalidated>().is_some() {
        Some(format!(
            "{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
        ))
    } else if is_new {
        Some(format!(
            "{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax"
        ))
    } else {
        None
    };

    if let Some(cookie) = cookie {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            res.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    res
}

/// Extracts a well-formed session identifier from the `Cookie` headers.
pub fn session_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| is_valid_session_id(value))
}

fn is_valid_session_id(value: &str) -> bool {
    !value.is_empty() && value.len() <= 128 && value.chars().all(|c| c.is_ascii_alphanumeric())
}
