use axum::{
    extract::{Query, State},
    response::Html,
};
use tracing::warn;

use crate::{
    api::{AppState, SessionId},
    types::CallbackParams,
    utils,
};

/// OAuth redirect target opened in the login popup.
///
/// Exchanges the code for the caller's session and answers with a small page
/// that closes the popup; on success it also reloads the opener so the
/// frontend picks up the authenticated state.
pub async fn callback(
    State(state): State<AppState>,
    session: SessionId,
    Query(params): Query<CallbackParams>,
) -> Html<String> {
    if let Some(error) = params.error {
        warn!("Authorization denied by provider: {error}");
        return page(
            "Authorization Error",
            &format!("Error: {}", escape_html(&error)),
            false,
        );
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return page(
            "Authentication Failed",
            "Missing authorization code.",
            false,
        );
    };

    // state is not enforced; a mismatch is only reported
    if params.state.as_deref() != Some(session.as_str()) {
        warn!(
            session = %utils::mask_session_id(session.as_str()),
            "Callback state does not match the caller's session"
        );
    }

    match state
        .manager
        .exchange_code_for_token(&code, session.as_str())
        .await
    {
        Ok(_) => page(
            "Success!",
            "You have been successfully authenticated with Spotify.",
            true,
        ),
        Err(_) => page(
            "Authentication Failed",
            "Failed to exchange code for token.",
            false,
        ),
    }
}

fn page(title: &str, message: &str, reload_opener: bool) -> Html<String> {
    let script = if reload_opener {
        "window.close(); window.opener && window.opener.location.reload();"
    } else {
        "window.close();"
    };

    Html(format!(
        "<html><body><h1>{title}</h1><p>{message}</p><script>{script}</script></body></html>"
    ))
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
