use anyhow::{Context, Result};
use hyper::StatusCode;
use hyper::header;
use shared::types::Acknowledgement;
use tracing::{debug, info};

use crate::AppState;
use crate::handlers::http::utils::{
    TOKEN_COOKIE, cookie_names, deliver_serialized_json, delete_cookie, extract_session_token,
    is_https,
};
use crate::handlers::http::{ApiRequest, HttpResponse};

/// POST or GET /api/auth/logout
///
/// Revokes the presented token if it is still valid, then clears the
/// `token` cookie and every other cookie the client sent. Always answers
/// `{"success": true}`: a client holding a dead token is already logged out.
pub async fn handle_logout(req: ApiRequest, state: AppState) -> Result<HttpResponse> {
    let trust_proxy = state.config.read().await.server.trust_proxy_headers;
    let secure = is_https(&req, trust_proxy);

    let token = extract_session_token(req.headers());
    match state.validator.validate(token.as_deref()).await {
        Ok(session) => {
            state.validator.revoke(&session).await;
            info!("User {} logged out", session.username());
        }
        Err(e) => debug!("Logout without a live session: {}", e),
    }

    let mut names = cookie_names(req.headers());
    if !names.iter().any(|n| n == TOKEN_COOKIE) {
        names.insert(0, TOKEN_COOKIE.to_string());
    }

    let mut response = deliver_serialized_json(&Acknowledgement::ok(), StatusCode::OK)?;
    for name in &names {
        let cookie = delete_cookie(name, secure)
            .with_context(|| format!("Failed to build expiry for cookie {}", name))?;
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }

    Ok(response)
}
