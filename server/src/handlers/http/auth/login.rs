use std::collections::HashMap;

use anyhow::{Context, Result};
use hyper::StatusCode;
use hyper::header::{self, HeaderValue};
use shared::types::{ApiSuccess, LoginData, LoginPayload};
use tracing::{info, warn};

use crate::AppState;
use crate::handlers::http::utils::{
    client_ip, deliver_auth_error, deliver_serialized_json, is_https, session_cookie,
};
use crate::handlers::http::{ApiRequest, HttpResponse};

/// POST /api/auth/login
///
/// Accepts `{email, password}` as JSON or as a urlencoded form. On success
/// sets the `token` cookie and returns the public view of the principal.
pub async fn handle_login(req: ApiRequest, state: AppState) -> Result<HttpResponse> {
    let trust_proxy = state.config.read().await.server.trust_proxy_headers;
    let client = client_ip(&req, trust_proxy);
    let secure = is_https(&req, trust_proxy);

    info!("Processing login request from {}", client);

    // An unreadable body is treated as empty credentials so it still goes
    // through the verifier and consumes an attempt.
    let login_data = parse_login_body(&req).unwrap_or_else(|reason| {
        warn!("Login body rejected: {}", reason);
        LoginData::default()
    });

    let principal = match state
        .verifier
        .verify(&state.db, &login_data.email, &login_data.password, &client)
        .await
    {
        Ok(principal) => principal,
        Err(e) => return deliver_auth_error(&e),
    };

    let issued = match state.issuer.issue(&principal) {
        Ok(issued) => issued,
        Err(e) => return deliver_auth_error(&e),
    };

    if let Err(e) = crate::database::principals::update_last_login(&state.db, principal.id).await {
        warn!("Failed to record last login for {}: {}", principal.id, e);
    }

    let cookie = session_cookie(&issued.token, state.issuer.lifetime(), secure)
        .context("Failed to build session cookie")?;

    info!(
        "Login successful for {} (ID: {}, role: {})",
        principal.username, principal.id, principal.role
    );

    let payload = ApiSuccess::new(LoginPayload {
        user: principal.to_login_user(),
    });
    let mut response = deliver_serialized_json(&payload, StatusCode::OK)?;
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    Ok(response)
}

/// Read `{email, password}` from a JSON or urlencoded body.
fn parse_login_body(req: &ApiRequest) -> std::result::Result<LoginData, String> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let body = req.body();

    if content_type.starts_with("application/x-www-form-urlencoded") {
        let params = form_urlencoded::parse(body.as_ref())
            .into_owned()
            .collect::<HashMap<String, String>>();

        let email = params.get("email").ok_or("missing field: email")?;
        let password = params.get("password").ok_or("missing field: password")?;

        return Ok(LoginData {
            email: email.clone(),
            password: password.clone(),
        });
    }

    serde_json::from_slice::<LoginData>(body).map_err(|e| format!("invalid JSON body: {}", e))
}
