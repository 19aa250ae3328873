//! Server-rendered entry points.
//!
//! The dashboard shell embeds the identity the router attached to the
//! request, so the client-side app can render without asking again.

use anyhow::{Result, anyhow};
use hyper::StatusCode;
use tracing::debug;

use crate::AppState;
use crate::auth::session;
use crate::handlers::http::utils::deliver_html;
use crate::handlers::http::{ApiRequest, HttpResponse};

const LOGIN_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Sign in</title></head>
<body>
<form id="login" method="post" action="/api/auth/login">
  <label>Email <input name="email" type="email" autocomplete="username" required></label>
  <label>Password <input name="password" type="password" autocomplete="current-password" required></label>
  <button type="submit">Sign in</button>
</form>
<script>
document.getElementById('login').addEventListener('submit', async (ev) => {
  ev.preventDefault();
  const form = new FormData(ev.target);
  const res = await fetch('/api/auth/login', {
    method: 'POST',
    headers: {'content-type': 'application/json'},
    body: JSON.stringify({email: form.get('email'), password: form.get('password')}),
  });
  if (res.ok) { window.location = '/admin'; }
});
</script>
</body>
</html>
"#;

/// Make JSON safe to place inside a `<script>` element.
pub fn escape_json_for_html(json: &str) -> String {
    json.replace('&', "\\u0026")
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

/// GET /admin
///
/// Self-contained shell. The identity block is its only script.
pub async fn handle_dashboard(req: ApiRequest, _state: AppState) -> Result<HttpResponse> {
    let session = session::from_request(&req)
        .ok_or_else(|| anyhow!("dashboard reached without a verified session"))?;

    let identity = serde_json::to_string(&session.forwarded_identity())?;
    debug!("Rendering dashboard for {}", session.username());

    let html = format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Party Portal Admin</title></head>
<body>
<div id="root"></div>
<script id="initial-session" type="application/json">{}</script>
</body>
</html>
"#,
        escape_json_for_html(&identity)
    );

    deliver_html(html, StatusCode::OK)
}

/// GET /login
pub async fn handle_login_page(_req: ApiRequest, _state: AppState) -> Result<HttpResponse> {
    deliver_html(LOGIN_PAGE.to_string(), StatusCode::OK)
}
