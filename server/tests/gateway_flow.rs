//! End-to-end request flows through the gateway router, against an
//! in-memory database.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use gateway::AppState;
use gateway::auth::InMemoryRevocationStore;
use gateway::database::principals::{self, Principal};
use gateway::database::{accounts, connect_in_memory};
use gateway::handlers::http::HttpResponse;
use gateway::handlers::http::routes::{MAX_BODY_BYTES, build_router};
use gateway::handlers::http::utils::ClientAddr;
use gateway::security::RateLimiter;
use http_body_util::{BodyExt, Full};
use hyper::header::{self, HeaderValue};
use hyper::{Request, StatusCode};
use serde_json::{Value, json};
use shared::types::server_config::AppConfig;
use shared::types::{NewAccount, Role};

const SECRET: &str = "integration-test-secret-0123456789abcdef";
const ONE_DAY: i64 = 86_400;

struct Harness {
    state: AppState,
    admin: Principal,
    editor: Principal,
    analyst: Principal,
}

async fn provision(state: &AppState, email: &str, username: &str, role: Role) -> Principal {
    accounts::provision_account(
        &state.db,
        NewAccount {
            email: email.into(),
            username: username.into(),
            password: "Secret123".into(),
            role,
        },
        6,
    )
    .await
    .unwrap()
}

async fn harness() -> Harness {
    let pool = connect_in_memory().await.unwrap();
    let state = AppState::new(pool, AppConfig::default(), SECRET).unwrap();

    let admin = provision(&state, "admin@x.com", "root", Role::Superadmin).await;
    let editor = provision(&state, "editor@x.com", "writer", Role::Editor).await;
    let analyst = provision(&state, "analyst@x.com", "numbers", Role::Analyst).await;

    Harness {
        state,
        admin,
        editor,
        analyst,
    }
}

fn now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

fn request(method: &str, uri: &str, ip: &str) -> http::request::Builder {
    let peer: SocketAddr = format!("{}:50000", ip).parse().unwrap();
    Request::builder()
        .method(method)
        .uri(uri)
        .extension(ClientAddr(peer))
}

fn empty(builder: http::request::Builder) -> Request<Full<Bytes>> {
    builder.body(Full::new(Bytes::new())).unwrap()
}

fn json_body(builder: http::request::Builder, body: Value) -> Request<Full<Bytes>> {
    builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

fn with_cookie(builder: http::request::Builder, token: &str) -> http::request::Builder {
    builder.header(header::COOKIE, format!("token={}", token))
}

async fn send(state: &AppState, req: Request<Full<Bytes>>) -> HttpResponse {
    build_router().dispatch(req, state.clone()).await
}

async fn body_bytes(res: HttpResponse) -> Bytes {
    res.into_body().collect().await.unwrap().to_bytes()
}

async fn body_json(res: HttpResponse) -> Value {
    serde_json::from_slice(&body_bytes(res).await).unwrap()
}

async fn login(state: &AppState, email: &str, password: &str, ip: &str) -> HttpResponse {
    send(
        state,
        json_body(
            request("POST", "/api/auth/login", ip),
            json!({ "email": email, "password": password }),
        ),
    )
    .await
}

/// Token value from the response's `token` cookie.
fn token_from(res: &HttpResponse) -> String {
    let cookie = res.headers()[header::SET_COOKIE].to_str().unwrap();
    let first = cookie.split(';').next().unwrap();
    first.strip_prefix("token=").unwrap().to_string()
}

fn set_cookies(res: &HttpResponse) -> Vec<String> {
    res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_sets_cookie_and_returns_public_profile() {
    let h = harness().await;

    let res = login(&h.state, "admin@x.com", "Secret123", "10.0.0.1").await;
    assert_eq!(res.status(), StatusCode::OK);

    let cookie = res.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("; Max-Age=86400"));
    assert!(cookie.contains("; Path=/"));
    assert!(cookie.contains("; HttpOnly"));
    assert!(cookie.contains("; SameSite=Strict"));
    assert!(!cookie.contains("Secure"));
    assert_eq!(res.headers()[header::CACHE_CONTROL], "no-store");

    let json = body_json(res).await;
    assert_eq!(
        json,
        json!({
            "success": true,
            "data": {
                "user": {
                    "id": h.admin.id,
                    "email": "admin@x.com",
                    "role": "superadmin",
                    "username": "root"
                }
            }
        })
    );
}

#[tokio::test]
async fn login_email_is_case_insensitive() {
    let h = harness().await;
    let res = login(&h.state, "  Admin@X.com ", "Secret123", "10.0.0.2").await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_records_last_login() {
    let h = harness().await;
    assert_eq!(h.admin.last_login, None);

    let res = login(&h.state, "admin@x.com", "Secret123", "10.0.0.3").await;
    assert_eq!(res.status(), StatusCode::OK);

    let reloaded = principals::find_by_id(&h.state.db, h.admin.id)
        .await
        .unwrap()
        .unwrap();
    assert!(reloaded.last_login.is_some());
}

#[tokio::test]
async fn unknown_email_and_wrong_password_look_identical() {
    let h = harness().await;

    let unknown = login(&h.state, "ghost@x.com", "Secret123", "10.0.1.1").await;
    let wrong = login(&h.state, "admin@x.com", "Wrong-pass", "10.0.1.2").await;

    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert!(unknown.headers().get(header::SET_COOKIE).is_none());

    let a = body_bytes(unknown).await;
    let b = body_bytes(wrong).await;
    assert_eq!(a, b);

    let json: Value = serde_json::from_slice(&a).unwrap();
    assert_eq!(json, json!({ "success": false, "error": "Invalid email or password" }));
}

#[tokio::test]
async fn login_validation_errors_are_400() {
    let h = harness().await;

    let res = login(&h.state, "not-an-email", "Secret123", "10.0.2.1").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["error"], "Invalid email format");

    let res = login(&h.state, "", "", "10.0.2.2").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["error"], "Email and password are required");

    let res = login(&h.state, "admin@x.com", "abc", "10.0.2.3").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(res).await["error"],
        "Password must be at least 6 characters"
    );
}

#[tokio::test]
async fn unparsable_login_body_is_a_validation_error() {
    let h = harness().await;
    let req = request("POST", "/api/auth/login", "10.0.2.9")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from_static(b"{not json")))
        .unwrap();

    let res = send(&h.state, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn urlencoded_login_is_accepted() {
    let h = harness().await;
    let req = request("POST", "/api/auth/login", "10.0.2.10")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Full::new(Bytes::from_static(
            b"email=editor%40x.com&password=Secret123",
        )))
        .unwrap();

    let res = send(&h.state, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["data"]["user"]["role"], "editor");
}

#[tokio::test]
async fn sixth_attempt_in_window_is_rate_limited() {
    let h = harness().await;

    for _ in 0..5 {
        let res = login(&h.state, "admin@x.com", "Wrong-pass", "10.0.3.1").await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused once the window is spent.
    let res = login(&h.state, "admin@x.com", "Secret123", "10.0.3.1").await;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

    let retry_header: u64 = res.headers()[header::RETRY_AFTER]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_header > 0);

    let json = body_json(res).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Too many login attempts. Please try again later.");
    assert!(json["retryAfter"].as_u64().unwrap() > 0);

    // Another address has its own budget.
    let res = login(&h.state, "admin@x.com", "Secret123", "10.0.3.2").await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn instances_sharing_stores_share_one_login_budget() {
    let h = harness().await;

    let revocations = Arc::new(InMemoryRevocationStore::new());
    let limiter = Arc::new(RateLimiter::new(5, Duration::from_secs(15 * 60)));
    let instances = [
        AppState::with_stores(
            h.state.db.clone(),
            AppConfig::default(),
            SECRET,
            revocations.clone(),
            limiter.clone(),
        )
        .unwrap(),
        AppState::with_stores(
            h.state.db.clone(),
            AppConfig::default(),
            SECRET,
            revocations.clone(),
            limiter.clone(),
        )
        .unwrap(),
    ];

    let mut checked = 0;
    for i in 0..12 {
        let res = login(&instances[i % 2], "admin@x.com", "Wrong-pass", "10.0.3.9").await;
        match res.status() {
            StatusCode::UNAUTHORIZED => checked += 1,
            StatusCode::TOO_MANY_REQUESTS => {}
            other => panic!("unexpected status {}", other),
        }
    }
    assert_eq!(checked, 5);

    // A logout on one instance is seen by the other.
    let token = token_from(&login(&instances[0], "editor@x.com", "Secret123", "10.0.3.10").await);
    let res = send(
        &instances[0],
        empty(with_cookie(request("POST", "/api/auth/logout", "10.0.3.10"), &token)),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = send(
        &instances[1],
        empty(with_cookie(request("GET", "/api/auth/me", "10.0.3.10"), &token)),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn forwarded_for_is_ignored_without_trusted_proxy() {
    let h = harness().await;

    for i in 0..5 {
        let req = json_body(
            request("POST", "/api/auth/login", "10.0.4.1")
                .header("x-forwarded-for", format!("192.168.9.{}", i)),
            json!({ "email": "admin@x.com", "password": "Wrong-pass" }),
        );
        assert_eq!(send(&h.state, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    // Rotating the header did not buy new attempts.
    let req = json_body(
        request("POST", "/api/auth/login", "10.0.4.1").header("x-forwarded-for", "192.168.9.99"),
        json!({ "email": "admin@x.com", "password": "Secret123" }),
    );
    assert_eq!(send(&h.state, req).await.status(), StatusCode::TOO_MANY_REQUESTS);
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn current_session_reads_the_stored_principal() {
    let h = harness().await;
    let token = token_from(&login(&h.state, "editor@x.com", "Secret123", "10.0.5.1").await);

    let res = send(&h.state, empty(with_cookie(request("GET", "/api/auth/me", "10.0.5.1"), &token))).await;
    assert_eq!(res.status(), StatusCode::OK);

    let json = body_json(res).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["id"], h.editor.id);
    assert_eq!(json["data"]["username"], "writer");
    assert_eq!(json["data"]["email"], "editor@x.com");
    assert_eq!(json["data"]["role"], "editor");
    assert_eq!(json["data"]["createdAt"], h.editor.created_at);
}

#[tokio::test]
async fn bearer_header_is_accepted_without_cookie() {
    let h = harness().await;
    let token = token_from(&login(&h.state, "analyst@x.com", "Secret123", "10.0.5.2").await);

    let req = empty(
        request("GET", "/api/auth/me", "10.0.5.2")
            .header(header::AUTHORIZATION, format!("Bearer {}", token)),
    );
    let res = send(&h.state, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["data"]["id"], h.analyst.id);
}

#[tokio::test]
async fn missing_or_garbage_token_is_401() {
    let h = harness().await;

    let res = send(&h.state, empty(request("GET", "/api/auth/me", "10.0.5.3"))).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(res).await,
        json!({ "success": false, "error": "Authentication required" })
    );

    let res = send(
        &h.state,
        empty(with_cookie(request("GET", "/api/auth/me", "10.0.5.3"), "abc.def.ghi")),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_expires_exactly_one_day_after_issue() {
    let h = harness().await;

    let stale = h.state.issuer.issue_at(&h.admin, now() - ONE_DAY).unwrap();
    let res = send(
        &h.state,
        empty(with_cookie(request("GET", "/api/auth/me", "10.0.6.1"), &stale.token)),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let fresh = h.state.issuer.issue_at(&h.admin, now() - ONE_DAY + 60).unwrap();
    let res = send(
        &h.state,
        empty(with_cookie(request("GET", "/api/auth/me", "10.0.6.1"), &fresh.token)),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn session_outliving_its_account_is_404() {
    let h = harness().await;
    let token = token_from(&login(&h.state, "analyst@x.com", "Secret123", "10.0.6.2").await);

    sqlx::query("DELETE FROM users WHERE id = ?1")
        .bind(h.analyst.id)
        .execute(&h.state.db)
        .await
        .unwrap();

    let res = send(&h.state, empty(with_cookie(request("GET", "/api/auth/me", "10.0.6.2"), &token))).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(res).await["error"], "User not found");
}

// ---------------------------------------------------------------------------
// Logout
// ---------------------------------------------------------------------------

#[tokio::test]
async fn logged_out_token_cannot_be_replayed() {
    let h = harness().await;
    let token = token_from(&login(&h.state, "admin@x.com", "Secret123", "10.0.7.1").await);

    let res = send(
        &h.state,
        empty(with_cookie(request("POST", "/api/auth/logout", "10.0.7.1"), &token)),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await, json!({ "success": true }));

    let res = send(&h.state, empty(with_cookie(request("GET", "/api/auth/me", "10.0.7.1"), &token))).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Other sessions for the same principal survive.
    let other = token_from(&login(&h.state, "admin@x.com", "Secret123", "10.0.7.2").await);
    let res = send(&h.state, empty(with_cookie(request("GET", "/api/auth/me", "10.0.7.2"), &other))).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_expires_every_presented_cookie() {
    let h = harness().await;
    let token = token_from(&login(&h.state, "editor@x.com", "Secret123", "10.0.7.3").await);

    let req = empty(
        request("POST", "/api/auth/logout", "10.0.7.3")
            .header(header::COOKIE, format!("token={}; theme=dark; lang=id", token)),
    );
    let res = send(&h.state, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let cookies = set_cookies(&res);
    assert_eq!(cookies.len(), 3);
    for (cookie, name) in cookies.iter().zip(["token", "theme", "lang"]) {
        assert!(cookie.starts_with(&format!("{}=;", name)), "{}", cookie);
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
    }
}

#[tokio::test]
async fn logout_without_session_still_succeeds() {
    let h = harness().await;

    let res = send(&h.state, empty(request("GET", "/api/auth/logout", "10.0.7.4"))).await;
    assert_eq!(res.status(), StatusCode::OK);

    let cookies = set_cookies(&res);
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].starts_with("token=;"));
    assert_eq!(body_json(res).await, json!({ "success": true }));
}

// ---------------------------------------------------------------------------
// Role gate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn user_list_is_superadmin_only() {
    let h = harness().await;

    let res = send(&h.state, empty(request("GET", "/api/users", "10.0.8.1"))).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    for email in ["editor@x.com", "analyst@x.com"] {
        let token = token_from(&login(&h.state, email, "Secret123", "10.0.8.2").await);
        let res = send(&h.state, empty(with_cookie(request("GET", "/api/users", "10.0.8.2"), &token))).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(res).await,
            json!({ "success": false, "error": "Insufficient permissions" })
        );
    }

    let token = token_from(&login(&h.state, "admin@x.com", "Secret123", "10.0.8.3").await);
    let res = send(&h.state, empty(with_cookie(request("GET", "/api/users", "10.0.8.3"), &token))).await;
    assert_eq!(res.status(), StatusCode::OK);

    let json = body_json(res).await;
    let users = json["data"].as_array().unwrap();
    assert_eq!(users.len(), 3);
    for user in users {
        assert!(user.get("password_hash").is_none());
        assert!(user.get("passwordHash").is_none());
    }
}

#[tokio::test]
async fn forged_identity_header_is_ignored() {
    let h = harness().await;
    let forged = HeaderValue::from_static(
        r#"{"id":1,"username":"root","email":"admin@x.com","role":"superadmin"}"#,
    );

    let req = empty(request("GET", "/api/users", "10.0.9.1").header("x-session-claims", forged.clone()));
    assert_eq!(send(&h.state, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = empty(request("GET", "/admin", "10.0.9.1").header("x-session-claims", forged.clone()));
    let res = send(&h.state, req).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[header::LOCATION], "/login");

    // Nor can it upgrade a real analyst session.
    let token = token_from(&login(&h.state, "analyst@x.com", "Secret123", "10.0.9.2").await);
    let req = empty(
        with_cookie(request("GET", "/api/users", "10.0.9.2"), &token).header("x-session-claims", forged),
    );
    assert_eq!(send(&h.state, req).await.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dashboard_embeds_the_verified_identity() {
    let h = harness().await;
    let token = token_from(&login(&h.state, "analyst@x.com", "Secret123", "10.0.10.1").await);

    let res = send(&h.state, empty(with_cookie(request("GET", "/admin", "10.0.10.1"), &token))).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(
        res.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );

    let html = String::from_utf8(body_bytes(res).await.to_vec()).unwrap();
    assert!(html.contains(r#"<script id="initial-session" type="application/json">"#));
    assert!(html.contains(&format!(r#""id":{}"#, h.analyst.id)));
    assert!(html.contains(r#""username":"numbers""#));
    assert!(html.contains(r#""role":"analyst""#));
    assert!(!html.contains("<script src="));
}

#[tokio::test]
async fn login_page_is_public() {
    let h = harness().await;
    let res = send(&h.state, empty(request("GET", "/login", "10.0.10.2"))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(res).await.to_vec()).unwrap();
    assert!(html.contains("/api/auth/login"));
}

// ---------------------------------------------------------------------------
// User management
// ---------------------------------------------------------------------------

#[tokio::test]
async fn superadmin_provisions_a_user_who_can_log_in() {
    let h = harness().await;
    let token = token_from(&login(&h.state, "admin@x.com", "Secret123", "10.0.11.1").await);

    let new_user = json!({
        "email": "New.Editor@X.com",
        "username": "fresh_editor",
        "password": "Another123",
        "role": "editor"
    });

    let res = send(
        &h.state,
        json_body(with_cookie(request("POST", "/api/users", "10.0.11.1"), &token), new_user.clone()),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let json = body_json(res).await;
    assert_eq!(json["data"]["email"], "new.editor@x.com");
    assert_eq!(json["data"]["username"], "fresh_editor");
    assert_eq!(json["data"]["role"], "editor");
    assert_eq!(json["data"]["lastLogin"], Value::Null);

    let res = send(
        &h.state,
        json_body(with_cookie(request("POST", "/api/users", "10.0.11.1"), &token), new_user),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(res).await["success"], false);

    let res = login(&h.state, "new.editor@x.com", "Another123", "10.0.11.2").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["data"]["user"]["role"], "editor");
}

#[tokio::test]
async fn provisioning_rejects_bad_payloads() {
    let h = harness().await;
    let token = token_from(&login(&h.state, "admin@x.com", "Secret123", "10.0.11.3").await);

    let foreign_role = json!({
        "email": "k@x.com",
        "username": "kecamatan",
        "password": "Secret123",
        "role": "kecamatan_admin"
    });
    let res = send(
        &h.state,
        json_body(with_cookie(request("POST", "/api/users", "10.0.11.3"), &token), foreign_role),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let bad_email = json!({
        "email": "nope",
        "username": "someone",
        "password": "Secret123",
        "role": "analyst"
    });
    let res = send(
        &h.state,
        json_body(with_cookie(request("POST", "/api/users", "10.0.11.3"), &token), bad_email),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["error"], "Invalid email format");
}

#[tokio::test]
async fn editors_cannot_provision() {
    let h = harness().await;
    let token = token_from(&login(&h.state, "editor@x.com", "Secret123", "10.0.11.4").await);

    let res = send(
        &h.state,
        json_body(
            with_cookie(request("POST", "/api/users", "10.0.11.4"), &token),
            json!({
                "email": "sneaky@x.com",
                "username": "sneaky",
                "password": "Secret123",
                "role": "superadmin"
            }),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert!(
        principals::find_auth_by_email(&h.state.db, "sneaky@x.com")
            .await
            .unwrap()
            .is_none()
    );
}

// ---------------------------------------------------------------------------
// Transport edges
// ---------------------------------------------------------------------------

#[tokio::test]
async fn oversized_body_is_413() {
    let h = harness().await;
    let req = request("POST", "/api/auth/login", "10.0.12.1")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(vec![b'a'; MAX_BODY_BYTES + 1])))
        .unwrap();

    let res = send(&h.state, req).await;
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let h = harness().await;
    let res = send(&h.state, empty(request("GET", "/api/nowhere", "10.0.12.2"))).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(res).await,
        json!({ "success": false, "error": "Endpoint not found" })
    );

    // Right path, wrong method.
    let res = send(&h.state, empty(request("DELETE", "/api/users", "10.0.12.2"))).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
