use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;
use http_body_util::{BodyExt, Limited};
use hyper::body::Body;
use hyper::{Method, Request, StatusCode};
use shared::types::Role;
use tracing::{debug, error, warn};

use crate::AppState;
use crate::auth::policy::{DASHBOARD_VIEWERS, USER_ADMINS};
use crate::auth::{AuthError, VerifiedSession, authorize, session};
use crate::handlers::http::utils::{
    deliver_auth_error, deliver_error_json, deliver_html, extract_session_token, internal_error,
    redirect,
};
use crate::handlers::http::{ApiRequest, HttpResponse, admin, auth};

/// Largest request body the gateway reads.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Handler type aliases
// ---------------------------------------------------------------------------
//
// Three tiers:
//
//   RouteHandler    no auth. Receives (req, state).
//                   Use for: login, logout, the login page.
//
//   GuardedHandler  token validated, then the role gate. Receives
//                   (req, state, session). Failures answer with JSON.
//
//   PageHandler     same checks as Guarded, for server-rendered pages. The
//                   session is attached to the request extensions and
//                   unauthenticated browsers are redirected to /login.

type HandlerFuture = Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send>>;

type RouteHandler = Box<dyn Fn(ApiRequest, AppState) -> HandlerFuture + Send + Sync>;

type GuardedHandler =
    Box<dyn Fn(ApiRequest, AppState, VerifiedSession) -> HandlerFuture + Send + Sync>;

enum RouteKind {
    Open(RouteHandler),

    Guarded {
        allowed: &'static [Role],
        handler: GuardedHandler,
    },

    Page {
        allowed: &'static [Role],
        handler: RouteHandler,
    },
}

struct Route {
    method: Method,
    path: String,
    kind: RouteKind,
}

pub struct Router {
    routes: Vec<Route>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes_count", &self.routes.len())
            .finish()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    fn open<F, Fut>(mut self, method: Method, path: &str, handler: F) -> Self
    where
        F: Fn(ApiRequest, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            kind: RouteKind::Open(Box::new(move |req, state| Box::pin(handler(req, state)))),
        });
        self
    }

    fn guarded<F, Fut>(
        mut self,
        method: Method,
        path: &str,
        allowed: &'static [Role],
        handler: F,
    ) -> Self
    where
        F: Fn(ApiRequest, AppState, VerifiedSession) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            kind: RouteKind::Guarded {
                allowed,
                handler: Box::new(move |req, state, session| Box::pin(handler(req, state, session))),
            },
        });
        self
    }

    // ── Open (no auth) ────────────────────────────────────────────────────────

    pub fn get<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(ApiRequest, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.open(Method::GET, path, handler)
    }

    pub fn post<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(ApiRequest, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.open(Method::POST, path, handler)
    }

    // ── Guarded (validator, then role gate) ──────────────────────────────────
    //
    // The router validates the token and checks the role before the handler
    // runs. Handlers receive the `VerifiedSession` and never repeat either
    // check.

    pub fn get_guarded<F, Fut>(self, path: &str, allowed: &'static [Role], handler: F) -> Self
    where
        F: Fn(ApiRequest, AppState, VerifiedSession) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.guarded(Method::GET, path, allowed, handler)
    }

    pub fn post_guarded<F, Fut>(self, path: &str, allowed: &'static [Role], handler: F) -> Self
    where
        F: Fn(ApiRequest, AppState, VerifiedSession) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.guarded(Method::POST, path, allowed, handler)
    }

    // ── Pages ─────────────────────────────────────────────────────────────────

    pub fn get_page<F, Fut>(mut self, path: &str, allowed: &'static [Role], handler: F) -> Self
    where
        F: Fn(ApiRequest, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.routes.push(Route {
            method: Method::GET,
            path: path.to_string(),
            kind: RouteKind::Page {
                allowed,
                handler: Box::new(move |req, state| Box::pin(handler(req, state))),
            },
        });
        self
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    /// Entry point for a raw request: strips client-supplied identity,
    /// reads the body under [`MAX_BODY_BYTES`], then routes.
    ///
    /// Never fails; handler errors become a logged, generic 500.
    pub async fn dispatch<B>(&self, req: Request<B>, state: AppState) -> HttpResponse
    where
        B: Body + Send,
        B::Data: Send,
        B::Error: std::error::Error + Send + Sync + 'static,
    {
        let (mut parts, body) = req.into_parts();
        session::strip_untrusted_identity(&mut parts.headers);

        let body = match Limited::new(body, MAX_BODY_BYTES).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!("Rejected request body for {}: {}", parts.uri.path(), e);
                return deliver_error_json(
                    "Request body too large or unreadable",
                    StatusCode::PAYLOAD_TOO_LARGE,
                )
                .unwrap_or_else(|_| internal_error());
            }
        };

        let method = parts.method.clone();
        let path = parts.uri.path().to_string();

        match self.route(Request::from_parts(parts, body), state).await {
            Ok(response) => response,
            Err(e) => {
                error!("Handler for {} {} failed: {:#}", method, path, e);
                internal_error()
            }
        }
    }

    pub async fn route(&self, mut req: ApiRequest, state: AppState) -> Result<HttpResponse> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        let Some(route) = self
            .routes
            .iter()
            .find(|r| r.method == method && Self::path_matches(&r.path, &path))
        else {
            debug!("No route for {} {}", method, path);
            return deliver_error_json("Endpoint not found", StatusCode::NOT_FOUND)
                .context("Failed to deliver 404 response");
        };

        match &route.kind {
            RouteKind::Open(h) => h(req, state).await,

            RouteKind::Guarded { allowed, handler } => {
                match Self::check(&req, &state, allowed).await {
                    Ok(session) => handler(req, state, session).await,
                    Err(e) => {
                        warn!("Guarded route {} {} refused", method, path);
                        deliver_auth_error(&e)
                    }
                }
            }

            RouteKind::Page { allowed, handler } => {
                match Self::check(&req, &state, allowed).await {
                    Ok(session) => {
                        session::attach(&mut req, session);
                        handler(req, state).await
                    }
                    Err(e) if e.is_unauthenticated() => {
                        debug!("Page {} needs a session: {}", path, e);
                        redirect("/login")
                    }
                    Err(e @ AuthError::Forbidden { .. }) => {
                        warn!("Page {} refused: {}", path, e);
                        deliver_html(
                            "<!doctype html><title>Forbidden</title><p>Insufficient permissions</p>"
                                .to_string(),
                            StatusCode::FORBIDDEN,
                        )
                    }
                    Err(e) => deliver_auth_error(&e),
                }
            }
        }
    }

    /// Validator first, gate second. An unauthenticated request never
    /// reaches the role check.
    async fn check(
        req: &ApiRequest,
        state: &AppState,
        allowed: &[Role],
    ) -> std::result::Result<VerifiedSession, AuthError> {
        let token = extract_session_token(req.headers());
        let session = state.validator.validate(token.as_deref()).await?;
        authorize(&session, allowed)?;
        Ok(session)
    }

    // ── Path matching ─────────────────────────────────────────────────────────

    /// Exact path comparison, ignoring any query string.
    pub fn path_matches(route_path: &str, request_path: &str) -> bool {
        let clean = request_path.split('?').next().unwrap_or(request_path);
        route_path == clean
    }
}

// ---------------------------------------------------------------------------
// Gateway routes
//
// Auth tier is enforced here at the routing level. Handlers MUST NOT repeat
// the validation or role check.
// ---------------------------------------------------------------------------

pub fn build_router() -> Router {
    Router::new()
        // ── Public ───────────────────────────────────────────────────────────
        .post("/api/auth/login", |req, state| async move {
            auth::handle_login(req, state).await.context("Login failed")
        })
        .post("/api/auth/logout", |req, state| async move {
            auth::handle_logout(req, state).await.context("Logout failed")
        })
        .get("/api/auth/logout", |req, state| async move {
            auth::handle_logout(req, state).await.context("Logout failed")
        })
        .get("/login", |req, state| async move {
            admin::handle_login_page(req, state)
                .await
                .context("Login page failed")
        })
        // ── Any signed-in principal ──────────────────────────────────────────
        .get_guarded("/api/auth/me", &Role::ALL, |req, state, session| async move {
            auth::handle_current_session(req, state, session)
                .await
                .context("Session query failed")
        })
        // ── User management ──────────────────────────────────────────────────
        .get_guarded("/api/users", USER_ADMINS, |req, state, session| async move {
            admin::handle_list_users(req, state, session)
                .await
                .context("List users failed")
        })
        .post_guarded("/api/users", USER_ADMINS, |req, state, session| async move {
            admin::handle_create_user(req, state, session)
                .await
                .context("Create user failed")
        })
        // ── Pages ────────────────────────────────────────────────────────────
        .get_page("/admin", DASHBOARD_VIEWERS, |req, state| async move {
            admin::handle_dashboard(req, state)
                .await
                .context("Dashboard render failed")
        })
}

/// Shared router for the accept loop.
pub fn shared_router() -> Arc<Router> {
    Arc::new(build_router())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
