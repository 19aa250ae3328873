use anyhow::{Context, Result, anyhow};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{self, HeaderValue};
use hyper::{Response, StatusCode};
use serde::Serialize;
use shared::types::ErrorResponse;
use tracing::{debug, error, info, warn};

use crate::auth::AuthError;
use crate::auth::error::INTERNAL_MESSAGE;
use crate::handlers::http::{HttpBody, HttpResponse};

pub fn full<T: Into<Bytes>>(chunk: T) -> HttpBody {
    Full::new(chunk.into()).boxed()
}

/// Serialize any `Serialize` type and deliver it as a JSON response.
pub fn deliver_serialized_json<T: Serialize>(data: &T, status: StatusCode) -> Result<HttpResponse> {
    let json = serde_json::to_string(data).context("Failed to serialize response")?;

    debug!("Delivering serialized JSON response, size: {} bytes", json.len());

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(full(json))
        .map_err(|e| anyhow!("Failed to build JSON response: {}", e))
}

/// `{"success": false, "error": message}` with the given status.
pub fn deliver_error_json(message: &str, status: StatusCode) -> Result<HttpResponse> {
    deliver_serialized_json(&ErrorResponse::new(message), status)
}

/// Map an [`AuthError`] onto its response.
///
/// The precise reason goes to the log; the client only gets the collapsed
/// message. Rate-limited responses carry the hint both as `retryAfter` and
/// as a `Retry-After` header.
pub fn deliver_auth_error(err: &AuthError) -> Result<HttpResponse> {
    match err {
        AuthError::Internal(detail) => error!("{}: {}", err.code(), detail),
        AuthError::Validation(_) => info!("{}: {}", err.code(), err),
        _ => warn!("{}: {}", err.code(), err),
    }

    let mut body = ErrorResponse::new(&err.client_message());
    if let Some(secs) = err.retry_after_secs() {
        body = body.with_retry_after(secs);
    }

    let mut response = deliver_serialized_json(&body, err.status())?;
    if let Some(secs) = err.retry_after_secs() {
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(secs));
    }
    Ok(response)
}

/// Generic 500 built without any fallible step, for use when building the
/// real response has itself failed.
pub fn internal_error() -> HttpResponse {
    let body = format!(r#"{{"success":false,"error":"{}"}}"#, INTERNAL_MESSAGE);
    let mut response = Response::new(full(body));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

pub fn deliver_html(html: String, status: StatusCode) -> Result<HttpResponse> {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .header(header::CACHE_CONTROL, "no-store")
        .body(full(html))
        .map_err(|e| anyhow!("Failed to build HTML response: {}", e))
}

/// 303 See Other to `location`.
pub fn redirect(location: &str) -> Result<HttpResponse> {
    Response::builder()
        .status(StatusCode::SEE_OTHER)
        .header(header::LOCATION, location)
        .body(full(Bytes::new()))
        .map_err(|e| anyhow!("Failed to build redirect: {}", e))
}
