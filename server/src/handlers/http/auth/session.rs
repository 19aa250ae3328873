use anyhow::{Context, Result};
use hyper::StatusCode;
use shared::types::ApiSuccess;
use tracing::warn;

use crate::AppState;
use crate::auth::VerifiedSession;
use crate::database::principals;
use crate::handlers::http::utils::{deliver_error_json, deliver_serialized_json};
use crate::handlers::http::{ApiRequest, HttpResponse};

/// GET /api/auth/me
///
/// The principal behind the current session, freshly read from the store.
pub async fn handle_current_session(
    _req: ApiRequest,
    state: AppState,
    session: VerifiedSession,
) -> Result<HttpResponse> {
    let principal = principals::find_by_id(&state.db, session.principal_id())
        .await
        .context("Failed to load principal for session")?;

    match principal {
        Some(p) => deliver_serialized_json(&ApiSuccess::new(p.to_session_info()), StatusCode::OK),
        None => {
            warn!(
                "Session for principal {} outlived the account",
                session.principal_id()
            );
            deliver_error_json("User not found", StatusCode::NOT_FOUND)
        }
    }
}
