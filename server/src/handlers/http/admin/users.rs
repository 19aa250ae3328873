use anyhow::{Context, Result};
use hyper::StatusCode;
use shared::types::{AccountSummary, ApiSuccess, NewAccount};
use tracing::{info, warn};

use crate::AppState;
use crate::auth::VerifiedSession;
use crate::database::accounts::{ProvisionError, provision_account};
use crate::database::principals;
use crate::handlers::http::utils::{deliver_error_json, deliver_serialized_json};
use crate::handlers::http::{ApiRequest, HttpResponse};

/// GET /api/users: every principal, newest first.
pub async fn handle_list_users(
    _req: ApiRequest,
    state: AppState,
    session: VerifiedSession,
) -> Result<HttpResponse> {
    info!("Serving user list to {}", session.username());

    let users: Vec<AccountSummary> = principals::list_principals(&state.db)
        .await
        .context("Failed to query user list")?
        .iter()
        .map(|p| p.to_summary())
        .collect();

    deliver_serialized_json(&ApiSuccess::new(users), StatusCode::OK)
}

/// POST /api/users: provision a new principal.
pub async fn handle_create_user(
    req: ApiRequest,
    state: AppState,
    session: VerifiedSession,
) -> Result<HttpResponse> {
    let account = match serde_json::from_slice::<NewAccount>(req.body()) {
        Ok(account) => account,
        Err(e) => {
            warn!("Rejected account payload: {}", e);
            return deliver_error_json(
                "Expected JSON with email, username, password and role",
                StatusCode::BAD_REQUEST,
            );
        }
    };

    let min_password_length = state.config.read().await.auth.min_password_length;

    match provision_account(&state.db, account, min_password_length).await {
        Ok(principal) => {
            info!(
                "{} created {} ({})",
                session.username(),
                principal.username,
                principal.role
            );
            deliver_serialized_json(&ApiSuccess::new(principal.to_summary()), StatusCode::CREATED)
        }
        Err(ProvisionError::Rejected(e)) => {
            warn!("Account rejected: {}", e.to_code());
            let status = if e.is_conflict() {
                StatusCode::CONFLICT
            } else {
                StatusCode::BAD_REQUEST
            };
            deliver_error_json(&e.to_message(), status)
        }
        Err(ProvisionError::Internal(e)) => Err(e.context("Failed to provision account")),
    }
}
