use shared::types::{AccountError, NewAccount};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::database::principals::{self, NewPrincipal, Principal};
use crate::database::utils::{
    hash_password, is_valid_email, is_valid_username, meets_min_length, normalize_email,
};

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("{}", .0.to_message())]
    Rejected(AccountError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<AccountError> for ProvisionError {
    fn from(e: AccountError) -> Self {
        Self::Rejected(e)
    }
}

fn validate(account: &NewAccount, min_password_length: usize) -> Result<(), AccountError> {
    if !is_valid_email(&account.email) {
        return Err(AccountError::InvalidEmail);
    }
    if !is_valid_username(&account.username) {
        return Err(AccountError::InvalidUsername);
    }
    if !meets_min_length(&account.password, min_password_length) {
        return Err(AccountError::InvalidPassword(min_password_length));
    }
    Ok(())
}

/// Validate, hash and store a new principal.
pub async fn provision_account(
    pool: &SqlitePool,
    mut account: NewAccount,
    min_password_length: usize,
) -> Result<Principal, ProvisionError> {
    account.email = normalize_email(&account.email);
    account.username = account.username.trim().to_string();
    validate(&account, min_password_length)?;

    if principals::username_exists(pool, &account.username)
        .await
        .map_err(anyhow::Error::from)?
    {
        warn!("Username already taken: {}", account.username);
        return Err(AccountError::UsernameTaken.into());
    }
    if principals::email_exists(pool, &account.email)
        .await
        .map_err(anyhow::Error::from)?
    {
        warn!("Email already registered: {}", account.email);
        return Err(AccountError::EmailTaken.into());
    }

    let password = std::mem::take(&mut account.password);
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(anyhow::Error::from)??;

    let id = principals::insert_principal(
        pool,
        NewPrincipal {
            email: account.email.clone(),
            username: account.username.clone(),
            password_hash,
            role: account.role,
        },
    )
    .await
    .map_err(|e| {
        // Lost a race with a concurrent insert of the same email/username.
        if let Some(db) = e.as_database_error() {
            if db.is_unique_violation() {
                return if db.message().contains("users.username") {
                    ProvisionError::Rejected(AccountError::UsernameTaken)
                } else {
                    ProvisionError::Rejected(AccountError::EmailTaken)
                };
            }
        }
        error!("Database error creating principal: {}", e);
        ProvisionError::Internal(e.into())
    })?;

    let principal = principals::find_by_id(pool, id)
        .await
        .map_err(anyhow::Error::from)?
        .ok_or_else(|| anyhow::anyhow!("principal {} vanished after insert", id))?;

    info!("Provisioned {} ({}) as {}", principal.username, principal.id, principal.role);
    Ok(principal)
}
