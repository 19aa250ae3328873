use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{debug, error, warn};

use super::error::AuthError;
use crate::database::principals::{self, Principal};
use crate::database::utils::{
    dummy_password_hash, is_valid_email, meets_min_length, normalize_email, verify_password,
};
use crate::security::{LoginLimiter, RateDecision};

/// Rate-limit scope for login attempts; keys look like `login:<ip>`.
pub const LOGIN_SCOPE: &str = "login";

pub fn login_key(client: &str) -> String {
    format!("{}:{}", LOGIN_SCOPE, client)
}

/// Turns an email and password into a [`Principal`], or refuses.
#[derive(Clone)]
pub struct CredentialVerifier {
    limiter: Arc<dyn LoginLimiter>,
    min_password_length: usize,
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("min_password_length", &self.min_password_length)
            .finish_non_exhaustive()
    }
}

impl CredentialVerifier {
    pub fn new(limiter: Arc<dyn LoginLimiter>, min_password_length: usize) -> Self {
        Self {
            limiter,
            min_password_length,
        }
    }

    pub fn limiter(&self) -> &Arc<dyn LoginLimiter> {
        &self.limiter
    }

    /// Verify a login attempt from `client` (usually the caller's IP).
    ///
    /// Every call consumes one attempt before anything else happens, so an
    /// abusive client is turned away without touching the database.
    pub async fn verify(
        &self,
        db: &SqlitePool,
        email: &str,
        password: &str,
        client: &str,
    ) -> Result<Principal, AuthError> {
        let key = login_key(client);
        let decision = self.limiter.check(&key).await;
        if let Some(retry_after_secs) = decision.retry_after_secs() {
            warn!("Login rate limit hit for {}", key);
            return Err(AuthError::RateLimited { retry_after_secs });
        }
        if let RateDecision::Allowed { remaining } = decision {
            debug!("Login attempt for {} ({} remaining)", key, remaining);
        }

        let email = normalize_email(email);
        self.validate_input(&email, password)?;

        let auth = principals::find_auth_by_email(db, &email)
            .await
            .map_err(|e| {
                error!("Database error looking up {}: {}", email, e);
                AuthError::Internal(format!("principal lookup failed: {}", e))
            })?;

        // Unknown emails are still run through Argon2 against a dummy hash so
        // both failure paths cost the same.
        let hash = auth
            .as_ref()
            .map(|a| a.password_hash.clone())
            .unwrap_or_else(|| dummy_password_hash().to_string());
        let password = password.to_string();

        let matched = tokio::task::spawn_blocking(move || verify_password(&hash, &password))
            .await
            .map_err(|e| AuthError::Internal(format!("password verification task failed: {}", e)))?
            .map_err(|e| {
                error!("Stored password hash unusable for {}: {}", email, e);
                AuthError::Internal(e.to_string())
            })?;

        match auth {
            Some(auth) if matched => {
                debug!("Credentials accepted for principal {}", auth.principal.id);
                Ok(auth.principal)
            }
            Some(_) => {
                warn!("Wrong password for {}", email);
                Err(AuthError::InvalidCredentials)
            }
            None => {
                warn!("Login attempt for unknown email {}", email);
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    fn validate_input(&self, email: &str, password: &str) -> Result<(), AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Email and password are required".into(),
            ));
        }
        if !is_valid_email(email) {
            return Err(AuthError::Validation("Invalid email format".into()));
        }
        if !meets_min_length(password, self.min_password_length) {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                self.min_password_length
            )));
        }
        Ok(())
    }
}
