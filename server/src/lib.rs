pub mod auth;
pub mod database;
pub mod handlers;
pub mod security;
pub mod server;
pub mod tower_middle;

use std::sync::Arc;
use std::time::Duration;

use shared::config::LiveConfig;
use shared::types::server_config::AppConfig;
use sqlx::SqlitePool;

use crate::auth::{
    AuthError, CredentialVerifier, InMemoryRevocationStore, RevocationStore, TokenIssuer,
    TokenValidator,
};
use crate::security::{LoginLimiter, RateLimiter};

/// Everything a request handler needs, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: LiveConfig,
    pub issuer: Arc<TokenIssuer>,
    pub validator: Arc<TokenValidator>,
    pub verifier: CredentialVerifier,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("issuer", &self.issuer)
            .field("verifier", &self.verifier)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Build the state with an in-process revocation store.
    pub fn new(db: SqlitePool, config: AppConfig, secret: &str) -> Result<Self, AuthError> {
        Self::with_revocation_store(db, config, secret, Arc::new(InMemoryRevocationStore::new()))
    }

    pub fn with_revocation_store(
        db: SqlitePool,
        config: AppConfig,
        secret: &str,
        revocations: Arc<dyn RevocationStore>,
    ) -> Result<Self, AuthError> {
        let limiter = Arc::new(RateLimiter::new(
            config.auth.login_max_attempts,
            Duration::from_secs(config.auth.login_window_secs()),
        ));
        Self::with_stores(db, config, secret, revocations, limiter)
    }

    /// Build the state around externally owned stores. Instances that share
    /// both stores share logouts and the login attempt budget.
    pub fn with_stores(
        db: SqlitePool,
        config: AppConfig,
        secret: &str,
        revocations: Arc<dyn RevocationStore>,
        limiter: Arc<dyn LoginLimiter>,
    ) -> Result<Self, AuthError> {
        let auth = &config.auth;

        let issuer = TokenIssuer::new(
            secret.as_bytes(),
            Duration::from_secs(auth.token_expiry_secs()),
        )?;
        let validator = TokenValidator::new(secret.as_bytes(), revocations)?;
        let verifier = CredentialVerifier::new(limiter, auth.min_password_length);

        Ok(Self {
            db,
            config: LiveConfig::new(config),
            issuer: Arc::new(issuer),
            validator: Arc::new(validator),
            verifier,
        })
    }
}
