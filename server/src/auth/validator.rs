use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use shared::types::SessionClaims;
use tracing::{debug, info};

use super::error::AuthError;
use super::revocation::RevocationStore;
use super::session::VerifiedSession;
use super::{AUDIENCE, ISSUER};
use crate::database::utils::get_timestamp;

/// Checks signature, issuer, audience, expiry and revocation of session
/// tokens, in that order.
pub struct TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
    revocations: Arc<dyn RevocationStore>,
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator").finish_non_exhaustive()
    }
}

impl TokenValidator {
    pub fn new(secret: &[u8], revocations: Arc<dyn RevocationStore>) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::Internal("signing secret must be non-empty".into()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_audience(&[AUDIENCE]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        // Expiry is checked below against our own clock. A token is dead
        // from the second `exp` names.
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            revocations,
        })
    }

    pub fn revocations(&self) -> &Arc<dyn RevocationStore> {
        &self.revocations
    }

    pub async fn validate(&self, token: Option<&str>) -> Result<VerifiedSession, AuthError> {
        self.validate_at(token, get_timestamp()).await
    }

    /// Validate `token` as of `now` (Unix seconds).
    pub async fn validate_at(
        &self,
        token: Option<&str>,
        now: i64,
    ) -> Result<VerifiedSession, AuthError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::TokenMissing)?;

        let claims = self.decode(token)?;

        if now >= claims.exp {
            return Err(AuthError::TokenExpired);
        }

        if self.revocations.is_revoked(&claims.jti, now).await {
            return Err(AuthError::TokenRevoked);
        }

        debug!("Token valid for principal {} ({})", claims.id, claims.role);
        Ok(VerifiedSession::from_validated(claims))
    }

    /// Signature, issuer and audience only.
    fn decode(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::TokenMalformed(e.to_string()))?;

        let claims = data.claims;
        if claims.jti.is_empty() || claims.sub != claims.id.to_string() {
            return Err(AuthError::TokenMalformed("inconsistent claims".into()));
        }

        Ok(claims)
    }

    /// Revoke the token behind `session` until its natural expiry.
    pub async fn revoke(&self, session: &VerifiedSession) {
        let claims = session.claims();
        self.revocations.revoke(&claims.jti, claims.exp).await;
        info!(
            "Revoked token {} for principal {}",
            claims.jti, claims.id
        );
    }
}
