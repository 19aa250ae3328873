use std::time::Duration;

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use shared::types::SessionClaims;
use tracing::debug;

use super::error::AuthError;
use super::{AUDIENCE, ISSUER};
use crate::database::principals::Principal;
use crate::database::utils::get_timestamp;

/// Signs session tokens for verified principals.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    lifetime: Duration,
}

/// A freshly signed token and the claims inside it.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: SessionClaims,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(secret: &[u8], lifetime: Duration) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::Internal("signing secret must be non-empty".into()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            lifetime,
        })
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn issue(&self, principal: &Principal) -> Result<IssuedToken, AuthError> {
        self.issue_at(principal, get_timestamp())
    }

    /// Sign a token as if issued at `now` (Unix seconds).
    pub fn issue_at(&self, principal: &Principal, now: i64) -> Result<IssuedToken, AuthError> {
        let exp = i64::try_from(self.lifetime.as_secs())
            .ok()
            .and_then(|secs| now.checked_add(secs))
            .ok_or_else(|| AuthError::Internal("token lifetime out of range".into()))?;

        let claims = SessionClaims {
            sub: principal.id.to_string(),
            id: principal.id,
            role: principal.role,
            email: principal.email.clone(),
            username: principal.username.clone(),
            iat: now,
            exp,
            iss: ISSUER.to_string(),
            aud: AUDIENCE.to_string(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("failed to sign session token: {}", e)))?;

        debug!(
            "Issued token for principal {} (jti={}, exp={})",
            claims.id, claims.jti, claims.exp
        );

        Ok(IssuedToken { token, claims })
    }
}
