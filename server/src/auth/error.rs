use hyper::StatusCode;
use shared::types::Role;
use thiserror::Error;

/// Every way an authentication or authorization step can fail.
///
/// The variants keep the precise reason for logging. What the client sees
/// is collapsed: all token failures share one 401 message, and unknown email
/// vs. wrong password share another.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("rate limited; retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("no session token presented")]
    TokenMissing,

    #[error("malformed session token: {0}")]
    TokenMalformed(String),

    #[error("session token expired")]
    TokenExpired,

    #[error("session token revoked")]
    TokenRevoked,

    #[error("role {role} is not permitted for this operation")]
    Forbidden { role: Role },

    #[error("internal error: {0}")]
    Internal(String),
}

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";
pub const RATE_LIMITED_MESSAGE: &str = "Too many login attempts. Please try again later.";
pub const UNAUTHENTICATED_MESSAGE: &str = "Authentication required";
pub const FORBIDDEN_MESSAGE: &str = "Insufficient permissions";
pub const INTERNAL_MESSAGE: &str = "Internal server error";

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials
            | Self::TokenMissing
            | Self::TokenMalformed(_)
            | Self::TokenExpired
            | Self::TokenRevoked => StatusCode::UNAUTHORIZED,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code used in logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::TokenMissing => "TOKEN_MISSING",
            Self::TokenMalformed(_) => "TOKEN_MALFORMED",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// The message a client is allowed to see.
    pub fn client_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE.to_string(),
            Self::RateLimited { .. } => RATE_LIMITED_MESSAGE.to_string(),
            Self::TokenMissing | Self::TokenMalformed(_) | Self::TokenExpired | Self::TokenRevoked => {
                UNAUTHENTICATED_MESSAGE.to_string()
            }
            Self::Forbidden { .. } => FORBIDDEN_MESSAGE.to_string(),
            Self::Internal(_) => INTERNAL_MESSAGE.to_string(),
        }
    }

    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        }
    }

    /// True for the failures that mean "no valid session".
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            Self::TokenMissing | Self::TokenMalformed(_) | Self::TokenExpired | Self::TokenRevoked
        )
    }
}
