use serde::{Deserialize, Serialize};

use crate::types::role::Role;

/// Claims embedded in every session token issued by the gateway.
///
/// The token itself is the only positive record of a session: the server
/// keeps no session row. Validity comes from the signature, `exp`, `iss` and
/// `aud`; invalidity before `exp` is recorded by revoking `jti`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Standard JWT subject: the principal id rendered as a string.
    pub sub: String,

    /// Numeric principal id (matches `users.id`).
    pub id: i64,

    /// Role at issuance. A role change only takes effect on the next login.
    pub role: Role,

    pub email: String,

    pub username: String,

    /// Issued-at (Unix timestamp, seconds).
    pub iat: i64,

    /// Expiry (Unix timestamp, seconds). The token is rejected from this
    /// second onwards.
    pub exp: i64,

    pub iss: String,

    pub aud: String,

    /// Random token id. This is the revocation handle: logout stores it
    /// instead of the raw token string.
    pub jti: String,
}
