//! Carrying a validated identity through the rest of a request.
//!
//! [`VerifiedSession`] can only be built by the token validator, so holding
//! one is proof that signature, expiry and revocation were checked. Handlers
//! receive it directly; server-rendered pages read it from the request
//! extensions. Identity never travels in a header: any inbound
//! [`FORWARDED_IDENTITY_HEADER`] is stripped before routing so a client
//! cannot impersonate the validator.

use hyper::Request;
use hyper::header::HeaderMap;
use serde::Serialize;
use shared::types::{Role, SessionClaims};
use tracing::warn;

/// Header name a fronting proxy or client might use to smuggle identity.
/// Never trusted; removed on ingress.
pub const FORWARDED_IDENTITY_HEADER: &str = "x-session-claims";

/// Identity whose token passed validation during this request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedSession {
    claims: SessionClaims,
}

/// The small claim set handed to rendering code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardedIdentity {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl VerifiedSession {
    /// Only the validator may vouch for a token.
    pub(super) fn from_validated(claims: SessionClaims) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &SessionClaims {
        &self.claims
    }

    pub fn principal_id(&self) -> i64 {
        self.claims.id
    }

    pub fn role(&self) -> Role {
        self.claims.role
    }

    pub fn username(&self) -> &str {
        &self.claims.username
    }

    pub fn forwarded_identity(&self) -> ForwardedIdentity {
        ForwardedIdentity {
            id: self.claims.id,
            username: self.claims.username.clone(),
            email: self.claims.email.clone(),
            role: self.claims.role,
        }
    }
}

/// Attach the session to the request so downstream rendering can read it
/// without validating the token again.
pub fn attach<B>(req: &mut Request<B>, session: VerifiedSession) {
    req.extensions_mut().insert(session);
}

/// The session attached by the router, if this request went through a
/// guarded route.
pub fn from_request<B>(req: &Request<B>) -> Option<&VerifiedSession> {
    req.extensions().get::<VerifiedSession>()
}

/// Remove client-supplied identity headers. Returns whether one was present.
pub fn strip_untrusted_identity(headers: &mut HeaderMap) -> bool {
    let present = headers.remove(FORWARDED_IDENTITY_HEADER).is_some();
    if present {
        warn!(
            "Dropped client-supplied {} header",
            FORWARDED_IDENTITY_HEADER
        );
    }
    present
}
