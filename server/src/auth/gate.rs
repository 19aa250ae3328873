use shared::types::Role;
use tracing::warn;

use super::error::AuthError;
use super::session::VerifiedSession;

/// Whether `role` is a member of `allowed`.
pub fn is_permitted(role: Role, allowed: &[Role]) -> bool {
    allowed.contains(&role)
}

/// Check a validated session against the roles an operation accepts.
///
/// Takes a [`VerifiedSession`] rather than raw claims: there is no way to
/// reach this check without having passed the validator first.
pub fn authorize(session: &VerifiedSession, allowed: &[Role]) -> Result<(), AuthError> {
    let role = session.role();
    if is_permitted(role, allowed) {
        return Ok(());
    }

    warn!(
        "Principal {} ({}) denied; allowed roles: {:?}",
        session.principal_id(),
        role,
        allowed
    );
    Err(AuthError::Forbidden { role })
}
