//! Authentication and authorization core.
//!
//! The flow for a protected request is always validator → gate → handler.
//! Login runs the credential verifier and then the issuer.

pub mod credentials;
pub mod error;
pub mod gate;
pub mod issuer;
pub mod policy;
pub mod revocation;
pub mod session;
pub mod validator;

pub use credentials::CredentialVerifier;
pub use error::AuthError;
pub use gate::authorize;
pub use issuer::{IssuedToken, TokenIssuer};
pub use revocation::{InMemoryRevocationStore, RevocationStore};
pub use session::{ForwardedIdentity, VerifiedSession};
pub use validator::TokenValidator;

/// `iss` claim of every session token.
pub const ISSUER: &str = "party-portal";

/// `aud` claim of every session token.
pub const AUDIENCE: &str = "party-portal-admin";
