use serde::{Deserialize, Serialize};

use crate::types::role::Role;

// ---------------------------------------------------------------------------
// Login wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginData {
    pub email: String,
    pub password: String,
}

/// Public view of the principal returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub username: String,
}

/// `data` member of a successful login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginPayload {
    pub user: LoginUser,
}
