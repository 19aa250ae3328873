use serde::{Deserialize, Serialize};

use crate::types::role::Role;

/// Body of the current-session query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    /// Account creation time (Unix timestamp, seconds).
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}
