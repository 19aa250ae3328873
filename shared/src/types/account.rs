use serde::{Deserialize, Serialize};

use crate::types::role::Role;

/// Input for provisioning a new principal.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// Principal as listed by the user-management endpoint. Never carries the
/// password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub role: Role,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    #[serde(rename = "lastLogin")]
    pub last_login: Option<i64>,
}

/// Reasons a provisioning request is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    UsernameTaken,
    EmailTaken,
    InvalidUsername,
    InvalidPassword(usize),
    InvalidEmail,
}

impl AccountError {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::UsernameTaken => "USERNAME_TAKEN",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::InvalidUsername => "INVALID_USERNAME",
            Self::InvalidPassword(_) => "INVALID_PASSWORD",
            Self::InvalidEmail => "INVALID_EMAIL",
        }
    }

    pub fn to_message(&self) -> String {
        match self {
            Self::UsernameTaken => "Username is already taken".to_string(),
            Self::EmailTaken => "Email is already registered".to_string(),
            Self::InvalidUsername => {
                "Username must be 3-32 characters, alphanumeric, underscores, or hyphens only"
                    .to_string()
            }
            Self::InvalidPassword(min) => {
                format!("Password must be at least {} characters", min)
            }
            Self::InvalidEmail => "Invalid email format".to_string(),
        }
    }

    /// Whether the rejection is a conflict with existing data rather than
    /// malformed input.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::UsernameTaken | Self::EmailTaken)
    }
}
