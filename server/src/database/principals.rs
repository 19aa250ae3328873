use shared::types::{AccountSummary, LoginUser, Role, SessionInfo};
use sqlx::{FromRow, SqlitePool};
use tracing::info;

use crate::database::utils::get_timestamp;

/// An identity that can log in to the admin gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub created_at: i64,
    pub last_login: Option<i64>,
}

/// Principal plus the stored Argon2 hash, only used on the login path.
#[derive(Debug, Clone)]
pub struct PrincipalAuth {
    pub principal: Principal,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewPrincipal {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, FromRow)]
struct PrincipalRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: i64,
    last_login: Option<i64>,
}

impl PrincipalRow {
    fn into_auth(self) -> Result<PrincipalAuth, sqlx::Error> {
        let role = self
            .role
            .parse::<Role>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(PrincipalAuth {
            principal: Principal {
                id: self.id,
                email: self.email,
                username: self.username,
                role,
                created_at: self.created_at,
                last_login: self.last_login,
            },
            password_hash: self.password_hash,
        })
    }
}

impl Principal {
    pub fn to_login_user(&self) -> LoginUser {
        LoginUser {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
            username: self.username.clone(),
        }
    }

    pub fn to_session_info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }

    pub fn to_summary(&self) -> AccountSummary {
        AccountSummary {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
            role: self.role,
            created_at: self.created_at,
            last_login: self.last_login,
        }
    }
}

const SELECT_PRINCIPAL: &str =
    "SELECT id, username, email, password_hash, role, created_at, last_login FROM users";

/// Get authentication data by (already normalised) email.
pub async fn find_auth_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<PrincipalAuth>, sqlx::Error> {
    let row = sqlx::query_as::<_, PrincipalRow>(&format!("{} WHERE email = ?1", SELECT_PRINCIPAL))
        .bind(email)
        .fetch_optional(pool)
        .await?;

    row.map(PrincipalRow::into_auth).transpose()
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Principal>, sqlx::Error> {
    let row = sqlx::query_as::<_, PrincipalRow>(&format!("{} WHERE id = ?1", SELECT_PRINCIPAL))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(PrincipalRow::into_auth).transpose()?.map(|a| a.principal))
}

/// All principals, newest first.
pub async fn list_principals(pool: &SqlitePool) -> Result<Vec<Principal>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PrincipalRow>(&format!(
        "{} ORDER BY created_at DESC, id DESC",
        SELECT_PRINCIPAL
    ))
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|r| r.into_auth().map(|a| a.principal))
        .collect()
}

/// Insert a principal and return its id.
pub async fn insert_principal(pool: &SqlitePool, new: NewPrincipal) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO users (username, email, password_hash, role, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(&new.username)
    .bind(&new.email)
    .bind(&new.password_hash)
    .bind(new.role.as_str())
    .bind(get_timestamp())
    .execute(pool)
    .await?;

    info!("Principal created: {} ({})", new.username, new.role);
    Ok(result.last_insert_rowid())
}

pub async fn email_exists(pool: &SqlitePool, email: &str) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?1")
        .bind(email)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn username_exists(pool: &SqlitePool, username: &str) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ?1")
        .bind(username)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Update last login timestamp
pub async fn update_last_login(pool: &SqlitePool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET last_login = ?1 WHERE id = ?2")
        .bind(get_timestamp())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
