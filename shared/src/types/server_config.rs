use serde::Deserialize;
use thiserror::Error;

/// Environment variable holding the token signing secret.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// Minimum accepted signing secret length, in bytes.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Upper bound for `token_expiry_minutes` and `login_window_minutes`: one year.
pub const MAX_DURATION_MINUTES: u64 = 365 * 24 * 60;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Honour `X-Forwarded-For` / `X-Real-IP` / `X-Forwarded-Proto`. Only
    /// enable behind a reverse proxy that overwrites these headers.
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

#[derive(Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(default = "default_token_expiry")]
    pub token_expiry_minutes: u64,
    /// HMAC key used to sign and verify session tokens.
    ///
    /// Prefer loading this via the `JWT_SECRET` environment variable. This
    /// field is the fallback for deployments that cannot inject env vars.
    ///
    /// **Minimum length:** 32 characters.
    pub jwt_secret: Option<String>,
    #[serde(default = "default_login_max_attempts")]
    pub login_max_attempts: u32,
    #[serde(default = "default_login_window")]
    pub login_window_minutes: u64,
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
    #[serde(default = "default_revocation_sweep")]
    pub revocation_sweep_secs: u64,
    #[serde(default = "default_rate_limit_sweep")]
    pub login_rate_limit_sweep_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

impl ServerConfig {
    /// Full bind address, e.g. `"127.0.0.1:3000"`
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl AuthConfig {
    /// Token lifetime in seconds, also the cookie `Max-Age`.
    pub fn token_expiry_secs(&self) -> u64 {
        self.token_expiry_minutes.saturating_mul(60)
    }

    pub fn login_window_secs(&self) -> u64 {
        self.login_window_minutes.saturating_mul(60)
    }

    /// Resolve the signing secret with the `JWT_SECRET` env var taking
    /// priority over the config file field.
    ///
    /// Returns `None` when neither source is set; startup treats this as
    /// fatal.
    pub fn resolved_jwt_secret(&self) -> Option<String> {
        pick_secret(std::env::var(JWT_SECRET_ENV).ok(), self.jwt_secret.as_deref())
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_expiry_minutes", &self.token_expiry_minutes)
            .field(
                "jwt_secret",
                &self.jwt_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("login_max_attempts", &self.login_max_attempts)
            .field("login_window_minutes", &self.login_window_minutes)
            .field("min_password_length", &self.min_password_length)
            .field("revocation_sweep_secs", &self.revocation_sweep_secs)
            .field(
                "login_rate_limit_sweep_secs",
                &self.login_rate_limit_sweep_secs,
            )
            .finish()
    }
}

fn pick_secret(env_value: Option<String>, file_value: Option<&str>) -> Option<String> {
    env_value
        .filter(|s| !s.is_empty())
        .or_else(|| file_value.map(str::to_string))
        .filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Serde defaults
// ---------------------------------------------------------------------------

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            max_connections: default_max_connections(),
            request_timeout_secs: default_request_timeout(),
            trust_proxy_headers: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_expiry_minutes: default_token_expiry(),
            jwt_secret: None,
            login_max_attempts: default_login_max_attempts(),
            login_window_minutes: default_login_window(),
            min_password_length: default_min_password_length(),
            revocation_sweep_secs: default_revocation_sweep(),
            login_rate_limit_sweep_secs: default_rate_limit_sweep(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

pub fn default_bind() -> String {
    "127.0.0.1".to_string()
}

pub fn default_port() -> u16 {
    3000
}

pub fn default_max_connections() -> usize {
    1000
}

pub fn default_request_timeout() -> u64 {
    30
}

/// 24 hours.
pub fn default_token_expiry() -> u64 {
    24 * 60
}

pub fn default_login_max_attempts() -> u32 {
    5
}

pub fn default_login_window() -> u64 {
    15
}

pub fn default_min_password_length() -> usize {
    6
}

pub fn default_revocation_sweep() -> u64 {
    300
}

pub fn default_rate_limit_sweep() -> u64 {
    60
}

pub fn default_database_url() -> String {
    "sqlite://gateway.db?mode=rwc".to_string()
}
