use std::fs;
use tracing::{debug, error, info};

use crate::types::server_config::{
    AppConfig, ConfigError, MAX_DURATION_MINUTES, MIN_JWT_SECRET_LEN,
};

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    info!("Loading configuration from: {}", path);

    let contents = fs::read_to_string(path)?;
    debug!("Processing file: {}", path);

    let config = parse_config(&contents)?;
    validate_config(&config, config.auth.resolved_jwt_secret().as_deref())?;

    info!("Config validated");

    Ok(config)
}

/// Parse a TOML document into an `AppConfig` without validating it.
pub fn parse_config(contents: &str) -> Result<AppConfig, ConfigError> {
    if contents.trim().is_empty() {
        error!("Configuration file is empty");
        return Err(ConfigError::InvalidConfig("empty file".into()));
    }

    let config: AppConfig = toml::from_str(contents)?;
    info!("Configuration loaded successfully");

    Ok(config)
}

/// Reject configurations the server must not start with. `secret` is the
/// already-resolved signing secret (env var or file field).
pub fn validate_config(config: &AppConfig, secret: Option<&str>) -> Result<(), ConfigError> {
    if config.auth.token_expiry_minutes == 0 {
        return Err(ConfigError::InvalidConfig(
            "token_expiry_minutes must be greater than 0".into(),
        ));
    }

    if config.auth.login_max_attempts == 0 {
        return Err(ConfigError::InvalidConfig(
            "login_max_attempts must be greater than 0".into(),
        ));
    }

    if config.auth.login_window_minutes == 0 {
        return Err(ConfigError::InvalidConfig(
            "login_window_minutes must be greater than 0".into(),
        ));
    }

    if config.auth.token_expiry_minutes > MAX_DURATION_MINUTES {
        return Err(ConfigError::InvalidConfig(format!(
            "token_expiry_minutes must be at most {}",
            MAX_DURATION_MINUTES
        )));
    }

    if config.auth.login_window_minutes > MAX_DURATION_MINUTES {
        return Err(ConfigError::InvalidConfig(format!(
            "login_window_minutes must be at most {}",
            MAX_DURATION_MINUTES
        )));
    }

    if config.server.request_timeout_secs == 0 {
        return Err(ConfigError::InvalidConfig(
            "request_timeout_secs must be greater than 0".into(),
        ));
    }

    if config.server.max_connections == 0 {
        return Err(ConfigError::InvalidConfig(
            "max_connections must be greater than 0".into(),
        ));
    }

    if config.database.url.is_empty() {
        return Err(ConfigError::InvalidConfig("database.url cannot be empty".into()));
    }

    // Running unsigned or weakly signed is never acceptable, so a missing or
    // short secret stops startup here.
    match secret {
        None => {
            return Err(ConfigError::InvalidConfig(
                "jwt_secret must be set via the JWT_SECRET env var or auth.jwt_secret config field"
                    .into(),
            ));
        }
        Some(s) if s.len() < MIN_JWT_SECRET_LEN => {
            return Err(ConfigError::InvalidConfig(format!(
                "jwt_secret must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            )));
        }
        _ => {}
    }

    Ok(())
}
