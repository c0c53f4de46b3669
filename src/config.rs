// src/config.rs
use crate::error::{AppError, AppResult};
use std::{env, fmt::Display, net::SocketAddr, str::FromStr};

/// Runtime settings, read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub session_ttl_hours: i64,
    pub secure_cookies: bool,
    pub bootstrap_coordinator: Option<BootstrapAccount>,
}

/// First coordinator account, created at startup when none exists.
#[derive(Debug, Clone)]
pub struct BootstrapAccount {
    pub email: String,
    pub password: String,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;
        let bootstrap_coordinator = match (
            env::var("BOOTSTRAP_COORDINATOR_EMAIL"),
            env::var("BOOTSTRAP_COORDINATOR_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) => Some(BootstrapAccount { email, password }),
            _ => None,
        };

        Ok(Self {
            database_url,
            bind_addr: try_load("BIND_ADDR", "0.0.0.0:3000")?,
            session_ttl_hours: try_load("SESSION_TTL_HOURS", "24")?,
            secure_cookies: try_load("SECURE_COOKIES", "false")?,
            bootstrap_coordinator,
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> AppResult<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        tracing::info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse().map_err(|e: T::Err| {
        tracing::error!("Invalid {key} value '{raw}': {e}");
        AppError::InvalidRequest(format!("invalid value for {key}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_keys_fall_back_to_default() {
        let port: SocketAddr = try_load("TUTORING_TEST_UNSET_ADDR", "127.0.0.1:8080").unwrap();
        assert_eq!(port.port(), 8080);
    }

    #[test]
    fn unparsable_default_is_an_error() {
        let parsed: AppResult<i64> = try_load("TUTORING_TEST_UNSET_NUMBER", "not-a-number");
        assert!(parsed.is_err());
    }
}
