use std::str::FromStr;
use std::time::Duration;

use crate::auth::cookie::{CookieConfig, SameSite, DEFAULT_COOKIE_NAME};
use crate::auth::jwt::JwtConfig;
use crate::auth::SessionPolicy;

/// Reasons the server refuses to start.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Which [`SessionStore`](sentinel_db::store::SessionStore) and
/// [`UserDirectory`](sentinel_db::store::UserDirectory) implementation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    /// In-process maps. State is lost on restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("expected 'postgres' or 'memory', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Primary database. Required for [`StorageBackend::Postgres`].
    pub database_url: Option<String>,
    /// Read replica. Reads use the primary when unset.
    pub replica_url: Option<String>,
    pub max_connections: u32,
}

/// Server configuration loaded from environment variables.
///
/// Everything except `JWT_SECRET` (and `DATABASE_URL` for the Postgres
/// backend) has a default suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub storage: StorageConfig,
    /// Signing secret and issuer, injected into the token codec once.
    pub jwt: JwtConfig,
    /// Token/session lifetime and the per-call store deadline.
    pub session: SessionPolicy,
    pub cookie: CookieConfig,
    /// Period of the expired-session sweep. `None` disables the sweep.
    pub sweep_interval: Option<Duration>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                 |
    /// |-------------------------------|-------------------------|
    /// | `HOST`                        | `0.0.0.0`               |
    /// | `PORT`                        | `3000`                  |
    /// | `CORS_ORIGINS`                | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                    |
    /// | `STORAGE_BACKEND`             | `postgres`              |
    /// | `DATABASE_URL`                | required for postgres   |
    /// | `DATABASE_REPLICA_URL`        | unset                   |
    /// | `DATABASE_MAX_CONNECTIONS`    | `20`                    |
    /// | `JWT_SECRET`                  | required                |
    /// | `JWT_ISSUER`                  | `sentinel`              |
    /// | `SESSION_TTL_HOURS`           | `24`                    |
    /// | `STORE_TIMEOUT_MS`            | `5000`                  |
    /// | `AUTH_COOKIE_NAME`            | `auth_token`            |
    /// | `COOKIE_SECURE`               | `false`                 |
    /// | `COOKIE_SAME_SITE`            | `Lax`                   |
    /// | `SESSION_SWEEP_INTERVAL_SECS` | `3600` (`0` disables)   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] but reading keys through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_or(&var, "PORT", 3000)?;

        let cors_origins: Vec<String> = var("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            if origin.parse::<axum::http::HeaderValue>().is_err() {
                return Err(invalid("CORS_ORIGINS", origin, "not a valid header value"));
            }
        }

        let request_timeout_secs: u64 = parse_or(&var, "REQUEST_TIMEOUT_SECS", 30)?;

        let backend: StorageBackend = parse_or(&var, "STORAGE_BACKEND", StorageBackend::Postgres)?;
        let database_url = var("DATABASE_URL");
        if backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        let storage = StorageConfig {
            backend,
            database_url,
            replica_url: var("DATABASE_REPLICA_URL"),
            max_connections: parse_or(&var, "DATABASE_MAX_CONNECTIONS", 20)?,
        };

        let jwt = JwtConfig {
            secret: var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            issuer: var("JWT_ISSUER").unwrap_or_else(|| "sentinel".into()),
        };

        let ttl_hours: i64 = parse_or(&var, "SESSION_TTL_HOURS", 24)?;
        if ttl_hours <= 0 {
            return Err(invalid(
                "SESSION_TTL_HOURS",
                &ttl_hours.to_string(),
                "must be greater than zero",
            ));
        }
        let store_timeout_ms: u64 = parse_or(&var, "STORE_TIMEOUT_MS", 5000)?;
        let session = SessionPolicy {
            ttl: chrono::Duration::hours(ttl_hours),
            store_timeout: Duration::from_millis(store_timeout_ms),
        };

        let cookie = CookieConfig {
            name: var("AUTH_COOKIE_NAME").unwrap_or_else(|| DEFAULT_COOKIE_NAME.into()),
            secure: parse_or(&var, "COOKIE_SECURE", false)?,
            same_site: parse_or(&var, "COOKIE_SAME_SITE", SameSite::Lax)?,
        };

        let sweep_secs: u64 = parse_or(&var, "SESSION_SWEEP_INTERVAL_SECS", 3600)?;
        let sweep_interval = (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs));

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            storage,
            jwt,
            session,
            cookie,
            sweep_interval,
        })
    }
}

fn parse_or<T, V>(var: &V, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    V: Fn(&str) -> Option<String>,
{
    match var(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(key, &raw, &e.to_string())),
    }
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
