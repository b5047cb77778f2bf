//! Server configuration parsed from environment variables.
//!
//! Every knob has a default except the ones that select a backend:
//! - `DATABASE_URL`: absent → in-memory store
//! - `CLOSET_USER_ID`: the signed-in user for the Postgres store

use std::time::Duration;

use uuid::Uuid;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_CATALOG_SYNC_RETRIES: usize = 2;
pub const DEFAULT_CATALOG_SYNC_RETRY_BASE_MS: u64 = 200;

/// Parse `key` from the environment, falling back to `default` when the
/// variable is absent or unparsable.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Retry policy for remote catalog inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPolicy {
    /// Deadline for each remote call.
    pub timeout: Duration,
    /// Additional attempts after the first failure.
    pub retries: usize,
    /// Linear back-off step between attempts.
    pub retry_base: Duration,
}

impl SyncPolicy {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            timeout: Duration::from_millis(env_parse("REMOTE_TIMEOUT_MS", DEFAULT_REMOTE_TIMEOUT_MS)),
            retries: env_parse("CATALOG_SYNC_RETRIES", DEFAULT_CATALOG_SYNC_RETRIES),
            retry_base: Duration::from_millis(env_parse(
                "CATALOG_SYNC_RETRY_BASE_MS",
                DEFAULT_CATALOG_SYNC_RETRY_BASE_MS,
            )),
        }
    }
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_REMOTE_TIMEOUT_MS),
            retries: DEFAULT_CATALOG_SYNC_RETRIES,
            retry_base: Duration::from_millis(DEFAULT_CATALOG_SYNC_RETRY_BASE_MS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub user_id: Option<Uuid>,
    pub sync: SyncPolicy,
}

impl AppConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            port: env_parse("PORT", DEFAULT_PORT),
            database_url: std::env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty()),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            user_id: std::env::var("CLOSET_USER_ID")
                .ok()
                .and_then(|v| Uuid::parse_str(v.trim()).ok()),
            sync: SyncPolicy::from_env(),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
