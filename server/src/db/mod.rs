//! Database initialization and migration runner.
//!
//! Startup uses this module to create the shared SQLx pool and apply schema
//! migrations before the HTTP listener opens. The pool connects lazily: an
//! unreachable database is logged and left to the remote-call paths, which
//! degrade to empty and default state.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

/// Build the `PostgreSQL` pool without connecting, then try the migrations.
///
/// A failed migration is logged, not returned.
///
/// # Errors
///
/// Returns an error only if `database_url` cannot be parsed.
pub async fn init_pool(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect_lazy(database_url)?;

    match sqlx::migrate!("src/db/migrations").run(&pool).await {
        Ok(()) => info!("database migrations applied"),
        Err(e) => warn!(error = %e, "database migrations failed; remote calls will degrade until it is reachable"),
    }

    Ok(pool)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
