//! Database connection pool and migration management.
//!
//! This module provides utilities for:
//! - Creating and managing a PostgreSQL connection pool
//! - Running database migrations automatically
//! - Seeding the initial administrator account

use std::time::Duration;

use sha2::{Digest, Sha256};
use sqlx::{Pool, Postgres};

/// Type alias for PostgreSQL connection pool.
///
/// Instead of writing `Pool<Postgres>` everywhere, we can use `DbPool`.
pub type DbPool = Pool<Postgres>;

/// Create a new PostgreSQL connection pool.
///
/// A connection pool maintains multiple database connections that can be reused across HTTP requests which is much more efficient than opening a new connection for each request.
///
/// # Arguments
///
/// * `database_url` - PostgreSQL connection string
///
/// # Configuration
///
/// - Maximum connections: 5
/// - Acquisition timeout: 5 seconds, so a fully drained pool surfaces
///   as a storage error instead of hanging the request indefinitely
///
/// # Errors
///
/// Returns an error if:
/// - Database connection string is invalid
/// - Cannot connect to PostgreSQL server
/// - Database authentication fails
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        // Limit concurrent connections
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

/// Run database migrations from the `migrations/` directory.
///
/// This function executes all SQL migration files in order. Migrations are tracked in a special `_sqlx_migrations` table, so each migration runs only once.
///
/// # Arguments
///
/// * `pool` - Database connection pool
///
/// # Migration Files
///
/// Migration files must be in `migrations/` directory with format:
/// - `<timestamp>_<name>.sql` (e.g., `20250815000001_create_admins.sql`)
///
/// # Errors
///
/// Returns an error if:
/// - Migration files cannot be read
/// - SQL syntax errors in migration files
/// - Database errors during migration execution
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    // The macro reads migrations at compile time from ./migrations directory
    sqlx::migrate!("./migrations").run(pool).await
}

/// Seed the initial administrator account if none exists.
///
/// Runs once at startup. If the `admins` table is empty and an
/// `ADMIN_PASSWORD` was configured, inserts an admin with the configured
/// username and the SHA-256 hash of the password. If the table already has
/// rows, or no password was configured, this is a no-op.
pub async fn seed_default_admin(
    pool: &DbPool,
    username: &str,
    password: Option<&str>,
) -> Result<(), sqlx::Error> {
    let admin_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
        .fetch_one(pool)
        .await?;

    if admin_count > 0 {
        tracing::info!("Admin account present, skipping seed");
        return Ok(());
    }

    let Some(password) = password else {
        tracing::warn!("No admin account exists and ADMIN_PASSWORD is not set; admin endpoints will be unusable");
        return Ok(());
    };

    let password_hash = hex::encode(Sha256::digest(password.as_bytes()));

    sqlx::query("INSERT INTO admins (username, password_hash) VALUES ($1, $2)")
        .bind(username)
        .bind(password_hash)
        .execute(pool)
        .await?;

    tracing::info!(username, "Seeded initial admin account");
    Ok(())
}
