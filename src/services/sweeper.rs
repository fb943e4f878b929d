//! Background sweep of expired grants and admin sessions.
//!
//! Expired rows are already unusable (every validation re-checks expiry
//! against the store); the sweep only reclaims storage. It runs on a fixed
//! interval for the lifetime of the process.

use std::time::Duration;

use crate::{db::DbPool, services::grant_service};
use tokio::task::JoinHandle;

/// Spawn the periodic sweep task.
///
/// Errors are logged and the loop keeps going; a transient store failure
/// must not kill the sweeper for the rest of the process lifetime.
pub fn spawn(pool: DbPool, interval_seconds: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_seconds));
        // The first tick fires immediately, clearing anything left over
        // from a previous run.
        loop {
            ticker.tick().await;

            match grant_service::sweep_expired(&pool).await {
                Ok(deleted) if deleted > 0 => {
                    tracing::debug!(deleted, "Swept expired access grants")
                }
                Ok(_) => {}
                Err(err) => tracing::warn!(%err, "Access grant sweep failed"),
            }

            match sweep_expired_sessions(&pool).await {
                Ok(deleted) if deleted > 0 => {
                    tracing::debug!(deleted, "Swept expired admin sessions")
                }
                Ok(_) => {}
                Err(err) => tracing::warn!(%err, "Admin session sweep failed"),
            }
        }
    })
}

/// Delete admin sessions whose expiry has passed.
async fn sweep_expired_sessions(pool: &DbPool) -> Result<u64, sqlx::Error> {
    let deleted = sqlx::query("DELETE FROM admin_sessions WHERE expires_at <= NOW()")
        .execute(pool)
        .await?
        .rows_affected();

    Ok(deleted)
}
