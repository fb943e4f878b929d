//! Shared application state handed to every handler.

use crate::{config::Config, db::DbPool};

/// State injected into handlers and middleware via Axum's `State` extractor.
///
/// Cloning is cheap: the pool is internally reference-counted and the
/// config is a small owned struct cloned once per request at most.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool, shared across all requests
    pub pool: DbPool,

    /// Immutable configuration loaded at startup
    pub config: Config,
}
