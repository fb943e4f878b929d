//! Results Portal - Main Application Entry Point
//!
//! This is a REST API server for a school results portal. Administrators
//! upload student result files; students exchange their exam number + PIN
//! for a short-lived access token and redeem it to view or download their
//! own result.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Student access**: opaque bearer tokens, 300 second default TTL,
//!   revalidated against the store on every protected read
//! - **Admin access**: bearer session tokens minted at login
//! - **Format**: JSON requests/responses, streamed file downloads
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations and seed the initial admin
//! 4. Ensure the upload directory exists
//! 5. Spawn the expired-grant sweeper
//! 6. Build HTTP router with routes and middleware
//! 7. Start server on configured port

mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod services;
mod state;

use tracing_subscriber::EnvFilter;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use state::AppState;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    // Seed the first admin account if configured and absent
    db::seed_default_admin(&pool, &config.admin_username, config.admin_password.as_deref()).await?;

    // Uploaded result files land here
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    // Reclaim expired grants and sessions in the background
    services::sweeper::spawn(pool.clone(), config.sweep_interval_seconds);

    let state = AppState {
        pool,
        config: config.clone(),
    };

    // Admin routes behind the session middleware (login stays public)
    let admin_routes = Router::new()
        .route("/api/admin/logout", post(handlers::admin::logout))
        .route("/api/admin/upload", post(handlers::admin::upload_result))
        .route("/api/admin/results", get(handlers::admin::list_results))
        // Apply authentication middleware to all routes in this group
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    // Combine admin routes with public routes
    let app = Router::new()
        // Public routes (no session required)
        .route("/health", get(handlers::health::health_check))
        .route("/api/admin/login", post(handlers::admin::login))
        // Student flow: credential check, then token-gated view/download
        .route("/api/student/verify", post(handlers::student::verify_result))
        .route("/view-result", get(handlers::student::view_result))
        .route("/download/{id}", get(handlers::student::download_result))
        // Merge admin routes
        .merge(admin_routes)
        // Add distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        // The portal frontend is served from a different origin
        .layer(CorsLayer::permissive())
        // Share state with all handlers via State extraction
        .with_state(state);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Serve until interrupted; shutdown drains in-flight requests
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolve when the process receives Ctrl-C / SIGINT.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "Failed to listen for shutdown signal");
    }
}
