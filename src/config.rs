//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `UPLOAD_DIR` (optional): directory for uploaded result files, defaults to "uploads"
/// - `GRANT_TTL_SECONDS` (optional): lifetime of a result access token, defaults to 300
/// - `ADMIN_SESSION_TTL_SECONDS` (optional): lifetime of an admin login session, defaults to 10800 (3 hours)
/// - `SWEEP_INTERVAL_SECONDS` (optional): how often expired grants and sessions are purged, defaults to 300
/// - `ADMIN_USERNAME` (optional): username seeded on first start, defaults to "admin"
/// - `ADMIN_PASSWORD` (optional): if set and no admin exists yet, an admin account is seeded at startup
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    /// Access grants are meant for "retrieve your result right now",
    /// so the default window is deliberately short.
    #[serde(default = "default_grant_ttl")]
    pub grant_ttl_seconds: i64,

    #[serde(default = "default_admin_session_ttl")]
    pub admin_session_ttl_seconds: i64,

    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,

    #[serde(default = "default_admin_username")]
    pub admin_username: String,

    #[serde(default)]
    pub admin_password: Option<String>,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_grant_ttl() -> i64 {
    300
}

fn default_admin_session_ttl() -> i64 {
    10_800
}

fn default_sweep_interval() -> u64 {
    300
}

fn default_admin_username() -> String {
    "admin".to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Parse environment variables into Config struct
        // Field names are automatically converted: database_url -> DATABASE_URL
        envy::from_env::<Config>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        assert_eq!(default_port(), 3000);
        assert_eq!(default_grant_ttl(), 300);
        assert_eq!(default_admin_session_ttl(), 10_800);
        assert_eq!(default_upload_dir(), "uploads");
    }
}
