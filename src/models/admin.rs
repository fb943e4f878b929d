//! Administrator account and login session models.
//!
//! Admins authenticate with username + password once, then carry a bearer
//! session token on every subsequent request. Only the SHA-256 hash of the
//! session token is stored, mirroring how the password itself is stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents an administrator record from the database.
///
/// # Database Table
///
/// Maps to the `admins` table with columns:
/// - `id`: Unique identifier (UUID)
/// - `username`: Login name, unique
/// - `password_hash`: SHA-256 hex digest of the password
/// - `created_at`: When the account was created
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Admin {
    pub id: Uuid,

    pub username: String,

    /// SHA-256 hash of the password (64 hex characters)
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
}

/// Represents an admin login session from the database.
///
/// Maps to the `admin_sessions` table. The client holds the raw token; the
/// row holds only its hash, so leaked rows grant nothing.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminSession {
    /// SHA-256 hash of the bearer session token
    pub token_hash: String,

    /// The admin this session belongs to
    pub admin_id: Uuid,

    pub issued_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,
}

/// Request body for admin login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,

    pub password: String,
}

/// Response body for a successful admin login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token for the Authorization header of admin requests.
    /// Shown once; only its hash is stored.
    pub token: String,

    /// Absolute expiry of the session
    pub expires_at: DateTime<Utc>,
}
