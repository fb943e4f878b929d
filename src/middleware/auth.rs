//! Admin session authentication middleware.
//!
//! This middleware intercepts every admin request to:
//! 1. Extract the session token from the Authorization header
//! 2. Hash it and verify an unexpired session exists in the database
//! 3. Inject the session context into the request
//! 4. Reject unauthorized requests with HTTP 401
//!
//! Student-facing routes never pass through here; their only credential is
//! the result access token, which is validated per-request by the grant
//! validator instead.

use crate::{error::AppError, models::admin::AdminSession, state::AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Session context attached to authenticated admin requests.
///
/// This struct is inserted into the request's extension map and can be
/// extracted by route handlers to know who made the request.
#[derive(Debug, Clone)]
pub struct AdminContext {
    /// ID of the authenticated admin
    pub admin_id: Uuid,

    /// SHA-256 hash of the presented session token.
    ///
    /// Kept so the logout handler can delete exactly this session.
    pub session_token_hash: String,
}

/// Admin session authentication middleware function.
///
/// # Flow
///
/// 1. Extract `Authorization: Bearer <token>` header from request
/// 2. Hash the `<token>` using SHA-256
/// 3. Query database for a matching session that has not expired
/// 4. If found: inject `AdminContext` into request, call next handler
/// 5. If not found: return 401 Unauthorized error
///
/// Expiry is checked in the query itself (`expires_at > NOW()`), so a
/// session that lapsed between requests is rejected without any cleanup
/// having to run first.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Step 1: Extract Authorization header
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    // Step 2: Extract Bearer token
    // Expected format: "Bearer <session token>"
    let session_token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    // Step 3: Hash the token; only the hash is stored server-side
    let token_hash = hex::encode(Sha256::digest(session_token.as_bytes()));

    // Step 4: Lookup an unexpired session for this hash
    let session = sqlx::query_as::<_, AdminSession>(
        "SELECT token_hash, admin_id, issued_at, expires_at
         FROM admin_sessions
         WHERE token_hash = $1 AND expires_at > NOW()",
    )
    .bind(&token_hash)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::Unauthorized)?;

    // Step 5: Inject context into request extensions
    // Route handlers can now extract this using Extension<AdminContext>
    request.extensions_mut().insert(AdminContext {
        admin_id: session.admin_id,
        session_token_hash: session.token_hash,
    });

    // Step 6: Call the next middleware/handler
    Ok(next.run(request).await)
}
