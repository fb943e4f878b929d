//! Access grant issuance and validation.
//!
//! A grant is an opaque bearer token bound to exactly one result record,
//! valid for a short window after a successful credential check. The token
//! is redeemed at the view and download endpoints; each redemption
//! revalidates from the store, so expiry takes effect immediately with no
//! per-request caching.
//!
//! # Token Construction
//!
//! 32 bytes from the process CSPRNG, hex encoded (64 characters, 256 bits
//! of entropy). Tokens are stored and compared verbatim; there is no
//! prefix or fuzzy matching anywhere.

use crate::{
    db::DbPool,
    error::{AppError, DenialReason},
    models::{access_grant::AccessGrant, result_record::ResultRecord},
};
use chrono::{Duration, Utc};
use uuid::Uuid;

/// Generate a fresh grant token.
///
/// # Output
///
/// 64 hex characters (32 random bytes)
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// Mint a grant scoped to one result.
///
/// # Preconditions
///
/// `result_id` must reference an existing result; the caller (the verify
/// handler) has just looked it up. Issuance does not re-check.
///
/// # Process
///
/// 1. Generate the token
/// 2. Compute `expires_at = now + ttl_seconds`
/// 3. Insert the grant as a single row (atomic; no partial grant can exist)
///
/// The token is returned inside the grant and is not logged here.
///
/// # Errors
///
/// - `Database`: insert failed; nothing was persisted
pub async fn issue(
    pool: &DbPool,
    result_id: Uuid,
    ttl_seconds: i64,
) -> Result<AccessGrant, AppError> {
    let token = generate_token();
    let issued_at = Utc::now();
    let expires_at = issued_at + Duration::seconds(ttl_seconds);

    let grant = sqlx::query_as::<_, AccessGrant>(
        r#"
        INSERT INTO access_grants (token, result_id, issued_at, expires_at)
        VALUES ($1, $2, $3, $4)
        RETURNING token, result_id, issued_at, expires_at
        "#,
    )
    .bind(&token)
    .bind(result_id)
    .bind(issued_at)
    .bind(expires_at)
    .fetch_one(pool)
    .await?;

    tracing::debug!(%result_id, %expires_at, "Issued access grant");

    Ok(grant)
}

/// Validate a presented token and resolve the result it is bound to.
///
/// Runs on every protected read. Checks, in order:
///
/// 1. A grant row exists for the token (exact match)
/// 2. The grant has not expired (`now >= expires_at` counts as expired)
/// 3. If `expected_result_id` is supplied (the download path passes the id
///    from the URL), it equals the grant's bound id
/// 4. The bound result row still exists
///
/// All four failures surface as `AccessDenied` with one uniform client
/// response; the reason is kept for server-side logs only.
///
/// # Errors
///
/// - `AccessDenied`: any of the four checks failed
/// - `Database`: store unreachable or query failed
pub async fn validate(
    pool: &DbPool,
    token: &str,
    expected_result_id: Option<Uuid>,
) -> Result<(AccessGrant, ResultRecord), AppError> {
    let grant = sqlx::query_as::<_, AccessGrant>(
        "SELECT token, result_id, issued_at, expires_at FROM access_grants WHERE token = $1",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| denied(DenialReason::UnknownToken, None))?;

    if grant.is_expired_at(Utc::now()) {
        return Err(denied(DenialReason::Expired, Some(grant.result_id)));
    }

    if let Some(expected) = expected_result_id {
        if !grant.covers(expected) {
            return Err(denied(DenialReason::ScopeMismatch, Some(grant.result_id)));
        }
    }

    let record = sqlx::query_as::<_, ResultRecord>(
        r#"
        SELECT id, student_name, exam_number, pin, file_path, original_filename, created_at
        FROM results
        WHERE id = $1
        "#,
    )
    .bind(grant.result_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| denied(DenialReason::RecordMissing, Some(grant.result_id)))?;

    Ok((grant, record))
}

/// Log the denial server-side and build the uniform client error.
///
/// The token itself is never written to the log, only the rejection cause
/// and, where known, the result the grant was bound to.
fn denied(reason: DenialReason, result_id: Option<Uuid>) -> AppError {
    match result_id {
        Some(id) => {
            tracing::warn!(reason = reason.as_str(), result_id = %id, "Rejected access grant")
        }
        None => tracing::warn!(reason = reason.as_str(), "Rejected access grant"),
    }
    AppError::AccessDenied(reason)
}

/// Delete grants whose expiry has passed.
///
/// Called by the background sweeper; validation never depends on this
/// having run, it only keeps the table from accumulating dead rows.
pub async fn sweep_expired(pool: &DbPool) -> Result<u64, sqlx::Error> {
    let deleted = sqlx::query("DELETE FROM access_grants WHERE expires_at <= NOW()")
        .execute(pool)
        .await?
        .rows_affected();

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tokens_are_64_hex_characters() {
        let token = generate_token();

        assert_eq!(token.len(), 64);
        assert!(hex::decode(&token).is_ok());
        // Verbatim storage and comparison: nothing in a token can run into
        // whitespace-insensitive column equality.
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn tokens_do_not_repeat() {
        // 256 bits of entropy: any collision in a small sample means the
        // random source is broken, not unlucky.
        let tokens: HashSet<String> = (0..1000).map(|_| generate_token()).collect();

        assert_eq!(tokens.len(), 1000);
    }
}
