//! Credential verifier - exam number + PIN lookup.
//!
//! The (exam_number, pin) pair is the only student-facing credential. The
//! verifier resolves it to at most one result record, which is handed to
//! the grant issuer and never to the network client.
//!
//! # Information Leakage
//!
//! A failed check returns the same error whether the exam number was
//! unknown or the PIN was wrong. PIN comparison happens in-process on
//! SHA-256 digests rather than in the SQL WHERE clause, so equality
//! checking does not leak pin-prefix timing and the attempted PIN never
//! appears in query logs.

use crate::{db::DbPool, error::AppError, models::result_record::ResultRecord};
use sha2::{Digest, Sha256};

/// Reject empty or whitespace-only credentials before touching the store.
///
/// Saves a round-trip on garbage input and keeps "field missing" from being
/// observable as a different store-access pattern than "field wrong".
pub fn require_credentials(exam_number: &str, pin: &str) -> Result<(), AppError> {
    if exam_number.trim().is_empty() || pin.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "examNumber and pin are required".to_string(),
        ));
    }
    Ok(())
}

/// Constant-time-ish PIN equality.
///
/// Both sides are hashed and the fixed-width digests compared, so the time
/// taken is independent of where the first differing character sits.
pub fn pins_match(stored: &str, presented: &str) -> bool {
    let stored_digest = Sha256::digest(stored.as_bytes());
    let presented_digest = Sha256::digest(presented.as_bytes());
    stored_digest == presented_digest
}

/// Verify an exam number + PIN pair against the results table.
///
/// # Process
///
/// 1. Reject empty input without any store access
/// 2. Fetch candidate rows by exam number, newest first
/// 3. Compare PINs in-process; the first match wins
/// 4. Write a best-effort audit row (exam number and outcome, never the PIN)
///
/// # Duplicate Pairs
///
/// Nothing stops the same (exam number, PIN) pair from being uploaded
/// twice. The newest-first ordering makes selection deterministic: the
/// most recently uploaded result wins, so corrected re-uploads shadow
/// their predecessors.
///
/// # Errors
///
/// - `InvalidRequest`: either field empty or missing
/// - `InvalidCredentials`: no row matched, uniform for both failure modes
/// - `Database`: store unreachable or query failed
pub async fn verify(
    pool: &DbPool,
    exam_number: &str,
    pin: &str,
    client_ip: Option<&str>,
) -> Result<ResultRecord, AppError> {
    require_credentials(exam_number, pin)?;

    let candidates = sqlx::query_as::<_, ResultRecord>(
        r#"
        SELECT id, student_name, exam_number, pin, file_path, original_filename, created_at
        FROM results
        WHERE exam_number = $1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(exam_number)
    .fetch_all(pool)
    .await?;

    let matched = candidates
        .into_iter()
        .find(|record| pins_match(&record.pin, pin));

    record_attempt(pool, exam_number, client_ip, matched.is_some()).await;

    matched.ok_or(AppError::InvalidCredentials)
}

/// Append an access-attempt audit row.
///
/// Best effort: a failing audit write is logged and swallowed, it never
/// fails the lookup itself.
async fn record_attempt(pool: &DbPool, exam_number: &str, client_ip: Option<&str>, matched: bool) {
    let outcome = sqlx::query(
        "INSERT INTO access_logs (exam_number, ip_address, matched) VALUES ($1, $2, $3)",
    )
    .bind(exam_number)
    .bind(client_ip)
    .bind(matched)
    .execute(pool)
    .await;

    if let Err(err) = outcome {
        tracing::warn!(%err, "Failed to write access log entry");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_are_rejected_before_any_query() {
        assert!(matches!(
            require_credentials("", "4477"),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            require_credentials("EX1001", ""),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            require_credentials("   ", "4477"),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(require_credentials("EX1001", "4477").is_ok());
    }

    #[test]
    fn pin_comparison_is_exact() {
        assert!(pins_match("4477", "4477"));
        assert!(!pins_match("4477", "4478"));
        assert!(!pins_match("4477", "447"));
        assert!(!pins_match("4477", ""));
    }

    #[test]
    fn pin_comparison_has_no_prefix_shortcut() {
        // Same-prefix and different-prefix wrong PINs go through the
        // identical digest path; this pins the digest-compare approach.
        assert!(!pins_match("44770000", "44770001"));
        assert!(!pins_match("44770000", "99999999"));
    }
}
