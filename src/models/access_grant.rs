//! Access grant model: a time-limited permission to read one result.
//!
//! A grant is minted right after a successful exam number + PIN check and
//! redeemed at the view and download endpoints. The token string is both
//! the row's identity and the bearer credential: whoever holds it exercises
//! the grant, so it comes from a CSPRNG with 256 bits of entropy.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Represents an access grant record from the database.
///
/// # Database Table
///
/// Maps to the `access_grants` table:
/// - `token`: 64 hex characters, primary key
/// - `result_id`: the one result this grant can read (weak reference)
/// - `issued_at` / `expires_at`: validity window
///
/// # Validity
///
/// A grant is usable iff the current time is strictly before `expires_at`
/// and the bound result row still exists. Grants are multi-use within that
/// window (the view page and the download endpoint redeem the same token)
/// and are never updated after insertion.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccessGrant {
    /// Bearer token, 32 CSPRNG bytes hex encoded
    pub token: String,

    /// Identifier of the result this grant is scoped to
    pub result_id: Uuid,

    /// Timestamp when the grant was minted
    pub issued_at: DateTime<Utc>,

    /// Absolute expiry, computed at issuance as issued_at + TTL
    pub expires_at: DateTime<Utc>,
}

impl AccessGrant {
    /// Whether the grant has expired as of `now`.
    ///
    /// The bound is closed: a grant presented exactly at its expiry instant
    /// is already expired. Validation and tests both rely on this reading.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether the grant is scoped to `result_id`.
    ///
    /// The download path passes the id from the URL here, so a token bound
    /// to one student's result cannot be replayed against another's file by
    /// editing the path parameter.
    pub fn covers(&self, result_id: Uuid) -> bool {
        self.result_id == result_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn grant_expiring_at(expires_at: DateTime<Utc>) -> AccessGrant {
        AccessGrant {
            token: "ab".repeat(32),
            result_id: Uuid::new_v4(),
            issued_at: expires_at - Duration::seconds(300),
            expires_at,
        }
    }

    #[test]
    fn valid_strictly_before_expiry() {
        let expiry = Utc::now() + Duration::seconds(300);
        let grant = grant_expiring_at(expiry);

        assert!(!grant.is_expired_at(expiry - Duration::seconds(1)));
        assert!(!grant.is_expired_at(expiry - Duration::milliseconds(1)));
    }

    #[test]
    fn expired_exactly_at_expiry_instant() {
        // Closed bound: equal-to-now counts as expired.
        let expiry = Utc::now();
        let grant = grant_expiring_at(expiry);

        assert!(grant.is_expired_at(expiry));
    }

    #[test]
    fn expired_after_ttl_elapses() {
        // Round-trip property: a 300 second grant checked 301 seconds
        // after issuance is no longer valid, and stays invalid.
        let issued_at = Utc::now();
        let grant = AccessGrant {
            token: "cd".repeat(32),
            result_id: Uuid::new_v4(),
            issued_at,
            expires_at: issued_at + Duration::seconds(300),
        };

        let later = issued_at + Duration::seconds(301);
        assert!(grant.is_expired_at(later));
        assert!(grant.is_expired_at(later + Duration::seconds(1)));
    }

    #[test]
    fn scope_check_matches_only_the_bound_result() {
        let expiry = Utc::now() + Duration::seconds(300);
        let grant = grant_expiring_at(expiry);

        assert!(grant.covers(grant.result_id));
        assert!(!grant.covers(Uuid::new_v4()));
    }
}
