//! Student result data models and API request/response types.
//!
//! This module defines:
//! - `ResultRecord`: Database entity for one uploaded result
//! - `CheckResultRequest`: Request body for the student credential check
//! - `TokenResponse`: Response carrying a freshly minted access token
//! - `ResultView`: Token-gated metadata view of a result
//! - `ResultSummary`: Admin-facing listing entry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a result record from the database.
///
/// # Database Table
///
/// Maps to the `results` table. Rows are append-only: created by the admin
/// upload endpoint and never mutated afterwards.
///
/// # Credentials
///
/// The (exam_number, pin) pair is the sole student-facing credential. It is
/// not unique across the table; lookup picks the most recently uploaded
/// match. The PIN must never appear in any response body or log line.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ResultRecord {
    /// Unique identifier for this result
    pub id: Uuid,

    /// Student display name shown on the result view
    pub student_name: String,

    /// Exam number the student types in to look up this result
    pub exam_number: String,

    /// Lookup PIN paired with the exam number
    pub pin: String,

    /// Storage key of the uploaded file, relative to the upload directory
    pub file_path: String,

    /// Filename the result was uploaded as, preserved so downloads can
    /// suggest the original name
    pub original_filename: String,

    /// Timestamp when this result was uploaded
    pub created_at: DateTime<Utc>,
}

/// Request body for the student credential check.
///
/// # JSON Example
///
/// ```json
/// {
///   "examNumber": "EX1001",
///   "pin": "4477"
/// }
/// ```
///
/// Both fields are `Option` at the deserialization layer: an absent field
/// must go through the same 400 validation path as an empty one, not
/// surface as an extractor-shaped 422.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResultRequest {
    /// Exam number as printed on the student's slip
    pub exam_number: Option<String>,

    /// PIN issued together with the exam number
    pub pin: Option<String>,
}

/// Response carrying a freshly minted access token.
///
/// The token is the only thing the client ever receives from a successful
/// credential check; the record itself stays server-side.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Bearer token redeemable at the view and download endpoints
    pub token: String,

    /// Absolute expiry of the token
    pub expires_at: DateTime<Utc>,
}

/// Token-gated metadata view of one result.
///
/// Returned by `GET /view-result`. Contains the record id the client needs
/// to build the download URL, but never the PIN.
#[derive(Debug, Serialize)]
pub struct ResultView {
    /// Result identifier, used as the path parameter of the download URL
    pub result_id: Uuid,

    pub student_name: String,

    pub exam_number: String,

    /// Suggested filename for the download
    pub original_filename: String,

    /// When the result was uploaded
    pub uploaded_at: DateTime<Utc>,

    /// When the presented token stops working
    pub token_expires_at: DateTime<Utc>,
}

/// Admin-facing listing entry.
///
/// Deliberately excludes the PIN: listing results must not re-expose
/// student credentials to anyone reading the admin console over a shoulder.
#[derive(Debug, sqlx::FromRow, Serialize)]
pub struct ResultSummary {
    pub id: Uuid,

    pub student_name: String,

    pub exam_number: String,

    pub original_filename: String,

    pub created_at: DateTime<Utc>,
}
