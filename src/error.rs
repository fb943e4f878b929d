//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Why a presented access token was rejected.
///
/// Kept server-side only: every variant maps to the same HTTP 403 with the
/// same generic message, so a caller cannot distinguish a forged token from
/// an expired one or probe which result ids a token is bound to. Logs keep
/// the real cause for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// No token was supplied on a protected route
    MissingToken,
    /// No grant exists for the presented token
    UnknownToken,
    /// The grant exists but its expiry has passed
    Expired,
    /// The grant is bound to a different result than the one requested
    ScopeMismatch,
    /// The grant's result row no longer exists
    RecordMissing,
}

impl DenialReason {
    /// Short label used in server-side logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            DenialReason::MissingToken => "missing_token",
            DenialReason::UnknownToken => "unknown_token",
            DenialReason::Expired => "expired",
            DenialReason::ScopeMismatch => "scope_mismatch",
            DenialReason::RecordMissing => "record_missing",
        }
    }
}

/// Application-wide error type.
///
/// This enum represents all possible errors that can occur in the application.
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from database operations
/// - **Credential Errors**: Exam number + PIN pairs that match no result
/// - **Grant Errors**: Missing, expired, forged, or wrongly scoped tokens
/// - **Session Errors**: Invalid or expired admin sessions
/// - **Integrity Errors**: Result rows whose file is gone from disk
/// - **Validation Errors**: Invalid request data
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    ///
    /// This wraps any sqlx::Error using the `#[from]` attribute, which
    /// automatically implements `From<sqlx::Error> for AppError`.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),

    /// No result matched the supplied exam number + PIN pair.
    ///
    /// Returns HTTP 401 with one uniform message whether the exam number
    /// was unknown or the PIN was wrong, so neither field leaks.
    #[error("Invalid exam number or PIN")]
    InvalidCredentials,

    /// A protected result read was attempted without a usable grant.
    ///
    /// Returns HTTP 403. The inner reason never reaches the client.
    #[error("Access denied")]
    AccessDenied(DenialReason),

    /// Admin session token is missing, invalid, or expired.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Unauthorized")]
    Unauthorized,

    /// A valid grant resolved to a record whose file is absent from storage.
    ///
    /// Returns HTTP 404. This is a store/disk integrity problem, not an
    /// authorization failure, and is logged as such.
    #[error("Result file not found")]
    FileMissing,

    /// Filesystem operation failed for a reason other than a missing file.
    ///
    /// Returns HTTP 500 with a generic message.
    #[error("File storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert AppError into an HTTP response.
///
/// This implementation allows Axum handlers to return `Result<T, AppError>`
/// and have errors automatically converted to proper HTTP responses.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `InvalidRequest` → 400 Bad Request
/// - `InvalidCredentials` → 401 Unauthorized
/// - `Unauthorized` → 401 Unauthorized
/// - `AccessDenied` → 403 Forbidden (uniform regardless of reason)
/// - `FileMissing` → 404 Not Found
/// - `Database` / `Io` → 500 Internal Server Error (hides details from client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map each error variant to (HTTP status, error code, message)
        let (status, code, message) = match self {
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                self.to_string(),
            ),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", self.to_string()),
            AppError::AccessDenied(_) => {
                (StatusCode::FORBIDDEN, "access_denied", self.to_string())
            }
            AppError::FileMissing => (StatusCode::NOT_FOUND, "file_missing", self.to_string()),
            AppError::Database(_) | AppError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
        };

        // Build JSON response body
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        // Return the response with status code and JSON body
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        let cases = [
            (
                AppError::InvalidRequest("missing pin".into()),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                AppError::AccessDenied(DenialReason::UnknownToken),
                StatusCode::FORBIDDEN,
            ),
            (AppError::FileMissing, StatusCode::NOT_FOUND),
            (
                AppError::Database(sqlx::Error::PoolTimedOut),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn every_denial_reason_returns_the_same_response() {
        // Expired, forged, and wrongly scoped tokens must be
        // indistinguishable to the client.
        let reasons = [
            DenialReason::MissingToken,
            DenialReason::UnknownToken,
            DenialReason::Expired,
            DenialReason::ScopeMismatch,
            DenialReason::RecordMissing,
        ];

        for reason in reasons {
            let err = AppError::AccessDenied(reason);
            assert_eq!(err.to_string(), "Access denied");
            assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
        }
    }
}
