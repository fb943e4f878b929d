//! Student-facing HTTP handlers.
//!
//! This module implements the token-gated result access flow:
//! - POST /api/student/verify - Exchange exam number + PIN for an access token
//! - GET /view-result?token=T - Token-gated metadata view of the result
//! - GET /download/{id}?token=T - Token-gated download of the result file
//!
//! The token is the only credential on the protected routes. Both routes
//! revalidate it against the store on every request; nothing about a prior
//! successful validation is cached.

use crate::{
    error::{AppError, DenialReason},
    models::result_record::{CheckResultRequest, ResultView, TokenResponse},
    services::{grant_service, verifier},
    state::AppState,
};
use axum::{
    Json,
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, header},
    response::IntoResponse,
};
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

/// Query string of the protected routes.
///
/// `token` is optional at the extractor level so that a missing token
/// produces our uniform 403 instead of a framework-shaped 400.
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

/// Exchange an exam number + PIN pair for an access token.
///
/// # Endpoint
///
/// `POST /api/student/verify`
///
/// # Request Body
///
/// ```json
/// {
///   "examNumber": "EX1001",
///   "pin": "4477"
/// }
/// ```
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "token": "9f2c...64 hex chars...",
///   "expires_at": "2025-12-21T16:05:00Z"
/// }
/// ```
///
/// The matched record itself is never returned; the token is the only
/// thing the client gets, and it expires after the configured TTL
/// (300 seconds by default).
///
/// # Errors
///
/// - **400**: exam number or PIN empty/missing
/// - **401**: no match, one uniform message for both failure modes
/// - **500**: database error
pub async fn verify_result(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CheckResultRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let client_ip = client_ip_from_headers(&headers);

    // Absent fields collapse to empty strings here so the verifier's input
    // check rejects "missing" and "empty" identically with a 400.
    let record = verifier::verify(
        &state.pool,
        request.exam_number.as_deref().unwrap_or(""),
        request.pin.as_deref().unwrap_or(""),
        client_ip.as_deref(),
    )
    .await?;

    let grant = grant_service::issue(&state.pool, record.id, state.config.grant_ttl_seconds).await?;

    Ok(Json(TokenResponse {
        token: grant.token,
        expires_at: grant.expires_at,
    }))
}

/// Token-gated metadata view of a result.
///
/// # Endpoint
///
/// `GET /view-result?token=T`
///
/// Returns the record's display fields plus the id the client needs to
/// build the download URL. The PIN is never included.
///
/// # Errors
///
/// - **403**: token missing, unknown, expired, or its record is gone
/// - **500**: database error
pub async fn view_result(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<ResultView>, AppError> {
    let token = require_token(query)?;
    let (grant, record) = grant_service::validate(&state.pool, &token, None).await?;

    Ok(Json(ResultView {
        result_id: record.id,
        student_name: record.student_name,
        exam_number: record.exam_number,
        original_filename: record.original_filename,
        uploaded_at: record.created_at,
        token_expires_at: grant.expires_at,
    }))
}

/// Token-gated download of the result file.
///
/// # Endpoint
///
/// `GET /download/{id}?token=T`
///
/// The id from the URL is passed to the validator as the expected result
/// id, so a token scoped to one result cannot fetch another's file.
///
/// # Response (200 OK)
///
/// The file bytes, streamed, with `Content-Disposition: attachment` naming
/// the originally uploaded filename. A client that disconnects mid-stream
/// just drops the stream; no store state is involved.
///
/// # Errors
///
/// - **403**: token missing, unknown, expired, or bound to a different id
/// - **404**: record exists but its file is gone from storage (integrity
///   problem, logged as a warning; distinct from 403 in logs only)
/// - **500**: database or filesystem error
pub async fn download_result(
    State(state): State<AppState>,
    Path(result_id): Path<Uuid>,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, AppError> {
    let token = require_token(query)?;
    let (_grant, record) =
        grant_service::validate(&state.pool, &token, Some(result_id)).await?;

    let path = std::path::Path::new(&state.config.upload_dir).join(&record.file_path);

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(
                result_id = %record.id,
                file_path = %record.file_path,
                "Result row exists but its file is missing from storage"
            );
            return Err(AppError::FileMissing);
        }
        Err(err) => return Err(AppError::Io(err)),
    };

    // Stream the file instead of buffering it; large result sheets never
    // sit fully in memory.
    let body = Body::from_stream(ReaderStream::new(file));

    let headers = [
        (header::CONTENT_TYPE, "application/octet-stream".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{}\"",
                sanitize_filename(&record.original_filename)
            ),
        ),
    ];

    Ok((headers, body))
}

/// Unwrap the token from the query string, rejecting absent or blank ones.
fn require_token(query: TokenQuery) -> Result<String, AppError> {
    match query.token {
        Some(token) if !token.trim().is_empty() => Ok(token),
        _ => {
            tracing::warn!(
                reason = DenialReason::MissingToken.as_str(),
                "Rejected access grant"
            );
            Err(AppError::AccessDenied(DenialReason::MissingToken))
        }
    }
}

/// Strip characters that would break the Content-Disposition header.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '"' | '\\' | '\r' | '\n'))
        .collect()
}

/// Best-effort client address for the audit log.
///
/// Behind the expected reverse proxy the first X-Forwarded-For entry is
/// the client; without a proxy there is simply no address to record.
fn client_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn absent_credential_field_maps_to_400() {
        // A body that omits `pin` entirely must deserialize and then fail
        // the same input check as an empty field, not bounce off the JSON
        // extractor as a 422.
        let request: CheckResultRequest =
            serde_json::from_str(r#"{"examNumber":"EX1001"}"#).unwrap();
        assert!(request.pin.is_none());

        let err = verifier::require_credentials(
            request.exam_number.as_deref().unwrap_or(""),
            request.pin.as_deref().unwrap_or(""),
        )
        .unwrap_err();

        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_or_blank_token_is_denied() {
        assert!(matches!(
            require_token(TokenQuery { token: None }),
            Err(AppError::AccessDenied(DenialReason::MissingToken))
        ));
        assert!(matches!(
            require_token(TokenQuery {
                token: Some("   ".to_string())
            }),
            Err(AppError::AccessDenied(DenialReason::MissingToken))
        ));

        let token = require_token(TokenQuery {
            token: Some("abc123".to_string()),
        });
        assert_eq!(token.unwrap(), "abc123");
    }

    #[test]
    fn filename_sanitization_strips_header_breakers() {
        assert_eq!(sanitize_filename("result.pdf"), "result.pdf");
        assert_eq!(sanitize_filename("re\"sult\r\n.pdf"), "result.pdf");
        assert_eq!(sanitize_filename("a\\b.pdf"), "ab.pdf");
    }

    #[test]
    fn client_ip_takes_first_forwarded_entry() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.9, 10.0.0.1".parse().unwrap());

        assert_eq!(
            client_ip_from_headers(&headers),
            Some("203.0.113.9".to_string())
        );
        assert_eq!(client_ip_from_headers(&HeaderMap::new()), None);
    }
}
