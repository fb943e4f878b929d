//! Administrative HTTP handlers.
//!
//! This module implements the admin side of the portal:
//! - POST /api/admin/login - Exchange username + password for a session token
//! - POST /api/admin/logout - Invalidate the current session
//! - POST /api/admin/upload - Upload a student result file (multipart)
//! - GET /api/admin/results - List recent uploads
//!
//! Everything except login sits behind the session middleware in
//! `crate::middleware::auth`.

use crate::{
    error::AppError,
    middleware::auth::AdminContext,
    models::{
        admin::{Admin, LoginRequest, LoginResponse},
        result_record::ResultSummary,
    },
    services::{grant_service, verifier},
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;

/// Authenticate an admin and mint a session token.
///
/// # Endpoint
///
/// `POST /api/admin/login`
///
/// # Request Body
///
/// ```json
/// {
///   "username": "admin",
///   "password": "..."
/// }
/// ```
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "token": "64 hex chars",
///   "expires_at": "2025-12-21T19:00:00Z"
/// }
/// ```
///
/// The session token reuses the grant token construction (32 CSPRNG
/// bytes); only its SHA-256 hash is persisted. Unknown username and wrong
/// password return the same 401.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let admin = sqlx::query_as::<_, Admin>(
        "SELECT id, username, password_hash, created_at FROM admins WHERE username = $1",
    )
    .bind(&request.username)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::Unauthorized)?;

    let presented_hash = hex::encode(Sha256::digest(request.password.as_bytes()));
    if !verifier::pins_match(&admin.password_hash, &presented_hash) {
        return Err(AppError::Unauthorized);
    }

    let session_token = grant_service::generate_token();
    let token_hash = hex::encode(Sha256::digest(session_token.as_bytes()));
    let issued_at = Utc::now();
    let expires_at = issued_at + Duration::seconds(state.config.admin_session_ttl_seconds);

    sqlx::query(
        "INSERT INTO admin_sessions (token_hash, admin_id, issued_at, expires_at)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(&token_hash)
    .bind(admin.id)
    .bind(issued_at)
    .bind(expires_at)
    .execute(&state.pool)
    .await?;

    tracing::info!(admin_id = %admin.id, "Admin logged in");

    Ok(Json(LoginResponse {
        token: session_token,
        expires_at,
    }))
}

/// Invalidate the current admin session.
///
/// # Endpoint
///
/// `POST /api/admin/logout`
///
/// Deletes exactly the session whose token authenticated this request.
/// Returns 204 regardless of whether the row was still present.
pub async fn logout(
    State(state): State<AppState>,
    Extension(ctx): Extension<AdminContext>,
) -> Result<StatusCode, AppError> {
    sqlx::query("DELETE FROM admin_sessions WHERE token_hash = $1")
        .bind(&ctx.session_token_hash)
        .execute(&state.pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Upload a student result.
///
/// # Endpoint
///
/// `POST /api/admin/upload`
///
/// # Request
///
/// Multipart form with fields `student_name`, `exam_number`, `pin` and a
/// `file` part. The file is streamed chunk by chunk into the upload
/// directory under a generated name, so large result sheets never sit
/// fully in memory; the original filename is kept on the row so downloads
/// can suggest it. If a later field fails validation, the already-written
/// file is removed.
///
/// # Response (201 Created)
///
/// The created row as a `ResultSummary` (no PIN).
///
/// # Errors
///
/// - **400**: missing/empty field or missing file part
/// - **401**: invalid session
/// - **500**: database or filesystem error
pub async fn upload_result(
    State(state): State<AppState>,
    Extension(ctx): Extension<AdminContext>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut student_name: Option<String> = None;
    let mut exam_number: Option<String> = None;
    let mut pin: Option<String> = None;
    let mut file: Option<StoredUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::InvalidRequest(format!("Malformed multipart body: {err}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "student_name" => student_name = Some(read_text_field(field).await?),
            "exam_number" => exam_number = Some(read_text_field(field).await?),
            "pin" => pin = Some(read_text_field(field).await?),
            "file" => file = Some(store_file_field(field, &state.config.upload_dir).await?),
            // Unknown parts are ignored rather than rejected
            _ => {}
        }
    }

    let Some(upload) = file else {
        return Err(AppError::InvalidRequest("No file uploaded".to_string()));
    };

    let (student_name, exam_number, pin) =
        match required_text_fields(student_name, exam_number, pin) {
            Ok(fields) => fields,
            Err(err) => {
                // The file is already on disk; a rejected request must not
                // leave it orphaned there.
                remove_orphan(&upload.path).await;
                return Err(err);
            }
        };

    let summary = sqlx::query_as::<_, ResultSummary>(
        r#"
        INSERT INTO results (student_name, exam_number, pin, file_path, original_filename)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, student_name, exam_number, original_filename, created_at
        "#,
    )
    .bind(&student_name)
    .bind(&exam_number)
    .bind(&pin)
    .bind(&upload.stored_name)
    .bind(&upload.original_filename)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(
        admin_id = %ctx.admin_id,
        result_id = %summary.id,
        "Result uploaded"
    );

    Ok((StatusCode::CREATED, Json(summary)))
}

/// List recent uploads, newest first.
///
/// # Endpoint
///
/// `GET /api/admin/results`
///
/// Capped at the 20 most recent rows. PINs are not part of the summary.
pub async fn list_results(
    State(state): State<AppState>,
    Extension(_ctx): Extension<AdminContext>,
) -> Result<Json<Vec<ResultSummary>>, AppError> {
    let results = sqlx::query_as::<_, ResultSummary>(
        r#"
        SELECT id, student_name, exam_number, original_filename, created_at
        FROM results
        ORDER BY created_at DESC
        LIMIT 20
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(results))
}

/// A result file already streamed into the upload directory.
struct StoredUpload {
    /// Filename the admin uploaded the file as
    original_filename: String,

    /// Generated name the file lives under on disk
    stored_name: String,

    /// Full path of the written file, kept for orphan cleanup
    path: std::path::PathBuf,
}

/// Stream the file part of the multipart body straight to disk.
///
/// Chunks are written as they arrive; the whole upload is never held in
/// memory. A read error mid-stream removes the partial file before the
/// request fails.
async fn store_file_field(
    mut field: axum::extract::multipart::Field<'_>,
    upload_dir: &str,
) -> Result<StoredUpload, AppError> {
    let original_filename = field
        .file_name()
        .map(ToString::to_string)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::InvalidRequest("File part must carry a filename".to_string()))?;

    let stored_name = stored_name_for(&original_filename);
    let path = std::path::Path::new(upload_dir).join(&stored_name);

    let mut out = tokio::fs::File::create(&path).await?;
    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => out.write_all(&chunk).await?,
            Ok(None) => break,
            Err(err) => {
                drop(out);
                remove_orphan(&path).await;
                return Err(AppError::InvalidRequest(format!(
                    "Failed to read file part: {err}"
                )));
            }
        }
    }
    out.flush().await?;

    Ok(StoredUpload {
        original_filename,
        stored_name,
        path,
    })
}

/// Generated storage name: timestamp + random suffix + original extension.
///
/// Keeps uploads from colliding and keeps caller-supplied names off the
/// filesystem entirely.
fn stored_name_for(original_filename: &str) -> String {
    let extension = std::path::Path::new(original_filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();

    format!(
        "{}-{:08x}{}",
        Utc::now().timestamp_millis(),
        rand::random::<u32>(),
        extension
    )
}

/// Best-effort removal of a file that must not outlive its request.
async fn remove_orphan(path: &std::path::Path) {
    if let Err(err) = tokio::fs::remove_file(path).await {
        tracing::warn!(%err, path = %path.display(), "Failed to remove orphaned upload");
    }
}

/// Read a text part of the multipart body.
async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|err| AppError::InvalidRequest(format!("Failed to read form field: {err}")))
}

/// Require all three text fields of the upload form.
fn required_text_fields(
    student_name: Option<String>,
    exam_number: Option<String>,
    pin: Option<String>,
) -> Result<(String, String, String), AppError> {
    Ok((
        require_field(student_name, "student_name")?,
        require_field(exam_number, "exam_number")?,
        require_field(pin, "pin")?,
    ))
}

/// Require a non-empty form field.
fn require_field(value: Option<String>, name: &str) -> Result<String, AppError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::InvalidRequest(format!("{name} is required"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_fields_reject_missing_and_blank() {
        assert!(require_field(None, "pin").is_err());
        assert!(require_field(Some("  ".to_string()), "pin").is_err());
        assert_eq!(
            require_field(Some("4477".to_string()), "pin").unwrap(),
            "4477"
        );
    }

    #[test]
    fn stored_name_keeps_only_the_extension() {
        let name = stored_name_for("Term 1 Results.pdf");
        assert!(name.ends_with(".pdf"));
        assert!(!name.contains("Term"));
        assert!(!name.contains(' '));

        // No extension on the upload, none on disk either
        let bare = stored_name_for("results");
        assert!(!bare.contains('.'));
    }

    #[tokio::test]
    async fn rejected_upload_does_not_leave_the_file_behind() {
        // Mirrors the cleanup path taken when a text field fails
        // validation after the file part was already streamed to disk.
        let dir = std::env::temp_dir().join(format!("portal-test-{:08x}", rand::random::<u32>()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join(stored_name_for("sheet.pdf"));
        tokio::fs::write(&path, b"partial").await.unwrap();

        remove_orphan(&path).await;

        assert!(!path.exists());
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
