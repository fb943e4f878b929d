//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Performs business logic (database queries, validation)
//! 3. Returns HTTP response (JSON, status code)

/// Admin login, upload, and listing endpoints
pub mod admin;
/// Liveness endpoint
pub mod health;
/// Student credential check and token-gated result access
pub mod student;
