//! Data models representing database entities.
//!
//! This module contains all data structures that map to database tables.

/// Time-limited result access grant model
pub mod access_grant;
/// Administrator account and session models
pub mod admin;
/// Uploaded student result model
pub mod result_record;
