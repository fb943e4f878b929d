//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They handle credential checks, grant issuance and validation, and the
//! background expiry sweep.

pub mod grant_service;
pub mod sweeper;
pub mod verifier;
