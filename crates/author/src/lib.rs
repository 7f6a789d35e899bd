//! World authoring: the closed set of update operations and the validator
//! that decides whether one may be applied.
//!
//! # Invariants
//! - Validation never mutates the world and never persists anything.
//! - Every rejection is a single [`ValidationError`] kind carrying a
//!   human-readable message and optional details.
//! - Referential integrity (region -> city names) is only reasoned about here.

pub mod error;
pub mod update;
pub mod validator;

pub use error::ValidationError;
pub use update::{Decoded, Update};
pub use validator::{check_payload, validate, validate_raw};
