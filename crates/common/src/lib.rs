//! Shared types: snapshot identifiers and UTC timestamps.

pub mod types;

pub use types::{SnapshotId, Timestamp, utc_now};
