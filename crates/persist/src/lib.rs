//! Persistence: append-only snapshots of whole worlds, listing, rollback.
//!
//! # Invariants
//! - Snapshots are immutable once written; every `create` writes a fresh id.
//! - The store holds no notion of a "current" world; rollback only returns
//!   the stored world for the caller to install.
//! - Listing skips entries that fail to deserialize instead of aborting.

pub mod backend;
pub mod error;
pub mod snapshot;
pub mod store;

pub use backend::{FsBackend, MemoryBackend, StorageBackend};
pub use error::StoreError;
pub use snapshot::{Snapshot, SnapshotInfo};
pub use store::SnapshotStore;
