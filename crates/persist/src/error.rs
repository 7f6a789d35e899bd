use worldforge_common::SnapshotId;
use worldforge_kernel::SchemaError;

/// Errors from snapshot persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no snapshot with id: {0}")]
    NotFound(SnapshotId),
    #[error("snapshot {0} already exists")]
    AlreadyExists(SnapshotId),
    #[error("snapshot {id} holds an invalid world: {source}")]
    InvalidWorld {
        id: SnapshotId,
        #[source]
        source: SchemaError,
    },
}
