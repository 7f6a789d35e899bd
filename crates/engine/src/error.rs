use worldforge_persist::StoreError;

/// Errors from engine operations.
///
/// Validation failures are not errors here; `apply` reports them as
/// [`crate::ApplyOutcome::Rejected`].
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("snapshot store: {0}")]
    Store(#[from] StoreError),
    #[error("dataset: {0}")]
    Dataset(#[from] csv::Error),
}
