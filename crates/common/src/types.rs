use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// UTC timestamp used for world and snapshot creation times.
pub type Timestamp = DateTime<Utc>;

/// Current UTC time.
pub fn utc_now() -> Timestamp {
    Utc::now()
}

/// Opaque identifier of a persisted snapshot.
///
/// Fresh ids are 32 lowercase hex characters taken from a v4 UUID, so they are
/// safe to use directly as a file name or storage key. Ids supplied by callers
/// (for lookup) may be arbitrary strings; use [`SnapshotId::is_storage_safe`]
/// before turning one into a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotId(String);

impl SnapshotId {
    /// Generate a fresh id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id consists only of `[A-Za-z0-9_-]` and is non-empty.
    pub fn is_storage_safe(&self) -> bool {
        !self.0.is_empty()
            && self
                .0
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    }
}

impl From<&str> for SnapshotId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for SnapshotId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
