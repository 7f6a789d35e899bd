//! Snapshot store over a durable backend.

use std::cmp::Reverse;
use worldforge_common::SnapshotId;
use worldforge_kernel::World;

use crate::backend::StorageBackend;
use crate::error::StoreError;
use crate::snapshot::{Snapshot, SnapshotInfo};

/// Append-only persistence and retrieval of whole-world states.
#[derive(Debug)]
pub struct SnapshotStore<B> {
    backend: B,
}

impl<B: StorageBackend> SnapshotStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Persist a copy of `world` under a fresh id and return the id.
    pub fn create(&mut self, world: &World, tag: Option<&str>) -> Result<SnapshotId, StoreError> {
        let snap = Snapshot::capture(world, tag);
        let bytes = serde_json::to_vec_pretty(&snap)?;
        self.backend.put(&snap.id, &bytes)?;
        tracing::info!(id = %snap.id, tag = %snap.tag, world = %world.name, "snapshot written");
        Ok(snap.id)
    }

    /// All readable snapshots, newest first, without world bodies.
    ///
    /// Entries that cannot be read or decoded are skipped.
    pub fn list(&self) -> Result<Vec<SnapshotInfo>, StoreError> {
        let mut infos = Vec::new();
        for id in self.backend.keys()? {
            let bytes = match self.backend.get(&id) {
                Ok(Some(bytes)) => bytes,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(%id, error = %e, "skipping unreadable snapshot");
                    continue;
                }
            };
            match SnapshotInfo::from_slice(&bytes) {
                Ok(info) => infos.push(info),
                Err(e) => tracing::warn!(%id, error = %e, "skipping corrupt snapshot"),
            }
        }
        infos.sort_by_key(|info| Reverse(info.created_at));
        Ok(infos)
    }

    /// Load the full snapshot record for an id.
    ///
    /// The stored world must pass the document model's key rules.
    pub fn get(&self, id: &SnapshotId) -> Result<Snapshot, StoreError> {
        let bytes = self
            .backend
            .get(id)?
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let snap: Snapshot = serde_json::from_slice(&bytes)?;
        snap.world
            .check()
            .map_err(|source| StoreError::InvalidWorld {
                id: id.clone(),
                source,
            })?;
        Ok(snap)
    }

    /// Load the world stored under an id.
    pub fn load(&self, id: &SnapshotId) -> Result<World, StoreError> {
        self.get(id).map(|snap| snap.world)
    }

    /// Retrieve a prior world state. The caller installs it as current.
    pub fn rollback(&self, id: &SnapshotId) -> Result<World, StoreError> {
        let world = self.load(id)?;
        tracing::info!(%id, world = %world.name, "rollback snapshot loaded");
        Ok(world)
    }

    /// Delete all but the newest `keep` readable snapshots.
    ///
    /// Operator housekeeping only; returns the number of entries removed.
    pub fn prune(&mut self, keep: usize) -> Result<usize, StoreError> {
        let mut removed = 0;
        for info in self.list()?.into_iter().skip(keep) {
            if self.backend.remove(&info.id)? {
                removed += 1;
            }
        }
        tracing::info!(keep, removed, "pruned snapshots");
        Ok(removed)
    }
}
