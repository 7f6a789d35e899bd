use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use worldforge_common::{SnapshotId, Timestamp, utc_now};
use worldforge_kernel::World;

/// A point-in-time copy of a whole world.
///
/// This is the persisted unit: `{id, tag, created_at, world}`. An absent tag
/// is stored as the empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: SnapshotId,
    #[serde(default)]
    pub tag: String,
    pub created_at: Timestamp,
    pub world: World,
}

impl Snapshot {
    /// Capture the world under a fresh id, stamped with the current UTC time.
    pub fn capture(world: &World, tag: Option<&str>) -> Self {
        Self {
            id: SnapshotId::generate(),
            tag: tag.unwrap_or_default().to_owned(),
            created_at: utc_now(),
            world: world.clone(),
        }
    }

    /// Listing entry for this snapshot.
    pub fn info(&self) -> SnapshotInfo {
        SnapshotInfo {
            id: self.id.clone(),
            tag: self.tag.clone(),
            created_at: self.created_at,
        }
    }
}

/// A snapshot without its world body, as returned by listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotInfo {
    pub id: SnapshotId,
    pub tag: String,
    pub created_at: Timestamp,
}

impl SnapshotInfo {
    /// Decode only the header fields of a persisted snapshot.
    ///
    /// The world body must be present and well-formed JSON but is skipped
    /// without being materialized.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        struct Header {
            id: SnapshotId,
            #[serde(default)]
            tag: String,
            created_at: Timestamp,
            #[allow(dead_code)]
            world: IgnoredAny,
        }

        let header: Header = serde_json::from_slice(bytes)?;
        Ok(Self {
            id: header.id,
            tag: header.tag,
            created_at: header.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use worldforge_kernel::{City, Region};

    fn sample_world() -> World {
        let mut world = World::new("Sample");
        let mut region = Region::new("Northland");
        region.cities.push("Frostgate".into());
        world.regions.push(region);
        world
            .cities
            .insert("Frostgate".into(), City::new("Frostgate", 12000));
        world
    }

    #[test]
    fn capture_copies_world() {
        let world = sample_world();
        let snap = Snapshot::capture(&world, Some("initial-Sample"));
        assert_eq!(snap.world, world);
        assert_eq!(snap.tag, "initial-Sample");
        assert!(snap.id.is_storage_safe());
    }

    #[test]
    fn missing_tag_is_empty_string() {
        let snap = Snapshot::capture(&sample_world(), None);
        let value = serde_json::to_value(&snap).unwrap();
        assert_eq!(value["tag"], "");
    }

    #[test]
    fn created_at_is_utc_iso_string() {
        let snap = Snapshot::capture(&sample_world(), None);
        let value = serde_json::to_value(&snap).unwrap();
        let text = value["created_at"].as_str().unwrap();
        assert!(text.ends_with('Z'), "{text}");
    }

    #[test]
    fn header_decode_skips_world() {
        let snap = Snapshot::capture(&sample_world(), Some("t"));
        let bytes = serde_json::to_vec(&snap).unwrap();
        let info = SnapshotInfo::from_slice(&bytes).unwrap();
        assert_eq!(info, snap.info());
    }

    #[test]
    fn header_decode_rejects_truncated_entry() {
        let snap = Snapshot::capture(&sample_world(), Some("t"));
        let bytes = serde_json::to_vec(&snap).unwrap();
        assert!(SnapshotInfo::from_slice(&bytes[..bytes.len() / 2]).is_err());
    }
}
