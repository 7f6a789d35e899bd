//! The current world, kept as one JSON file in the data directory.

use anyhow::Context;
use std::path::Path;
use worldforge_kernel::World;

pub const NO_CURRENT_WORLD: &str = "No current world. Generate one first.";

/// Read the current world, or `None` if none has been installed.
pub fn load(path: &Path) -> anyhow::Result<Option<World>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };
    let world = World::from_json_str(&text)
        .with_context(|| format!("decoding current world {}", path.display()))?;
    Ok(Some(world))
}

/// Read the current world or fail with [`NO_CURRENT_WORLD`].
pub fn require(path: &Path) -> anyhow::Result<World> {
    load(path)?.ok_or_else(|| anyhow::anyhow!(NO_CURRENT_WORLD))
}

/// Install `world` as current. Written to a sibling file then renamed.
pub fn store(path: &Path, world: &World) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let staging = path.with_extension("json.tmp");
    std::fs::write(&staging, serde_json::to_vec_pretty(world)?)
        .with_context(|| format!("writing {}", staging.display()))?;
    std::fs::rename(&staging, path)
        .with_context(|| format!("installing {}", path.display()))?;
    tracing::debug!(path = %path.display(), world = %world.name, "current world installed");
    Ok(())
}
