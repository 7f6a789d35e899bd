//! World Kernel: the world document model and its schema gate.
//!
//! # Invariants
//! - `World` is the sole root entity; it owns its regions and cities.
//! - Parsing is side effect free and enforces field presence, types,
//!   non-negative populations and unique region/city names.
//! - Regions refer to cities by name only. Dangling names are not a schema
//!   error; the update validator rejects them before any mutation.

pub mod error;
pub mod summary;
pub mod world;

pub use error::SchemaError;
pub use summary::{RegionRow, WorldSummary};
pub use world::{City, Region, World};
