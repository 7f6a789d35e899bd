//! World Engine: the only component that produces or advances a world.
//!
//! # Invariants
//! - Every mutation is preceded by validation; a rejected update leaves the
//!   world untouched and writes no snapshot.
//! - Generation always writes exactly one snapshot tagged `initial-<name>`.
//! - Persistence failures propagate to the caller; nothing is retried.
//! - The engine holds no current world between calls. Callers own it.

pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod event;
mod generate;

pub use config::GenerateConfig;
pub use dataset::{CityRecord, CsvDataset, DatasetProvider, SampleDataset, write_sample_csv};
pub use engine::{ApplyOutcome, WorldEngine};
pub use error::EngineError;
pub use event::{Event, EventKind};
