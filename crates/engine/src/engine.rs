use chrono::SecondsFormat;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use serde_json::Value;
use worldforge_author::{Update, ValidationError, check_payload, validate};
use worldforge_common::{SnapshotId, utc_now};
use worldforge_kernel::World;
use worldforge_persist::{SnapshotStore, StorageBackend};

use crate::config::GenerateConfig;
use crate::dataset::{CityRecord, DatasetProvider};
use crate::error::EngineError;
use crate::event::{self, Event};
use crate::generate;

/// Message reported when a validated update matches no mutation target.
pub const UNSUPPORTED_AFTER_VALIDATION: &str = "Unsupported op after validation";

/// Result of [`WorldEngine::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ApplyOutcome {
    /// The world was mutated in place; `snapshot` is the id written after
    /// the mutation, if snapshotting was enabled.
    Applied { snapshot: Option<SnapshotId> },
    /// The update was refused and the world left untouched.
    Rejected {
        error: String,
        details: Option<String>,
    },
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

impl From<ValidationError> for ApplyOutcome {
    fn from(err: ValidationError) -> Self {
        Self::Rejected {
            error: err.message,
            details: err.details,
        }
    }
}

/// Generates worlds, suggests events, and applies validated updates.
///
/// The engine owns the snapshot store, the dataset rows supplied before
/// generation, and its random source. It does not hold a current world:
/// every call takes the caller's world.
pub struct WorldEngine<B> {
    store: SnapshotStore<B>,
    dataset: Vec<CityRecord>,
    rng: StdRng,
}

impl<B: StorageBackend> WorldEngine<B> {
    /// Create an engine seeded from the operating system.
    pub fn new(store: SnapshotStore<B>) -> Self {
        Self {
            store,
            dataset: Vec::new(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create an engine with a fixed seed for reproducible generation.
    pub fn with_seed(store: SnapshotStore<B>, seed: u64) -> Self {
        Self {
            store,
            dataset: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Load the rows generation should draw from.
    pub fn with_dataset<P: DatasetProvider + ?Sized>(mut self, provider: &P) -> Self {
        self.dataset = provider.records();
        self
    }

    pub fn dataset(&self) -> &[CityRecord] {
        &self.dataset
    }

    pub fn store(&self) -> &SnapshotStore<B> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SnapshotStore<B> {
        &mut self.store
    }

    /// Generate a fresh world and persist its initial snapshot.
    ///
    /// The snapshot is tagged `initial-<name>` and its id is recorded in the
    /// world's `initial_snapshot` metadata.
    pub fn generate(
        &mut self,
        name: &str,
        regions_count: usize,
        cities_per_region: usize,
    ) -> Result<World, EngineError> {
        let _span = tracing::info_span!("generate", world = name).entered();

        let mut world = World::new(name);
        generate::populate(
            &mut world,
            &self.dataset,
            regions_count,
            cities_per_region,
            &mut self.rng,
        );

        let now = utc_now();
        world.metadata.insert(
            World::GENERATED_AT.into(),
            Value::String(now.to_rfc3339_opts(SecondsFormat::Micros, true)),
        );
        world.created_at = Some(now);

        let snapshot = self.store.create(&world, Some(format!("initial-{name}").as_str()))?;
        world.metadata.insert(
            World::INITIAL_SNAPSHOT.into(),
            Value::String(snapshot.to_string()),
        );

        tracing::info!(
            regions = world.regions.len(),
            cities = world.cities.len(),
            from_dataset = !self.dataset.is_empty(),
            %snapshot,
            "world generated"
        );
        Ok(world)
    }

    /// [`Self::generate`] driven by a config struct.
    pub fn generate_with(&mut self, config: &GenerateConfig) -> Result<World, EngineError> {
        self.generate(&config.name, config.regions_count, config.cities_per_region)
    }

    /// Suggest an event for the world without changing it.
    pub fn suggest_event(&mut self, world: &World) -> Event {
        let event = event::suggest(world, &mut self.rng);
        tracing::debug!(kind = ?event.kind, text = %event.text, "event suggested");
        event
    }

    /// Validate and apply an update to `world` in place.
    ///
    /// A rejected update leaves `world` unchanged and writes no snapshot.
    /// When `snapshot` is true a successful mutation is persisted with an
    /// op-specific tag. Store failures propagate as errors.
    pub fn apply(
        &mut self,
        world: &mut World,
        update: &Update,
        snapshot: bool,
    ) -> Result<ApplyOutcome, EngineError> {
        let _span = tracing::info_span!("apply", op = update.op(), world = %world.name).entered();

        if let Err(err) = validate(world, update) {
            tracing::warn!(error = %err, details = ?err.details, "update rejected");
            return Ok(err.into());
        }

        if !mutate(world, update) {
            tracing::error!("validated update matched no mutation target");
            return Ok(ApplyOutcome::Rejected {
                error: UNSUPPORTED_AFTER_VALIDATION.into(),
                details: None,
            });
        }

        let snapshot = if snapshot {
            Some(self.store.create(world, Some(update.describe().as_str()))?)
        } else {
            None
        };
        tracing::info!(tag = %update.describe(), ?snapshot, "update applied");
        Ok(ApplyOutcome::Applied { snapshot })
    }

    /// Decode a free-form update payload, then [`Self::apply`] it.
    ///
    /// Decoding and validation failures are reported as
    /// [`ApplyOutcome::Rejected`], in validation order.
    pub fn apply_raw(
        &mut self,
        world: &mut World,
        payload: &Value,
        snapshot: bool,
    ) -> Result<ApplyOutcome, EngineError> {
        match check_payload(world, payload) {
            Ok(update) => self.apply(world, &update, snapshot),
            Err(err) => {
                tracing::warn!(error = %err, "update payload rejected");
                Ok(err.into())
            }
        }
    }
}

/// Perform the update's effect. Every target is resolved before anything
/// changes, so a `false` return means the world is untouched.
fn mutate(world: &mut World, update: &Update) -> bool {
    match update {
        Update::AddCity { region, city } => {
            let Some(r) = world.region_mut(region) else {
                return false;
            };
            if !r.has_city(&city.name) {
                r.cities.push(city.name.clone());
            }
            world.cities.insert(city.name.clone(), city.clone());
        }
        Update::AddResource { region, resource } => {
            let Some(r) = world.region_mut(region) else {
                return false;
            };
            r.resources.push(resource.clone());
        }
        Update::TransferCity { city, from, to } => {
            if world.region(from).is_none() || world.region(to).is_none() {
                return false;
            }
            if let Some(source) = world.region_mut(from) {
                if let Some(pos) = source.cities.iter().position(|c| c == city) {
                    source.cities.remove(pos);
                }
            }
            if let Some(dest) = world.region_mut(to) {
                // A name is listed at most once per region.
                if !dest.has_city(city) {
                    dest.cities.push(city.clone());
                }
            }
        }
        Update::SetPopulation { city, population } => {
            let Some(c) = world.city_mut(city) else {
                return false;
            };
            c.population = *population;
        }
    }
    true
}
