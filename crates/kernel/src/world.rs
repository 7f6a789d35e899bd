use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use worldforge_common::Timestamp;

use crate::error::SchemaError;
use crate::summary::{RegionRow, WorldSummary};

/// Free-form key/value map carried by worlds and cities.
pub type Attributes = BTreeMap<String, Value>;

/// A named population center. Keyed by `name` in [`World::cities`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub population: u64,
    #[serde(default)]
    pub attributes: Attributes,
}

impl City {
    pub fn new(name: impl Into<String>, population: u64) -> Self {
        Self {
            name: name.into(),
            population,
            attributes: Attributes::new(),
        }
    }
}

/// A named grouping of cities sharing a resource list.
///
/// `cities` holds names, not ownership. Whether each name resolves in the
/// owning world is checked by the validator, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    #[serde(default)]
    pub cities: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
}

impl Region {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cities: Vec::new(),
            resources: Vec::new(),
        }
    }

    pub fn has_city(&self, city: &str) -> bool {
        self.cities.iter().any(|c| c == city)
    }

    pub fn has_resource(&self, resource: &str) -> bool {
        self.resources.iter().any(|r| r == resource)
    }
}

/// The root world document: the unit of validation, mutation, and snapshotting.
///
/// Cities are stored in a `BTreeMap` so serialization and iteration order are
/// deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub name: String,
    #[serde(default)]
    pub regions: Vec<Region>,
    #[serde(default)]
    pub cities: BTreeMap<String, City>,
    #[serde(default)]
    pub metadata: Attributes,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl World {
    /// Metadata key holding the generation timestamp.
    pub const GENERATED_AT: &'static str = "generated_at";
    /// Metadata key holding the id of the snapshot written at generation.
    pub const INITIAL_SNAPSHOT: &'static str = "initial_snapshot";

    /// Create an empty world with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            regions: Vec::new(),
            cities: BTreeMap::new(),
            metadata: Attributes::new(),
            created_at: None,
        }
    }

    /// Parse raw structured data into a world.
    ///
    /// Missing optional collections are filled with empty defaults. Fails on
    /// missing required fields, wrong types, negative populations, duplicate
    /// region names, and city-map keys that disagree with the city's name.
    pub fn parse(raw: &Value) -> Result<Self, SchemaError> {
        let world = Self::deserialize(raw)?;
        world.check()?;
        Ok(world)
    }

    /// Parse a world from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        let world: Self = serde_json::from_str(text)?;
        world.check()?;
        Ok(world)
    }

    /// Serialize the world back to raw structured data.
    pub fn to_value(&self) -> Value {
        // Only string-keyed maps and plain data: serialization cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Key rules that serde alone cannot express: unique region names and
    /// city-map keys equal to the city's own name.
    ///
    /// `parse` runs this on every decoded document. Worlds built or edited in
    /// memory must pass it before they are validated, mutated, or installed.
    pub fn check(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for region in &self.regions {
            if !seen.insert(region.name.as_str()) {
                return Err(SchemaError::DuplicateRegion(region.name.clone()));
            }
        }
        for (key, city) in &self.cities {
            if *key != city.name {
                return Err(SchemaError::CityKeyMismatch {
                    key: key.clone(),
                    name: city.name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.name == name)
    }

    pub fn region_mut(&mut self, name: &str) -> Option<&mut Region> {
        self.regions.iter_mut().find(|r| r.name == name)
    }

    pub fn city(&self, name: &str) -> Option<&City> {
        self.cities.get(name)
    }

    pub fn city_mut(&mut self, name: &str) -> Option<&mut City> {
        self.cities.get_mut(name)
    }

    /// Sum of all city populations, saturating on overflow.
    pub fn total_population(&self) -> u64 {
        self.cities
            .values()
            .fold(0u64, |acc, c| acc.saturating_add(c.population))
    }

    /// Read-only summary for display.
    pub fn summary(&self) -> WorldSummary {
        let regions = self
            .regions
            .iter()
            .map(|r| RegionRow {
                name: r.name.clone(),
                city_count: r.cities.len(),
                population: r
                    .cities
                    .iter()
                    .filter_map(|c| self.cities.get(c))
                    .fold(0u64, |acc, c| acc.saturating_add(c.population)),
                resources: r.resources.clone(),
            })
            .collect();
        WorldSummary {
            name: self.name.clone(),
            city_count: self.cities.len(),
            total_population: self.total_population(),
            regions,
        }
    }
}
