use serde::{Deserialize, Serialize};

/// Parameters for world generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Name of the generated world.
    pub name: String,
    /// Number of regions to create (or select from the dataset).
    pub regions_count: usize,
    /// Maximum number of cities per region.
    pub cities_per_region: usize,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            name: "MyWorld".into(),
            regions_count: 4,
            cities_per_region: 3,
        }
    }
}
