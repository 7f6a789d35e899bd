//! City datasets consumed by world generation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::EngineError;

/// One `(city, region, population)` row of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityRecord {
    pub name: String,
    pub region: String,
    pub population: u64,
}

impl CityRecord {
    pub fn new(name: impl Into<String>, region: impl Into<String>, population: u64) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            population,
        }
    }
}

/// Supplies city rows to the engine before generation.
///
/// Providers never fail: an unavailable source yields no rows, and the engine
/// falls back to synthesis.
pub trait DatasetProvider {
    fn records(&self) -> Vec<CityRecord>;
}

impl DatasetProvider for Vec<CityRecord> {
    fn records(&self) -> Vec<CityRecord> {
        self.clone()
    }
}

impl DatasetProvider for [CityRecord] {
    fn records(&self) -> Vec<CityRecord> {
        self.to_vec()
    }
}

/// The builtin six-city sample dataset.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleDataset;

impl DatasetProvider for SampleDataset {
    fn records(&self) -> Vec<CityRecord> {
        vec![
            CityRecord::new("Frostgate", "Northland", 12000),
            CityRecord::new("Whitehill", "Northland", 8000),
            CityRecord::new("Sunport", "Southreach", 42000),
            CityRecord::new("Marigold", "Southreach", 15000),
            CityRecord::new("Dustvale", "Highplain", 6000),
            CityRecord::new("Ironford", "Highplain", 22000),
        ]
    }
}

const NAME_COLUMNS: [&str; 3] = ["city", "name", "City"];
const REGION_COLUMNS: [&str; 3] = ["region", "country", "Region"];
const POPULATION_COLUMN: &str = "population";
const UNKNOWN_REGION: &str = "Unknown";

/// A CSV file with a header row.
///
/// The name comes from the first non-empty of `city`, `name`, `City`; the
/// region from `region`, `country`, `Region` (default `Unknown`); the
/// population from `population` (default 0). Rows without a name or with an
/// unparsable population are skipped.
#[derive(Debug, Clone)]
pub struct CsvDataset {
    path: PathBuf,
}

impl CsvDataset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<CityRecord>, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;
        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h == name);
        let name_cols: Vec<usize> = NAME_COLUMNS.iter().filter_map(|c| column(*c)).collect();
        let region_cols: Vec<usize> = REGION_COLUMNS.iter().filter_map(|c| column(*c)).collect();
        let population_col = column(POPULATION_COLUMN);

        let mut rows = Vec::new();
        for (line, result) in reader.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    tracing::debug!(line, error = %e, "skipping unreadable dataset row");
                    continue;
                }
            };
            let Some(name) = first_present(&record, &name_cols) else {
                continue;
            };
            let region = first_present(&record, &region_cols).unwrap_or(UNKNOWN_REGION);
            let raw_population = population_col
                .and_then(|i| record.get(i))
                .map(str::trim)
                .unwrap_or_default();
            let Some(population) = parse_population(raw_population) else {
                tracing::debug!(line, value = raw_population, "skipping row with bad population");
                continue;
            };
            rows.push(CityRecord::new(name, region, population));
        }
        Ok(rows)
    }
}

impl DatasetProvider for CsvDataset {
    fn records(&self) -> Vec<CityRecord> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no city dataset, generation will synthesize");
            return Vec::new();
        }
        match self.read() {
            Ok(rows) => {
                tracing::info!(path = %self.path.display(), rows = rows.len(), "loaded city dataset");
                rows
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "city dataset unreadable");
                Vec::new()
            }
        }
    }
}

fn first_present<'r>(record: &'r csv::StringRecord, cols: &[usize]) -> Option<&'r str> {
    cols.iter()
        .filter_map(|&i| record.get(i))
        .map(str::trim)
        .find(|v| !v.is_empty())
}

fn parse_population(raw: &str) -> Option<u64> {
    if raw.is_empty() {
        return Some(0);
    }
    if let Ok(n) = raw.parse::<u64>() {
        return Some(n);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && *f >= 0.0)
        .map(|f| f as u64)
}

/// Write the builtin sample dataset as CSV.
pub fn write_sample_csv(path: impl AsRef<Path>) -> Result<(), EngineError> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    writer.write_record(["city", "region", POPULATION_COLUMN])?;
    for row in SampleDataset.records() {
        writer.write_record([row.name, row.region, row.population.to_string()])?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
