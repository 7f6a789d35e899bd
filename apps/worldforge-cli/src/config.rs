use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use worldforge_engine::GenerateConfig;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "worldforge.yaml";

const DATASET_FILE: &str = "cities.csv";

/// Settings read from `worldforge.yaml`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Holds `current.json` and the `snapshots/` directory.
    pub data_dir: PathBuf,
    /// City CSV; `<data_dir>/cities.csv` when unset.
    pub dataset: Option<PathBuf>,
    /// Fixed RNG seed for reproducible generation.
    pub seed: Option<u64>,
    /// Defaults for `generate` flags.
    pub defaults: GenerateConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("worldforge-data"),
            dataset: None,
            seed: None,
            defaults: GenerateConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load the config.
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] is
    /// used if present and the built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => path,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_yaml(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        tracing::debug!(path = %path.display(), ?config, "config loaded");
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    pub fn current_world_path(&self) -> PathBuf {
        self.data_dir.join("current.json")
    }

    pub fn snapshots_dir(&self) -> PathBuf {
        self.data_dir.join("snapshots")
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.dataset
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DATASET_FILE))
    }
}
