mod config;
mod current;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use worldforge_author::check_payload;
use worldforge_common::SnapshotId;
use worldforge_engine::{ApplyOutcome, CsvDataset, WorldEngine, write_sample_csv};
use worldforge_kernel::World;
use worldforge_persist::{FsBackend, SnapshotStore, StoreError};

use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "worldforge", about = "Generate, evolve, and roll back fictional worlds")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file (defaults to ./worldforge.yaml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory, overrides the config file
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new world and make it current
    Generate {
        #[arg(short, long)]
        name: Option<String>,
        /// Number of regions
        #[arg(short, long)]
        regions: Option<usize>,
        /// Cities per region
        #[arg(short, long)]
        cities: Option<usize>,
    },
    /// Suggest an event for the current world
    Event,
    /// Check an update against the current world without applying it
    Validate {
        /// Update as JSON, e.g. '{"op":"add_resource","region":"Northland","resource":"gold"}'
        update: String,
    },
    /// Validate and apply an update to the current world
    Apply {
        update: String,
        /// Do not write a snapshot after applying
        #[arg(long)]
        no_snapshot: bool,
    },
    /// List snapshots, newest first
    Snapshots,
    /// Make a snapshot's world current
    Rollback { id: String },
    /// Print a summary of the current world
    Show,
    /// Delete all but the newest snapshots
    Prune {
        #[arg(short, long)]
        keep: usize,
    },
    /// Write the builtin sample city dataset as CSV
    SampleDataset {
        /// Output path (defaults to the configured dataset path)
        path: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let current_path = config.current_world_path();

    match cli.command {
        Commands::Generate {
            name,
            regions,
            cities,
        } => {
            let mut params = config.defaults.clone();
            if let Some(name) = name {
                params.name = name;
            }
            if let Some(regions) = regions {
                params.regions_count = regions;
            }
            if let Some(cities) = cities {
                params.cities_per_region = cities;
            }
            let dataset = CsvDataset::new(config.dataset_path());
            let mut engine = open_engine(&config)?.with_dataset(&dataset);
            let world = engine.generate_with(&params)?;
            current::store(&current_path, &world)?;
            print_json(&world)?;
        }
        Commands::Event => {
            let world = current::require(&current_path)?;
            let event = open_engine(&config)?.suggest_event(&world);
            print_json(&event)?;
        }
        Commands::Validate { update } => {
            let world = current::require(&current_path)?;
            let payload = parse_update(&update)?;
            match check_payload(&world, &payload) {
                Ok(_) => print_json(&json!({"valid": true}))?,
                Err(err) => {
                    print_json(&json!({
                        "valid": false,
                        "error": &err.message,
                        "details": &err.details,
                    }))?;
                    bail!("update is invalid: {err}");
                }
            }
        }
        Commands::Apply {
            update,
            no_snapshot,
        } => {
            let mut world = current::require(&current_path)?;
            let payload = parse_update(&update)?;
            let mut engine = open_engine(&config)?;
            let outcome = engine.apply_raw(&mut world, &payload, !no_snapshot)?;
            print_json(&apply_report(&outcome, &world))?;
            match outcome {
                ApplyOutcome::Applied { .. } => current::store(&current_path, &world)?,
                ApplyOutcome::Rejected { error, .. } => bail!("update rejected: {error}"),
            }
        }
        Commands::Snapshots => {
            let engine = open_engine(&config)?;
            for info in engine.store().list()? {
                println!("{}  {}  {}", info.id, info.created_at.to_rfc3339(), info.tag);
            }
        }
        Commands::Rollback { id } => {
            let engine = open_engine(&config)?;
            let world = match engine.store().rollback(&SnapshotId::from(id)) {
                Ok(world) => world,
                Err(StoreError::NotFound(id)) => bail!("snapshot not found: {id}"),
                Err(e) => return Err(e.into()),
            };
            current::store(&current_path, &world)?;
            print_json(&json!({"status": "rolled_back", "world": world}))?;
        }
        Commands::Show => {
            let world = current::require(&current_path)?;
            print!("{}", world.summary());
        }
        Commands::Prune { keep } => {
            let mut engine = open_engine(&config)?;
            let removed = engine.store_mut().prune(keep)?;
            println!("Removed {removed} snapshot(s), kept at most {keep}");
        }
        Commands::SampleDataset { path } => {
            let path = path.unwrap_or_else(|| config.dataset_path());
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)?;
            }
            write_sample_csv(&path)?;
            println!("Wrote sample dataset to {}", path.display());
        }
    }

    Ok(())
}

fn open_engine(config: &CliConfig) -> anyhow::Result<WorldEngine<FsBackend>> {
    let backend = FsBackend::open(config.snapshots_dir())
        .with_context(|| format!("opening snapshot store {}", config.snapshots_dir().display()))?;
    let store = SnapshotStore::new(backend);
    Ok(match config.seed {
        Some(seed) => WorldEngine::with_seed(store, seed),
        None => WorldEngine::new(store),
    })
}

/// `{"ok": true, "snapshot", "world"}` or `{"ok": false, "error", "details"}`.
fn apply_report(outcome: &ApplyOutcome, world: &World) -> Value {
    match outcome {
        ApplyOutcome::Applied { snapshot } => {
            json!({"ok": true, "snapshot": snapshot, "world": world})
        }
        ApplyOutcome::Rejected { error, details } => {
            json!({"ok": false, "error": error, "details": details})
        }
    }
}

fn parse_update(text: &str) -> anyhow::Result<Value> {
    serde_json::from_str(text).context("update must be a JSON object")
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use worldforge_kernel::City;

    #[test]
    fn applied_report_carries_world() {
        let mut world = World::new("Reported");
        world
            .cities
            .insert("Sunport".into(), City::new("Sunport", 42000));
        let outcome = ApplyOutcome::Applied {
            snapshot: Some(SnapshotId::from("abc")),
        };
        let report = apply_report(&outcome, &world);
        assert_eq!(report["ok"], true);
        assert_eq!(report["snapshot"], "abc");
        assert_eq!(report["world"], world.to_value());
    }

    #[test]
    fn rejected_report_has_error() {
        let outcome = ApplyOutcome::Rejected {
            error: "City does not exist".into(),
            details: None,
        };
        let report = apply_report(&outcome, &World::new("W"));
        assert_eq!(report["ok"], false);
        assert_eq!(report["error"], "City does not exist");
        assert!(report.get("world").is_none());
    }
}
