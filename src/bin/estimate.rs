//! Serving-boundary CLI for the price estimation core.
//!
//! Takes a vehicle selection (and optionally a full feature vector) and
//! prints the synthesized detail record as JSON. The trained model artifact
//! is used when both it and a feature vector are available; otherwise the
//! heuristic fallback prices the vehicle.
//!
//! # Usage
//! ```sh
//! cargo run --bin estimate -- --make Ford --model F-150 --year 2020
//! cargo run --bin estimate -- --make Toyota --model Camry --year 2023 \
//!     --features request.json
//! ```
//!
//! # Environment Variables
//! - `MODEL_PATH` - Trained artifact location (default: data/models/price_model.json)
//! - `CATALOG_PATH` - Optional catalog JSON; falls back to the built-in demo catalog
//! - `REFERENCE_YEAR`, `DEPRECIATION_RATE`, `PREMIUM_BRANDS`, ... - heuristic knobs

use anyhow::{Context, Result};
use carprice::application::catalog::VehicleCatalog;
use carprice::application::estimator::{LoadedEstimator, PriceModel};
use carprice::application::heuristic::HeuristicPricer;
use carprice::application::synthesizer::DetailSynthesizer;
use carprice::config::Config;
use carprice::domain::features::FeatureVector;
use carprice::domain::vehicle::VehicleIdentity;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Vehicle make, e.g. "Ford"
    #[arg(long)]
    make: String,

    /// Vehicle model, e.g. "F-150"
    #[arg(long)]
    model: String,

    /// Model year
    #[arg(long)]
    year: i32,

    /// Path to a feature vector JSON (flat object of the fixed schema).
    /// When present and a trained model is loaded, the model prices the
    /// vehicle instead of the heuristic.
    #[arg(long)]
    features: Option<PathBuf>,

    /// Seed the heuristic's random base draw for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with(stderr_layer)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let catalog = match &config.catalog_path {
        Some(path) => VehicleCatalog::from_json_file(path)?,
        None => VehicleCatalog::builtin(),
    };

    let estimator: Option<Arc<dyn PriceModel>> = if config.model_path.exists() {
        match LoadedEstimator::from_path(&config.model_path) {
            Ok(est) => {
                info!("Using {} model ({}) for pricing", est.name(), est.version());
                Some(Arc::new(est))
            }
            Err(e) => {
                warn!("Failed to load model artifact: {e:#}. Falling back to heuristic.");
                None
            }
        }
    } else {
        warn!(
            "Model artifact not found at {:?}; heuristic pricing only.",
            config.model_path
        );
        None
    };

    let features: Option<FeatureVector> = match &args.features {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read features file {:?}", path))?;
            Some(
                serde_json::from_str(&raw)
                    .with_context(|| format!("Failed to parse features file {:?}", path))?,
            )
        }
        None => None,
    };

    let synthesizer = DetailSynthesizer::new(
        catalog,
        HeuristicPricer::from_config(&config),
        estimator,
        config.reference_year,
    );

    let identity = VehicleIdentity::new(args.make, args.model, args.year);
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let detail = synthesizer.synthesize(&identity, features.as_ref(), &mut rng)?;
    println!("{}", serde_json::to_string_pretty(&detail)?);

    Ok(())
}
