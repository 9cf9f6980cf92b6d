use anyhow::{Context, Result};
use chrono::Datelike;
use std::env;
use std::path::PathBuf;

use crate::application::heuristic::{DEFAULT_ECONOMY_BRANDS, DEFAULT_PREMIUM_BRANDS};

/// Runtime configuration for the synthesis service. All knobs come from the
/// environment with documented demo defaults; the heuristic's constants are
/// configuration data here, not a pricing model.
#[derive(Debug, Clone)]
pub struct Config {
    /// Trained model artifact. Missing file is not fatal; the heuristic
    /// covers for it.
    pub model_path: PathBuf,
    /// Optional collaborator-supplied catalog JSON. Absent means the
    /// built-in demo catalog.
    pub catalog_path: Option<PathBuf>,
    /// Year used for age math, so depreciation never reads a hidden clock.
    pub reference_year: i32,
    pub heuristic_base_min: f64,
    pub heuristic_base_max: f64,
    pub depreciation_rate: f64,
    pub premium_multiplier: f64,
    pub economy_multiplier: f64,
    pub price_rounding_step: f64,
    pub min_price: f64,
    pub premium_brands: Vec<String>,
    pub economy_brands: Vec<String>,
}

fn split_brands(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let model_path = PathBuf::from(
            env::var("MODEL_PATH").unwrap_or_else(|_| "data/models/price_model.json".to_string()),
        );

        let catalog_path = env::var("CATALOG_PATH").ok().map(PathBuf::from);

        let reference_year = match env::var("REFERENCE_YEAR") {
            Ok(raw) => raw
                .parse::<i32>()
                .context("Failed to parse REFERENCE_YEAR")?,
            Err(_) => chrono::Utc::now().year(),
        };

        let heuristic_base_min = env::var("HEURISTIC_BASE_MIN")
            .unwrap_or_else(|_| "20000.0".to_string())
            .parse::<f64>()
            .context("Failed to parse HEURISTIC_BASE_MIN")?;

        let heuristic_base_max = env::var("HEURISTIC_BASE_MAX")
            .unwrap_or_else(|_| "30000.0".to_string())
            .parse::<f64>()
            .context("Failed to parse HEURISTIC_BASE_MAX")?;

        let depreciation_rate = env::var("DEPRECIATION_RATE")
            .unwrap_or_else(|_| "0.12".to_string())
            .parse::<f64>()
            .context("Failed to parse DEPRECIATION_RATE")?;

        let premium_multiplier = env::var("PREMIUM_MULTIPLIER")
            .unwrap_or_else(|_| "1.6".to_string())
            .parse::<f64>()
            .context("Failed to parse PREMIUM_MULTIPLIER")?;

        let economy_multiplier = env::var("ECONOMY_MULTIPLIER")
            .unwrap_or_else(|_| "0.8".to_string())
            .parse::<f64>()
            .context("Failed to parse ECONOMY_MULTIPLIER")?;

        let price_rounding_step = env::var("PRICE_ROUNDING_STEP")
            .unwrap_or_else(|_| "100.0".to_string())
            .parse::<f64>()
            .context("Failed to parse PRICE_ROUNDING_STEP")?;

        let min_price = env::var("MIN_PRICE")
            .unwrap_or_else(|_| "1500.0".to_string())
            .parse::<f64>()
            .context("Failed to parse MIN_PRICE")?;

        let premium_brands = env::var("PREMIUM_BRANDS")
            .map(|raw| split_brands(&raw))
            .unwrap_or_else(|_| {
                DEFAULT_PREMIUM_BRANDS
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            });

        let economy_brands = env::var("ECONOMY_BRANDS")
            .map(|raw| split_brands(&raw))
            .unwrap_or_else(|_| {
                DEFAULT_ECONOMY_BRANDS
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            });

        let config = Self {
            model_path,
            catalog_path,
            reference_year,
            heuristic_base_min,
            heuristic_base_max,
            depreciation_rate,
            premium_multiplier,
            economy_multiplier,
            price_rounding_step,
            min_price,
            premium_brands,
            economy_brands,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.heuristic_base_min <= 0.0 || self.heuristic_base_max < self.heuristic_base_min {
            anyhow::bail!(
                "Invalid heuristic price band: [{}, {}]",
                self.heuristic_base_min,
                self.heuristic_base_max
            );
        }
        if !(0.0..1.0).contains(&self.depreciation_rate) {
            anyhow::bail!(
                "DEPRECIATION_RATE must be in [0, 1), got {}",
                self.depreciation_rate
            );
        }
        if self.premium_multiplier <= 0.0 || self.economy_multiplier <= 0.0 {
            anyhow::bail!("Brand multipliers must be positive");
        }
        if self.price_rounding_step <= 0.0 {
            anyhow::bail!(
                "PRICE_ROUNDING_STEP must be positive, got {}",
                self.price_rounding_step
            );
        }
        if self.min_price < 0.0 {
            anyhow::bail!("MIN_PRICE must be non-negative, got {}", self.min_price);
        }
        Ok(())
    }
}
