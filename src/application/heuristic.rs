use crate::config::Config;
use crate::domain::vehicle::VehicleIdentity;
use rand::Rng;
use std::collections::HashSet;

/// Demo defaults for the brand tier lists. Configuration data, not a pricing
/// model; override via `PREMIUM_BRANDS` / `ECONOMY_BRANDS`.
pub const DEFAULT_PREMIUM_BRANDS: &[&str] =
    &["bmw", "mercedes-benz", "porsche", "jaguar", "audi", "lexus"];
pub const DEFAULT_ECONOMY_BRANDS: &[&str] =
    &["chevrolet", "dodge", "plymouth", "mitsubishi", "kia"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrandTier {
    Premium,
    Economy,
    Standard,
}

/// Fallback pricer used when no estimator or feature vector is available:
/// a uniformly random base price in a fixed band, compound age depreciation,
/// a brand-tier multiplier, then rounding and a hard floor.
///
/// The random source is injected by the caller so outputs are reproducible.
#[derive(Debug, Clone)]
pub struct HeuristicPricer {
    base_min: f64,
    base_max: f64,
    depreciation_rate: f64,
    premium_multiplier: f64,
    economy_multiplier: f64,
    rounding_step: f64,
    min_price: f64,
    premium_brands: HashSet<String>,
    economy_brands: HashSet<String>,
}

impl Default for HeuristicPricer {
    fn default() -> Self {
        Self {
            base_min: 20_000.0,
            base_max: 30_000.0,
            depreciation_rate: 0.12,
            premium_multiplier: 1.6,
            economy_multiplier: 0.8,
            rounding_step: 100.0,
            min_price: 1_500.0,
            premium_brands: DEFAULT_PREMIUM_BRANDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            economy_brands: DEFAULT_ECONOMY_BRANDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl HeuristicPricer {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_min: config.heuristic_base_min,
            base_max: config.heuristic_base_max,
            depreciation_rate: config.depreciation_rate,
            premium_multiplier: config.premium_multiplier,
            economy_multiplier: config.economy_multiplier,
            rounding_step: config.price_rounding_step,
            min_price: config.min_price,
            premium_brands: config
                .premium_brands
                .iter()
                .map(|s| s.trim().to_lowercase())
                .collect(),
            economy_brands: config
                .economy_brands
                .iter()
                .map(|s| s.trim().to_lowercase())
                .collect(),
        }
    }

    pub fn tier(&self, make: &str) -> BrandTier {
        let key = make.trim().to_lowercase();
        if self.premium_brands.contains(&key) {
            BrandTier::Premium
        } else if self.economy_brands.contains(&key) {
            BrandTier::Economy
        } else {
            BrandTier::Standard
        }
    }

    /// Draws a base price and prices the identity.
    pub fn price<R: Rng + ?Sized>(
        &self,
        identity: &VehicleIdentity,
        reference_year: i32,
        rng: &mut R,
    ) -> f64 {
        let base = rng.random_range(self.base_min..=self.base_max);
        self.price_from_base(base, identity, reference_year)
    }

    /// Deterministic part of the heuristic, split out so the base draw can be
    /// held fixed in tests and replays.
    pub fn price_from_base(
        &self,
        base: f64,
        identity: &VehicleIdentity,
        reference_year: i32,
    ) -> f64 {
        let age = (reference_year - identity.year).max(0);
        let depreciated = base * (1.0 - self.depreciation_rate).powi(age);

        let tiered = match self.tier(&identity.make) {
            BrandTier::Premium => depreciated * self.premium_multiplier,
            BrandTier::Economy => depreciated * self.economy_multiplier,
            BrandTier::Standard => depreciated,
        };

        let rounded = (tiered / self.rounding_step).round() * self.rounding_step;
        rounded.max(self.min_price)
    }
}
