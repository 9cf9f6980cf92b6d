use crate::application::catalog::{VehicleCatalog, generic_template};
use crate::application::estimator::PriceModel;
use crate::application::heuristic::HeuristicPricer;
use crate::domain::errors::PredictionError;
use crate::domain::features::FeatureVector;
use crate::domain::vehicle::{PriceSource, VehicleDetail, VehicleIdentity, classify_model_name};
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

/// Combines catalog lookup, heuristic pricing and estimator output into a
/// single per-request `VehicleDetail`.
///
/// Synthesis follows an "always answer" policy: a catalog miss or an
/// unclassifiable model name degrades to a default through an explicit
/// branch. The only failure surface is a schema violation on the estimator
/// path, which is surfaced to the caller instead of being coerced.
pub struct DetailSynthesizer {
    catalog: VehicleCatalog,
    heuristic: HeuristicPricer,
    estimator: Option<Arc<dyn PriceModel>>,
    reference_year: i32,
}

impl DetailSynthesizer {
    pub fn new(
        catalog: VehicleCatalog,
        heuristic: HeuristicPricer,
        estimator: Option<Arc<dyn PriceModel>>,
        reference_year: i32,
    ) -> Self {
        Self {
            catalog,
            heuristic,
            estimator,
            reference_year,
        }
    }

    pub fn has_estimator(&self) -> bool {
        self.estimator.is_some()
    }

    pub fn synthesize<R: Rng + ?Sized>(
        &self,
        identity: &VehicleIdentity,
        features: Option<&FeatureVector>,
        rng: &mut R,
    ) -> Result<VehicleDetail, PredictionError> {
        let vehicle_type = classify_model_name(&identity.model);

        let (estimated_price, price_source) = match (features, &self.estimator) {
            (Some(fv), Some(model)) => (model.predict(fv)?, PriceSource::Model),
            _ => {
                debug!(
                    "No estimator prediction for {} {} {}; using heuristic",
                    identity.make, identity.model, identity.year
                );
                (
                    self.heuristic.price(identity, self.reference_year, rng),
                    PriceSource::Heuristic,
                )
            }
        };

        let specifications = match self.catalog.lookup_specs(identity) {
            Some(specs) => specs.to_vec(),
            // Catalog miss: fixed generic template, never an error.
            None => generic_template(),
        };

        Ok(VehicleDetail {
            make: identity.make.clone(),
            model: identity.model.clone(),
            year: identity.year,
            vehicle_type,
            estimated_price,
            price_source,
            specifications,
        })
    }
}
