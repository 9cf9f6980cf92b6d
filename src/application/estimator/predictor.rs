use crate::domain::errors::PredictionError;
use crate::domain::features::FeatureVector;

/// Interface for price estimation models.
pub trait PriceModel: Send + Sync {
    /// Predict a price in currency units. Non-negative on success.
    /// Schema violations are rejected, never coerced.
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictionError>;

    /// Get model name/type
    fn name(&self) -> &str;

    /// Get model version/id
    fn version(&self) -> &str;
}
