use crate::application::estimator::artifact::ModelArtifact;
use crate::application::estimator::predictor::PriceModel;
use crate::domain::errors::PredictionError;
use crate::domain::features::FeatureVector;
use anyhow::Result;
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::path::Path;

/// A trained artifact wired up as a `PriceModel`. Loaded once at startup and
/// shared read-only across requests; nothing here mutates after load.
pub struct LoadedEstimator {
    artifact: ModelArtifact,
}

impl LoadedEstimator {
    pub fn new(artifact: ModelArtifact) -> Self {
        Self { artifact }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(Self::new(ModelArtifact::load(path)?))
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }
}

impl PriceModel for LoadedEstimator {
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictionError> {
        let encoded = self.artifact.encode(features)?;

        let matrix =
            DenseMatrix::from_2d_vec(&vec![encoded]).map_err(|e| PredictionError::Inference {
                reason: format!("Matrix creation failed: {e}"),
            })?;

        let predictions = self
            .artifact
            .model
            .predict(&matrix)
            .map_err(|reason| PredictionError::Inference { reason })?;

        match predictions.first() {
            // Prices are never negative; a wild extrapolation is clamped.
            Some(pred) => Ok(pred.max(0.0)),
            None => Err(PredictionError::Inference {
                reason: "No prediction returned".to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        self.artifact.model.name()
    }

    fn version(&self) -> &str {
        "v1"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::estimator::training::tests_support::{synthetic_rows, valid_features};
    use crate::application::estimator::training::{ModelChoice, TrainingParams, train};
    use crate::domain::errors::SchemaMismatchError;

    fn estimator(kind: ModelChoice) -> LoadedEstimator {
        let rows = synthetic_rows(50);
        let artifact = train(
            &rows,
            &TrainingParams {
                kind,
                n_trees: 20,
                ..TrainingParams::default()
            },
        )
        .unwrap();
        LoadedEstimator::new(artifact)
    }

    #[test]
    fn test_prediction_is_non_negative() {
        for kind in [ModelChoice::Linear, ModelChoice::RandomForest] {
            let est = estimator(kind);
            let price = est.predict(&valid_features()).unwrap();
            assert!(price >= 0.0, "{} predicted {price}", est.name());
        }
    }

    #[test]
    fn test_linear_prediction_tracks_training_target() {
        let est = estimator(ModelChoice::Linear);
        // Training target: price = 2000 + 80 * horsepower, horsepower 110.
        let price = est.predict(&valid_features()).unwrap();
        assert!((price - 10_800.0).abs() < 2_500.0, "predicted {price}");
    }

    #[test]
    fn test_missing_field_is_rejected_without_a_price() {
        let est = estimator(ModelChoice::Linear);
        let mut fv = valid_features();
        fv.remove("enginesize");

        let err = est.predict(&fv).unwrap_err();
        assert!(matches!(
            err,
            PredictionError::Schema(SchemaMismatchError::MissingField { ref name })
                if name == "enginesize"
        ));
    }

    #[test]
    fn test_unseen_category_is_rejected() {
        let est = estimator(ModelChoice::Linear);
        let mut fv = valid_features();
        fv.insert_categorical("fuelsystem", "warp-core");

        let err = est.predict(&fv).unwrap_err();
        assert!(matches!(
            err,
            PredictionError::Schema(SchemaMismatchError::UnknownCategory { .. })
        ));
    }
}
