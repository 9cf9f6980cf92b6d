use crate::domain::errors::SchemaMismatchError;
use crate::domain::features::{CATEGORICAL_FEATURES, FeatureVector, NUMERIC_FEATURES};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::LinearRegression;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

pub type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;
pub type Linear = LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>;
pub type Ridge =
    smartcore::linear::ridge_regression::RidgeRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>;
pub type LassoFit = smartcore::linear::lasso::Lasso<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// The fitted regression model, tagged by kind in the on-disk encoding.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", content = "model", rename_all = "snake_case")]
pub enum ModelKind {
    RandomForest(Forest),
    Linear(Linear),
    Ridge(Ridge),
    Lasso(LassoFit),
}

impl ModelKind {
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::RandomForest(_) => "random_forest",
            ModelKind::Linear(_) => "linear",
            ModelKind::Ridge(_) => "ridge",
            ModelKind::Lasso(_) => "lasso",
        }
    }

    pub fn predict(&self, x: &DenseMatrix<f64>) -> Result<Vec<f64>, String> {
        match self {
            ModelKind::RandomForest(m) => m.predict(x).map_err(|e| e.to_string()),
            ModelKind::Linear(m) => m.predict(x).map_err(|e| e.to_string()),
            ModelKind::Ridge(m) => m.predict(x).map_err(|e| e.to_string()),
            ModelKind::Lasso(m) => m.predict(x).map_err(|e| e.to_string()),
        }
    }
}

/// Holdout evaluation computed at training time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldoutMetrics {
    pub r2: f64,
    pub rmse: f64,
    pub mae: f64,
    pub n_train: usize,
    pub n_test: usize,
}

/// One entry of the permutation-importance ranking. Diagnostic only; has no
/// effect on prediction behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub name: String,
    pub weight: f64,
}

/// Immutable trained-estimator artifact: fitted model plus everything needed
/// to encode a `FeatureVector` the same way the training data was encoded.
/// Created once by training, loaded once per process, never mutated.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model: ModelKind,
    /// Sorted category vocabulary per categorical column. The encoded value
    /// of a category is its index in the vocabulary.
    pub encoders: BTreeMap<String, Vec<String>>,
    pub metrics: HoldoutMetrics,
    /// Ranking, highest weight first.
    pub importances: Vec<FeatureImportance>,
    pub trained_at: DateTime<Utc>,
}

impl ModelArtifact {
    /// Encodes a feature vector in registry order: label-encoded categoricals
    /// first, then raw numerics. Missing fields and categories never seen
    /// during training are rejected.
    pub fn encode(&self, features: &FeatureVector) -> Result<Vec<f64>, SchemaMismatchError> {
        let mut encoded = Vec::with_capacity(CATEGORICAL_FEATURES.len() + NUMERIC_FEATURES.len());

        for &name in CATEGORICAL_FEATURES {
            let value =
                features
                    .categorical(name)
                    .ok_or_else(|| SchemaMismatchError::MissingField {
                        name: name.to_string(),
                    })?;
            let normalized = value.trim().to_lowercase();

            let vocab = self.encoders.get(name);
            let index = vocab
                .and_then(|v| v.binary_search(&normalized).ok())
                .ok_or_else(|| SchemaMismatchError::UnknownCategory {
                    field: name.to_string(),
                    value: value.to_string(),
                })?;

            encoded.push(index as f64);
        }

        for &name in NUMERIC_FEATURES {
            let value = features
                .numeric(name)
                .ok_or_else(|| SchemaMismatchError::MissingField {
                    name: name.to_string(),
                })?;
            encoded.push(value);
        }

        Ok(encoded)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }
        let file =
            File::create(path).with_context(|| format!("Failed to create model file {:?}", path))?;
        serde_json::to_writer(BufWriter::new(file), self)
            .with_context(|| format!("Failed to serialize model artifact to {:?}", path))?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Failed to open model file {:?}", path))?;
        let artifact: ModelArtifact = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to deserialize model artifact from {:?}", path))?;
        info!(
            "Loaded {} model from {:?} (trained {}, holdout r2={:.4})",
            artifact.model.name(),
            path,
            artifact.trained_at.format("%Y-%m-%d"),
            artifact.metrics.r2
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::estimator::training::{
        ModelChoice, TrainingParams, train,
    };
    use crate::application::estimator::training::tests_support::synthetic_rows;

    fn trained_artifact() -> ModelArtifact {
        let rows = synthetic_rows(40);
        train(
            &rows,
            &TrainingParams {
                kind: ModelChoice::Linear,
                ..TrainingParams::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_encode_width_matches_registry() {
        let artifact = trained_artifact();
        let fv = crate::application::estimator::training::tests_support::valid_features();
        let encoded = artifact.encode(&fv).unwrap();
        assert_eq!(encoded.len(), crate::domain::features::feature_count());
    }

    #[test]
    fn test_encode_rejects_missing_field() {
        let artifact = trained_artifact();
        let mut fv = crate::application::estimator::training::tests_support::valid_features();
        fv.remove("enginesize");

        let err = artifact.encode(&fv).unwrap_err();
        assert!(matches!(
            err,
            SchemaMismatchError::MissingField { ref name } if name == "enginesize"
        ));
    }

    #[test]
    fn test_encode_rejects_unseen_category() {
        let artifact = trained_artifact();
        let mut fv = crate::application::estimator::training::tests_support::valid_features();
        fv.insert_categorical("fueltype", "hydrogen");

        let err = artifact.encode(&fv).unwrap_err();
        assert!(matches!(
            err,
            SchemaMismatchError::UnknownCategory { ref field, .. } if field == "fueltype"
        ));
    }

    #[test]
    fn test_save_load_roundtrip() {
        let artifact = trained_artifact();
        let path = std::env::temp_dir().join(format!(
            "carprice_artifact_test_{}.json",
            std::process::id()
        ));

        artifact.save(&path).unwrap();
        let reloaded = ModelArtifact::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(reloaded.model.name(), artifact.model.name());
        assert_eq!(reloaded.encoders, artifact.encoders);

        let fv = crate::application::estimator::training::tests_support::valid_features();
        let a = artifact.encode(&fv).unwrap();
        let b = reloaded.encode(&fv).unwrap();
        assert_eq!(a, b);
    }
}
