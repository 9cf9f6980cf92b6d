use crate::application::estimator::artifact::{
    FeatureImportance, HoldoutMetrics, ModelArtifact, ModelKind,
};
use crate::domain::errors::TrainingDataError;
use crate::domain::features::{CATEGORICAL_FEATURES, NUMERIC_FEATURES, feature_names};
use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::lasso::{Lasso, LassoParameters};
use smartcore::linear::linear_regression::{LinearRegression, LinearRegressionParameters};
use smartcore::linear::ridge_regression::{RidgeRegression, RidgeRegressionParameters};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// One historical observation: a full feature vector plus the observed price.
/// Column names match the public car-price dataset; unknown columns in the
/// CSV are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingRow {
    pub fueltype: String,
    pub aspiration: String,
    pub doornumber: String,
    pub carbody: String,
    pub drivewheel: String,
    pub enginelocation: String,
    pub enginetype: String,
    pub cylindernumber: String,
    pub fuelsystem: String,
    pub wheelbase: f64,
    pub carlength: f64,
    pub carwidth: f64,
    pub carheight: f64,
    pub curbweight: f64,
    pub enginesize: f64,
    pub boreratio: f64,
    pub stroke: f64,
    pub compressionratio: f64,
    pub horsepower: f64,
    pub peakrpm: f64,
    pub citympg: f64,
    pub highwaympg: f64,
    pub price: f64,
}

impl TrainingRow {
    fn categorical(&self, name: &str) -> &str {
        match name {
            "fueltype" => &self.fueltype,
            "aspiration" => &self.aspiration,
            "doornumber" => &self.doornumber,
            "carbody" => &self.carbody,
            "drivewheel" => &self.drivewheel,
            "enginelocation" => &self.enginelocation,
            "enginetype" => &self.enginetype,
            "cylindernumber" => &self.cylindernumber,
            "fuelsystem" => &self.fuelsystem,
            _ => unreachable!("not a categorical column: {name}"),
        }
    }

    fn numeric(&self, name: &str) -> f64 {
        match name {
            "wheelbase" => self.wheelbase,
            "carlength" => self.carlength,
            "carwidth" => self.carwidth,
            "carheight" => self.carheight,
            "curbweight" => self.curbweight,
            "enginesize" => self.enginesize,
            "boreratio" => self.boreratio,
            "stroke" => self.stroke,
            "compressionratio" => self.compressionratio,
            "horsepower" => self.horsepower,
            "peakrpm" => self.peakrpm,
            "citympg" => self.citympg,
            "highwaympg" => self.highwaympg,
            _ => unreachable!("not a numeric column: {name}"),
        }
    }
}

/// Which estimator family to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelChoice {
    RandomForest,
    Linear,
    Ridge,
    Lasso,
}

/// Every family, in the order the comparison flow trains them.
pub const ALL_MODEL_CHOICES: &[ModelChoice] = &[
    ModelChoice::Linear,
    ModelChoice::Ridge,
    ModelChoice::Lasso,
    ModelChoice::RandomForest,
];

impl std::str::FromStr for ModelChoice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rf" | "random_forest" => Ok(ModelChoice::RandomForest),
            "linear" => Ok(ModelChoice::Linear),
            "ridge" => Ok(ModelChoice::Ridge),
            "lasso" => Ok(ModelChoice::Lasso),
            _ => anyhow::bail!(
                "Invalid model type: {}. Must be 'rf', 'linear', 'ridge' or 'lasso'",
                s
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrainingParams {
    pub kind: ModelChoice,
    pub n_trees: usize,
    pub max_depth: u16,
    pub min_split: usize,
    /// Regularization strength for ridge and lasso.
    pub alpha: f64,
    /// Fraction of rows held out for evaluation. 0 trains on everything.
    pub holdout_fraction: f64,
    /// Seed for the shuffle used by the split and the permutation
    /// importances, so a given dataset always trains the same way.
    pub seed: u64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            kind: ModelChoice::RandomForest,
            n_trees: 100,
            max_depth: 10,
            min_split: 5,
            alpha: 1.0,
            holdout_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Loads a training dataset from CSV, verifying up front that every required
/// column is present so a missing column fails with a clear error instead of
/// a per-row deserialization failure.
pub fn load_dataset(path: &Path) -> Result<Vec<TrainingRow>, TrainingDataError> {
    let file = File::open(path)?;
    let mut rdr = csv::Reader::from_reader(BufReader::new(file));

    let headers = rdr
        .headers()
        .map_err(|e| TrainingDataError::MalformedRow {
            row: 0,
            reason: e.to_string(),
        })?
        .clone();

    for name in feature_names().chain(std::iter::once("price")) {
        if !headers.iter().any(|h| h == name) {
            return Err(TrainingDataError::MissingColumn {
                name: name.to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    for (i, result) in rdr.deserialize().enumerate() {
        let row: TrainingRow = result.map_err(|e| TrainingDataError::MalformedRow {
            row: i + 1,
            reason: e.to_string(),
        })?;
        rows.push(row);
    }

    Ok(rows)
}

fn build_encoders(rows: &[TrainingRow]) -> BTreeMap<String, Vec<String>> {
    let mut encoders = BTreeMap::new();
    for &name in CATEGORICAL_FEATURES {
        let mut vocab: Vec<String> = rows
            .iter()
            .map(|r| r.categorical(name).trim().to_lowercase())
            .collect();
        vocab.sort();
        vocab.dedup();
        encoders.insert(name.to_string(), vocab);
    }
    encoders
}

fn encode_row(row: &TrainingRow, encoders: &BTreeMap<String, Vec<String>>) -> Vec<f64> {
    let mut encoded = Vec::with_capacity(CATEGORICAL_FEATURES.len() + NUMERIC_FEATURES.len());
    for &name in CATEGORICAL_FEATURES {
        let value = row.categorical(name).trim().to_lowercase();
        // Vocabulary was built from these same rows, so the lookup always hits.
        let index = encoders[name]
            .binary_search(&value)
            .unwrap_or_else(|_| unreachable!("category not in vocabulary: {name}='{value}'"));
        encoded.push(index as f64);
    }
    for &name in NUMERIC_FEATURES {
        encoded.push(row.numeric(name));
    }
    encoded
}

fn rmse(pred: &[f64], actual: &[f64]) -> f64 {
    let sq_err: f64 = pred
        .iter()
        .zip(actual.iter())
        .map(|(p, a)| (p - a).powi(2))
        .sum();
    (sq_err / pred.len() as f64).sqrt()
}

fn mae(pred: &[f64], actual: &[f64]) -> f64 {
    pred.iter()
        .zip(actual.iter())
        .map(|(p, a)| (p - a).abs())
        .sum::<f64>()
        / pred.len() as f64
}

fn r2(pred: &[f64], actual: &[f64]) -> f64 {
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let var: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / actual.len() as f64;
    if var > 0.0 {
        let mse: f64 = pred
            .iter()
            .zip(actual.iter())
            .map(|(p, a)| (p - a).powi(2))
            .sum::<f64>()
            / pred.len() as f64;
        1.0 - mse / var
    } else {
        0.0
    }
}

/// Fits an estimator on historical rows and returns the immutable artifact:
/// model + encoders + holdout metrics + permutation-importance ranking.
pub fn train(
    rows: &[TrainingRow],
    params: &TrainingParams,
) -> Result<ModelArtifact, TrainingDataError> {
    if rows.is_empty() {
        return Err(TrainingDataError::EmptyDataset);
    }

    let encoders = build_encoders(rows);

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.shuffle(&mut rng);

    let x: Vec<Vec<f64>> = order
        .iter()
        .map(|&i| encode_row(&rows[i], &encoders))
        .collect();
    let y: Vec<f64> = order.iter().map(|&i| rows[i].price).collect();

    let n = x.len();
    let n_test = if params.holdout_fraction > 0.0 {
        ((n as f64 * params.holdout_fraction).floor() as usize).min(n - 1)
    } else {
        0
    };
    let n_train = n - n_test;

    let x_train = &x[..n_train];
    let y_train = y[..n_train].to_vec();
    let x_test = &x[n_train..];
    let y_test = &y[n_train..];

    let x_matrix = DenseMatrix::from_2d_vec(&x_train.to_vec()).map_err(|e| {
        TrainingDataError::FitFailed {
            reason: e.to_string(),
        }
    })?;

    let model = match params.kind {
        ModelChoice::RandomForest => {
            let rf_params = RandomForestRegressorParameters::default()
                .with_n_trees(params.n_trees)
                .with_max_depth(params.max_depth)
                .with_min_samples_split(params.min_split);
            ModelKind::RandomForest(
                RandomForestRegressor::fit(&x_matrix, &y_train, rf_params).map_err(|e| {
                    TrainingDataError::FitFailed {
                        reason: e.to_string(),
                    }
                })?,
            )
        }
        ModelChoice::Linear => ModelKind::Linear(
            LinearRegression::fit(&x_matrix, &y_train, LinearRegressionParameters::default())
                .map_err(|e| TrainingDataError::FitFailed {
                    reason: e.to_string(),
                })?,
        ),
        ModelChoice::Ridge => ModelKind::Ridge(
            RidgeRegression::fit(
                &x_matrix,
                &y_train,
                RidgeRegressionParameters::default().with_alpha(params.alpha),
            )
            .map_err(|e| TrainingDataError::FitFailed {
                reason: e.to_string(),
            })?,
        ),
        ModelChoice::Lasso => ModelKind::Lasso(
            Lasso::fit(
                &x_matrix,
                &y_train,
                LassoParameters::default().with_alpha(params.alpha),
            )
            .map_err(|e| TrainingDataError::FitFailed {
                reason: e.to_string(),
            })?,
        ),
    };

    // Evaluate on the holdout when there is one, otherwise in-sample.
    let (eval_x, eval_y) = if n_test > 0 {
        (x_test, y_test)
    } else {
        (x_train, &y[..n_train])
    };
    let eval_matrix = DenseMatrix::from_2d_vec(&eval_x.to_vec()).map_err(|e| {
        TrainingDataError::FitFailed {
            reason: e.to_string(),
        }
    })?;
    let pred = model
        .predict(&eval_matrix)
        .map_err(|reason| TrainingDataError::FitFailed { reason })?;

    let metrics = HoldoutMetrics {
        r2: r2(&pred, eval_y),
        rmse: rmse(&pred, eval_y),
        mae: mae(&pred, eval_y),
        n_train,
        n_test,
    };

    let importances = permutation_importances(&model, eval_x, eval_y, metrics.rmse, &mut rng)?;

    Ok(ModelArtifact {
        model,
        encoders,
        metrics,
        importances,
        trained_at: Utc::now(),
    })
}

/// Model-agnostic importance: shuffle one column of the evaluation set,
/// measure how much the RMSE degrades, normalize the degradations to sum 1.
fn permutation_importances(
    model: &ModelKind,
    eval_x: &[Vec<f64>],
    eval_y: &[f64],
    base_rmse: f64,
    rng: &mut StdRng,
) -> Result<Vec<FeatureImportance>, TrainingDataError> {
    let mut weights: Vec<(String, f64)> = Vec::new();

    for (j, name) in feature_names().enumerate() {
        let mut column: Vec<f64> = eval_x.iter().map(|row| row[j]).collect();
        column.shuffle(rng);

        let permuted: Vec<Vec<f64>> = eval_x
            .iter()
            .zip(column.iter())
            .map(|(row, &v)| {
                let mut r = row.clone();
                r[j] = v;
                r
            })
            .collect();

        let matrix = DenseMatrix::from_2d_vec(&permuted).map_err(|e| {
            TrainingDataError::FitFailed {
                reason: e.to_string(),
            }
        })?;
        let pred = model
            .predict(&matrix)
            .map_err(|reason| TrainingDataError::FitFailed { reason })?;

        let degradation = (rmse(&pred, eval_y) - base_rmse).max(0.0);
        weights.push((name.to_string(), degradation));
    }

    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    if total > 0.0 {
        for (_, w) in weights.iter_mut() {
            *w /= total;
        }
    }

    weights.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    Ok(weights
        .into_iter()
        .map(|(name, weight)| FeatureImportance { name, weight })
        .collect())
}

#[cfg(test)]
pub mod tests_support {
    use super::TrainingRow;
    use crate::domain::features::FeatureVector;

    /// Deterministic dataset where price is a clean linear function of
    /// horsepower, so even tiny models fit it sensibly.
    pub fn synthetic_rows(n: usize) -> Vec<TrainingRow> {
        (0..n)
            .map(|i| {
                let horsepower = 60.0 + 5.0 * i as f64;
                TrainingRow {
                    fueltype: if i % 2 == 0 { "gas" } else { "diesel" }.to_string(),
                    aspiration: if i % 3 == 0 { "turbo" } else { "std" }.to_string(),
                    doornumber: if i % 2 == 0 { "two" } else { "four" }.to_string(),
                    carbody: match i % 3 {
                        0 => "sedan",
                        1 => "hatchback",
                        _ => "wagon",
                    }
                    .to_string(),
                    drivewheel: if i % 2 == 0 { "fwd" } else { "rwd" }.to_string(),
                    enginelocation: "front".to_string(),
                    enginetype: "ohc".to_string(),
                    cylindernumber: if i % 4 == 0 { "six" } else { "four" }.to_string(),
                    fuelsystem: if i % 2 == 0 { "mpfi" } else { "2bbl" }.to_string(),
                    wheelbase: 88.0 + (i % 20) as f64,
                    carlength: 160.0 + (i % 30) as f64,
                    carwidth: 62.0 + (i % 8) as f64,
                    carheight: 48.0 + (i % 10) as f64,
                    curbweight: 1800.0 + 25.0 * i as f64,
                    enginesize: 90.0 + 3.0 * i as f64,
                    boreratio: 3.0 + 0.01 * (i % 10) as f64,
                    stroke: 3.1 + 0.01 * (i % 10) as f64,
                    compressionratio: 8.5 + 0.1 * (i % 5) as f64,
                    horsepower,
                    peakrpm: 4800.0 + 50.0 * (i % 10) as f64,
                    citympg: 20.0 + (i % 15) as f64,
                    highwaympg: 26.0 + (i % 15) as f64,
                    price: 2000.0 + 80.0 * horsepower,
                }
            })
            .collect()
    }

    /// A feature vector matching the i = 10 synthetic row, so predictions on
    /// it should land near its training target (2000 + 80 * 110 = 10800).
    pub fn valid_features() -> FeatureVector {
        let mut fv = FeatureVector::new();
        fv.insert_categorical("fueltype", "gas");
        fv.insert_categorical("aspiration", "std");
        fv.insert_categorical("doornumber", "two");
        fv.insert_categorical("carbody", "hatchback");
        fv.insert_categorical("drivewheel", "fwd");
        fv.insert_categorical("enginelocation", "front");
        fv.insert_categorical("enginetype", "ohc");
        fv.insert_categorical("cylindernumber", "four");
        fv.insert_categorical("fuelsystem", "mpfi");
        fv.insert_numeric("wheelbase", 98.0);
        fv.insert_numeric("carlength", 170.0);
        fv.insert_numeric("carwidth", 64.0);
        fv.insert_numeric("carheight", 48.0);
        fv.insert_numeric("curbweight", 2050.0);
        fv.insert_numeric("enginesize", 120.0);
        fv.insert_numeric("boreratio", 3.0);
        fv.insert_numeric("stroke", 3.1);
        fv.insert_numeric("compressionratio", 8.5);
        fv.insert_numeric("horsepower", 110.0);
        fv.insert_numeric("peakrpm", 4800.0);
        fv.insert_numeric("citympg", 30.0);
        fv.insert_numeric("highwaympg", 36.0);
        fv
    }
}
