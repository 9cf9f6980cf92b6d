use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered list of categorical feature names.
/// Together with `NUMERIC_FEATURES` this order defines the encoded vector
/// layout (categoricals first, then numerics). It MUST stay in sync with
/// saved model artifacts; any change here is a breaking change for them.
pub const CATEGORICAL_FEATURES: &[&str] = &[
    "fueltype",
    "aspiration",
    "doornumber",
    "carbody",
    "drivewheel",
    "enginelocation",
    "enginetype",
    "cylindernumber",
    "fuelsystem",
];

/// Ordered list of numeric feature names. See `CATEGORICAL_FEATURES`.
pub const NUMERIC_FEATURES: &[&str] = &[
    "wheelbase",
    "carlength",
    "carwidth",
    "carheight",
    "curbweight",
    "enginesize",
    "boreratio",
    "stroke",
    "compressionratio",
    "horsepower",
    "peakrpm",
    "citympg",
    "highwaympg",
];

/// Total width of the encoded feature vector.
pub fn feature_count() -> usize {
    CATEGORICAL_FEATURES.len() + NUMERIC_FEATURES.len()
}

/// All feature names in encoding order.
pub fn feature_names() -> impl Iterator<Item = &'static str> {
    CATEGORICAL_FEATURES
        .iter()
        .chain(NUMERIC_FEATURES.iter())
        .copied()
}

/// A single named attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Numeric(f64),
    Categorical(String),
}

/// A vehicle configuration described by named attributes.
///
/// Stored as a name -> value map rather than a fixed struct so that an absent
/// field is representable and can be rejected at predict time. The wire shape
/// is a flat JSON object: strings become categorical values, numbers numeric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector {
    values: BTreeMap<String, FeatureValue>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_categorical(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values
            .insert(name.into(), FeatureValue::Categorical(value.into()));
    }

    pub fn insert_numeric(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), FeatureValue::Numeric(value));
    }

    pub fn remove(&mut self, name: &str) {
        self.values.remove(name);
    }

    /// Categorical value for `name`, if present and actually categorical.
    pub fn categorical(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(FeatureValue::Categorical(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Numeric value for `name`, if present and actually numeric.
    pub fn numeric(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(FeatureValue::Numeric(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
