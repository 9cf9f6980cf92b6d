use thiserror::Error;

/// Errors raised while fitting an estimator from a training dataset.
/// Fatal to the training step; there is no partial artifact on failure.
#[derive(Debug, Error)]
pub enum TrainingDataError {
    #[error("training dataset is empty")]
    EmptyDataset,

    #[error("missing required column: {name}")]
    MissingColumn { name: String },

    #[error("malformed row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error("model fit failed: {reason}")]
    FitFailed { reason: String },

    #[error("failed to read training data: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised when an inference request violates the fixed feature schema.
/// Policy: reject rather than silently default, to avoid silent mispredictions.
#[derive(Debug, Error)]
pub enum SchemaMismatchError {
    #[error("missing required feature: {name}")]
    MissingField { name: String },

    #[error("unknown category for {field}: '{value}' was never seen during training")]
    UnknownCategory { field: String, value: String },
}

/// Errors surfaced by a price prediction request.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error(transparent)]
    Schema(#[from] SchemaMismatchError),

    #[error("inference failed: {reason}")]
    Inference { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_formatting() {
        let err = SchemaMismatchError::UnknownCategory {
            field: "fueltype".to_string(),
            value: "hydrogen".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("fueltype"));
        assert!(msg.contains("hydrogen"));
    }

    #[test]
    fn test_training_error_formatting() {
        let err = TrainingDataError::MalformedRow {
            row: 17,
            reason: "invalid float literal".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("17"));
        assert!(msg.contains("invalid float literal"));
    }

    #[test]
    fn test_prediction_error_wraps_schema() {
        let err = PredictionError::from(SchemaMismatchError::MissingField {
            name: "enginesize".to_string(),
        });

        assert!(err.to_string().contains("enginesize"));
    }
}
