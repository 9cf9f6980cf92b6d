pub mod artifact;
pub mod loaded;
pub mod predictor;
pub mod training;

pub use artifact::ModelArtifact;
pub use loaded::LoadedEstimator;
pub use predictor::PriceModel;
