// Static specification catalog (fallback store)
pub mod catalog;

// Price estimation models: training, persistence, inference
pub mod estimator;

// Heuristic price fallback
pub mod heuristic;

// Vehicle detail synthesis
pub mod synthesizer;
