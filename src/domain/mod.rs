// Domain-specific error types
pub mod errors;

// Feature schema shared by training and inference
pub mod features;

// Vehicle identity, classification and detail records
pub mod vehicle;
