//! Inference pipeline
//!
//! - Feature vectorization against a model's declared feature order
//! - Prediction execution with latency accounting and in-band scoring errors

pub mod features;
pub mod predictor;


pub use features::{coerce, vectorize, FeatureMap, FeatureVector, DEFAULT_FEATURE_VALUE};
pub use predictor::{
    PredictionExecutor, PredictionFailure, PredictionOutcome, PredictionResult, LABEL_ONLY_CONFIDENCE,
};
