//! Served models
//!
//! Each model is a serialized estimator file plus an optional metadata
//! sidecar declaring whether it is active and which feature order it expects.

mod artifact;
mod estimator;
mod registry;
mod scorer;
#[cfg(test)]
mod tests;

pub use artifact::{ModelArtifact, ModelInfo, ModelMetadata};
pub use estimator::{Estimator, LinearParams, RandomForest, ThresholdClassifier, TreeNode};
pub use registry::{
    LoadSummary, ModelRegistry, JSON_MODEL_EXTENSION, METADATA_EXTENSION, TOML_MODEL_EXTENSION,
};
pub use scorer::{LabelScorer, ModelHandle, ProbabilisticScorer};

#[cfg(test)]
pub use scorer::{MockLabelScorer, MockProbabilisticScorer};
