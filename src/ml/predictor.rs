//! Prediction executor
//!
//! Single entry point for serving a prediction:
//!
//! ```text
//! lookup(version) -> vectorize(features) -> score -> respond
//! ```
//!
//! An unknown version yields `None`. A scoring failure yields an in-band
//! [`PredictionFailure`] so callers can tell the two apart.

use super::features::{vectorize, FeatureMap, FeatureVector};
use crate::error::{Result, ServeError};
use crate::model::{ModelHandle, ModelRegistry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Confidence reported for label-only models
pub const LABEL_ONLY_CONFIDENCE: f64 = 0.5;

/// Successful prediction for a binary (home/away) outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// P(class 1)
    #[serde(rename = "home_win_probability")]
    pub primary_probability: f64,
    /// P(class 0)
    #[serde(rename = "away_win_probability")]
    pub secondary_probability: f64,
    pub confidence: f64,
    pub model_version: String,
    pub prediction_time_ms: f64,
}

/// Scoring failed for a model that exists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionFailure {
    pub error: String,
    pub model_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictionOutcome {
    Success(PredictionResult),
    Failed(PredictionFailure),
}

impl PredictionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PredictionOutcome::Success(_))
    }
}

/// Raw scores before timing is attached
#[derive(Debug, Clone, Copy)]
struct Scores {
    primary: f64,
    secondary: f64,
    confidence: f64,
}

pub struct PredictionExecutor {
    registry: Arc<ModelRegistry>,
    /// Latency budget; exceeding it is logged only
    slow_prediction_ms: f64,
}

impl PredictionExecutor {
    pub fn new(registry: Arc<ModelRegistry>, slow_prediction_ms: f64) -> Self {
        Self {
            registry,
            slow_prediction_ms,
        }
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Predict with model `version`; `None` when the version is not loaded
    pub fn predict(&self, version: &str, features: &FeatureMap) -> Option<PredictionOutcome> {
        let Some(artifact) = self.registry.lookup(version) else {
            tracing::warn!("Model not found: {}", version);
            return None;
        };

        let vector = vectorize(features, &artifact.expected_features);

        let start = Instant::now();
        let scored = score(&artifact.handle, &vector);
        let prediction_time_ms = round2(start.elapsed().as_secs_f64() * 1000.0);

        let outcome = match scored {
            Ok(scores) => {
                if prediction_time_ms > self.slow_prediction_ms {
                    tracing::warn!(
                        "SLOW: {} took {:.2}ms (target: <{:.0}ms)",
                        version,
                        prediction_time_ms,
                        self.slow_prediction_ms
                    );
                }
                PredictionOutcome::Success(PredictionResult {
                    primary_probability: scores.primary,
                    secondary_probability: scores.secondary,
                    confidence: scores.confidence,
                    model_version: version.to_string(),
                    prediction_time_ms,
                })
            }
            Err(e) => {
                tracing::error!("Prediction failed for {}: {}", version, e);
                PredictionOutcome::Failed(PredictionFailure {
                    error: e.to_string(),
                    model_version: version.to_string(),
                })
            }
        };

        Some(outcome)
    }
}

fn score(handle: &ModelHandle, vector: &FeatureVector) -> Result<Scores> {
    match handle {
        ModelHandle::Probabilistic(scorer) => {
            let [p0, p1] = scorer.predict_proba(vector.values())?;
            if !p0.is_finite() || !p1.is_finite() {
                return Err(ServeError::Scoring(format!(
                    "Non-finite class probabilities [{}, {}]",
                    p0, p1
                )));
            }
            Ok(Scores {
                primary: p1,
                secondary: p0,
                confidence: (p1 - 0.5).abs() * 2.0,
            })
        }
        ModelHandle::Label(scorer) => {
            let predicted = scorer.predict(vector.values())?;
            if !predicted.is_finite() {
                return Err(ServeError::Scoring(format!("Non-finite prediction {}", predicted)));
            }
            Ok(Scores {
                primary: predicted,
                secondary: 1.0 - predicted,
                confidence: LABEL_ONLY_CONFIDENCE,
            })
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
