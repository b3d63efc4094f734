//! Serialized estimator definitions
//!
//! Artifacts on disk describe a fitted estimator by its parameters. The same
//! schema is accepted as JSON (`.model`) or TOML (`.toml`):
//!
//! ```json
//! { "kind": "logistic_regression", "coefficients": [0.8, -0.8], "intercept": 0.1 }
//! ```

use super::scorer::{LabelScorer, ModelHandle, ProbabilisticScorer};
use crate::error::{Result, ServeError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    LogisticRegression(LinearParams),
    RandomForest(RandomForest),
    LinearRegression(LinearParams),
    ThresholdClassifier(ThresholdClassifier),
}

/// Weights and bias of a linear model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearParams {
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub trees: Vec<TreeNode>,
}

/// Binary decision tree; rows go left when `row[feature] <= threshold`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Leaf {
        /// P(class 1) at this leaf
        probability: f64,
    },
}

/// Predicts 1.0 when `row[feature] > threshold`, otherwise 0.0
///
/// Without `n_features` any row long enough to contain `feature` is scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdClassifier {
    pub feature: usize,
    pub threshold: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_features: Option<usize>,
}

impl Estimator {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ServeError::InvalidModel(format!("Invalid TOML estimator: {}", e)))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Estimator::LogisticRegression(_) => "logistic_regression",
            Estimator::RandomForest(_) => "random_forest",
            Estimator::LinearRegression(_) => "linear_regression",
            Estimator::ThresholdClassifier(_) => "threshold_classifier",
        }
    }

    /// Validate parameters and wrap into a scorer handle
    pub fn into_handle(self) -> Result<ModelHandle> {
        match self {
            Estimator::LogisticRegression(params) => {
                params.validate()?;
                Ok(ModelHandle::Probabilistic(Box::new(LogisticRegression(params))))
            }
            Estimator::RandomForest(forest) => {
                forest.validate()?;
                Ok(ModelHandle::Probabilistic(Box::new(forest)))
            }
            Estimator::LinearRegression(params) => {
                params.validate()?;
                Ok(ModelHandle::Label(Box::new(LinearRegression(params))))
            }
            Estimator::ThresholdClassifier(clf) => {
                clf.validate()?;
                Ok(ModelHandle::Label(Box::new(clf)))
            }
        }
    }
}

fn check_arity(expected: usize, row: &[f32]) -> Result<()> {
    if row.len() != expected {
        return Err(ServeError::DimensionMismatch {
            expected,
            actual: row.len(),
        });
    }
    Ok(())
}

fn finite(value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ServeError::Scoring(format!("Model produced non-finite output {}", value)))
    }
}

impl LinearParams {
    fn validate(&self) -> Result<()> {
        if self.coefficients.is_empty() {
            return Err(ServeError::InvalidModel("Linear model has no coefficients".into()));
        }
        if self.coefficients.iter().any(|w| !w.is_finite()) || !self.intercept.is_finite() {
            return Err(ServeError::InvalidModel("Linear model has non-finite parameters".into()));
        }
        Ok(())
    }

    fn decision(&self, row: &[f32]) -> Result<f64> {
        check_arity(self.coefficients.len(), row)?;
        let z = self
            .coefficients
            .iter()
            .zip(row)
            .map(|(w, x)| w * f64::from(*x))
            .sum::<f64>()
            + self.intercept;
        finite(z)
    }
}

struct LogisticRegression(LinearParams);

impl ProbabilisticScorer for LogisticRegression {
    fn predict_proba(&self, row: &[f32]) -> Result<[f64; 2]> {
        let z = self.0.decision(row)?;
        let p1 = 1.0 / (1.0 + (-z).exp());
        Ok([1.0 - p1, p1])
    }
}

struct LinearRegression(LinearParams);

impl LabelScorer for LinearRegression {
    fn predict(&self, row: &[f32]) -> Result<f64> {
        self.0.decision(row)
    }
}

impl TreeNode {
    fn validate(&self, n_features: usize) -> Result<()> {
        match self {
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= n_features {
                    return Err(ServeError::InvalidModel(format!(
                        "Split on feature {} but forest declares {} features",
                        feature, n_features
                    )));
                }
                if !threshold.is_finite() {
                    return Err(ServeError::InvalidModel("Split threshold must be finite".into()));
                }
                left.validate(n_features)?;
                right.validate(n_features)
            }
            TreeNode::Leaf { probability } => {
                if !(0.0..=1.0).contains(probability) {
                    return Err(ServeError::InvalidModel(format!(
                        "Leaf probability {} outside [0, 1]",
                        probability
                    )));
                }
                Ok(())
            }
        }
    }

    fn leaf_probability(&self, row: &[f32]) -> f64 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if f64::from(row[*feature]) <= *threshold {
                        left.as_ref()
                    } else {
                        right.as_ref()
                    };
                }
                TreeNode::Leaf { probability } => return *probability,
            }
        }
    }
}

impl RandomForest {
    fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(ServeError::InvalidModel("Random forest has no trees".into()));
        }
        for tree in &self.trees {
            tree.validate(self.n_features)?;
        }
        Ok(())
    }
}

impl ProbabilisticScorer for RandomForest {
    fn predict_proba(&self, row: &[f32]) -> Result<[f64; 2]> {
        check_arity(self.n_features, row)?;
        let total: f64 = self.trees.iter().map(|t| t.leaf_probability(row)).sum();
        let p1 = finite(total / self.trees.len() as f64)?;
        Ok([1.0 - p1, p1])
    }
}

impl ThresholdClassifier {
    fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() {
            return Err(ServeError::InvalidModel("Threshold must be finite".into()));
        }
        if let Some(n_features) = self.n_features {
            if self.feature >= n_features {
                return Err(ServeError::InvalidModel(format!(
                    "Feature index {} out of range for {} features",
                    self.feature, n_features
                )));
            }
        }
        Ok(())
    }
}

impl LabelScorer for ThresholdClassifier {
    fn predict(&self, row: &[f32]) -> Result<f64> {
        if let Some(n_features) = self.n_features {
            check_arity(n_features, row)?;
        }
        let value = row.get(self.feature).ok_or(ServeError::DimensionMismatch {
            expected: self.feature + 1,
            actual: row.len(),
        })?;
        Ok(if f64::from(*value) > self.threshold { 1.0 } else { 0.0 })
    }
}
