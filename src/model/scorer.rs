//! Scoring capabilities of a loaded model

use crate::error::Result;
use std::fmt;

/// Model that returns a probability distribution over classes {0, 1}
#[cfg_attr(test, mockall::automock)]
pub trait ProbabilisticScorer: Send + Sync {
    /// `[P(class 0), P(class 1)]` for a single input row
    fn predict_proba(&self, row: &[f32]) -> Result<[f64; 2]>;
}

/// Model that only predicts a single value per row
#[cfg_attr(test, mockall::automock)]
pub trait LabelScorer: Send + Sync {
    fn predict(&self, row: &[f32]) -> Result<f64>;
}

/// Owned scorer of a loaded artifact
pub enum ModelHandle {
    Probabilistic(Box<dyn ProbabilisticScorer>),
    Label(Box<dyn LabelScorer>),
}

impl ModelHandle {
    pub fn is_probabilistic(&self) -> bool {
        matches!(self, ModelHandle::Probabilistic(_))
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelHandle::Probabilistic(_) => f.write_str("ModelHandle::Probabilistic"),
            ModelHandle::Label(_) => f.write_str("ModelHandle::Label"),
        }
    }
}
