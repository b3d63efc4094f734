//! Feature vectorization
//!
//! Maps a loosely typed feature bag onto the fixed column order a model was
//! trained with. Bad input degrades to `0.0`; vectorization never fails.

use serde_json::Value;
use std::collections::HashMap;

/// Raw features as received from callers
pub type FeatureMap = HashMap<String, Value>;

/// Default for missing or unparseable features
pub const DEFAULT_FEATURE_VALUE: f32 = 0.0;

/// A single input row, shape `(1, n)`
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f32>,
}

impl FeatureVector {
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn shape(&self) -> (usize, usize) {
        (1, self.values.len())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Coerce a JSON value to `f32` the way a lenient float parse would
pub fn coerce(value: &Value) -> Option<f32> {
    match value {
        Value::Number(n) => n.as_f64().map(|v| v as f32),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|v| v as f32),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Build the input row for a model
///
/// With a non-empty `expected_order` the row follows it exactly, padding
/// missing names with `0.0`. With an empty order the supplied keys are used
/// in lexicographic order.
pub fn vectorize(features: &FeatureMap, expected_order: &[String]) -> FeatureVector {
    let values = if expected_order.is_empty() {
        let mut names: Vec<&String> = features.keys().collect();
        names.sort();
        names
            .into_iter()
            .map(|name| coerce_or_default(name, &features[name]))
            .collect()
    } else {
        expected_order
            .iter()
            .map(|name| match features.get(name) {
                Some(value) => coerce_or_default(name, value),
                None => {
                    tracing::warn!("Missing feature: {}, using {}", name, DEFAULT_FEATURE_VALUE);
                    DEFAULT_FEATURE_VALUE
                }
            })
            .collect()
    };

    FeatureVector { values }
}

fn coerce_or_default(name: &str, value: &Value) -> f32 {
    coerce(value).unwrap_or_else(|| {
        tracing::warn!("Invalid value for {}: {}, using {}", name, value, DEFAULT_FEATURE_VALUE);
        DEFAULT_FEATURE_VALUE
    })
}
