//! Moneyball Model Serving
//!
//! Serves pre-trained binary classifiers for sports betting and turns their
//! probabilities into betting decisions.
//!
//! ## Architecture
//!
//! ```text
//! HTTP (api) → ModelRegistry.lookup → PredictionExecutor → vectorize → scorer
//!            → EdgeEngine.evaluate → odds conversion → recommendation
//! ```

pub mod api;
pub mod config;
pub mod edge;
pub mod error;
pub mod ml;
pub mod model;
pub mod odds;
pub mod types;

#[cfg(test)]
mod types_tests;
