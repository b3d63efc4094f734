//! Request and response bodies of the HTTP API

use crate::edge::EdgeCalculation;
use crate::ml::FeatureMap;
use crate::odds::OddsValue;
use serde::{Deserialize, Serialize};

/// `POST /predict/{version}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub features: Option<FeatureMap>,
}

/// Generic error body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

/// 404 body for an unknown model version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelNotFoundResponse {
    pub error: String,
    pub available_models: Vec<String>,
}

impl ModelNotFoundResponse {
    pub fn new(version: &str, available_models: Vec<String>) -> Self {
        Self {
            error: format!("Model {} not found", version),
            available_models,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
}

/// `POST /edge`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRequest {
    pub model_probability: f64,
    pub bookmaker_odds: OddsValue,
    /// `american` (default), `decimal` or `fractional`
    #[serde(default)]
    pub odds_format: Option<String>,
    #[serde(default)]
    pub edge_threshold: Option<f64>,
    #[serde(default)]
    pub bet_amount: Option<f64>,
    /// When set, the response also carries a Kelly stake
    #[serde(default)]
    pub kelly_fraction: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeResponse {
    #[serde(flatten)]
    pub calculation: EdgeCalculation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kelly_stake: Option<f64>,
}

/// `POST /kelly`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KellyRequest {
    pub model_probability: f64,
    pub bookmaker_odds: OddsValue,
    #[serde(default)]
    pub odds_format: Option<String>,
    #[serde(default)]
    pub fraction: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KellyResponse {
    pub kelly_stake: f64,
}
