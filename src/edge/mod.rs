//! Edge and expected value engine
//!
//! Compares a model probability against the bookmaker's implied probability:
//!
//! ```text
//! edge = model_probability - implied_probability
//! EV   = p * (payout - stake) - (1 - p) * stake
//! ```
//!
//! A bet is recommended only when the edge strictly exceeds the threshold.


use crate::config::EdgeConfig;
use crate::error::{Result, ServeError};
use crate::odds::{self, OddsFormat, OddsValue};
use serde::{Deserialize, Serialize};

/// Betting recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendedSide {
    /// Edge above threshold
    Bet,
    /// Edge below negative threshold
    Pass,
    /// Edge within the threshold band
    Neutral,
}

impl RecommendedSide {
    fn from_edge(edge: f64, threshold: f64) -> Self {
        if edge > threshold {
            RecommendedSide::Bet
        } else if edge < -threshold {
            RecommendedSide::Pass
        } else {
            RecommendedSide::Neutral
        }
    }
}

/// Result of an edge evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeCalculation {
    pub model_probability: f64,
    pub implied_probability: f64,
    pub edge: f64,
    /// Expected profit in currency units for the given stake
    pub expected_value: f64,
    pub recommended_side: RecommendedSide,
    /// `min(|edge| * 2, 1)`
    pub confidence: f64,
}

impl EdgeCalculation {
    /// Copy with every float rounded to 4 decimal places for responses
    pub fn rounded(&self) -> Self {
        Self {
            model_probability: round4(self.model_probability),
            implied_probability: round4(self.implied_probability),
            edge: round4(self.edge),
            expected_value: round4(self.expected_value),
            recommended_side: self.recommended_side,
            confidence: round4(self.confidence),
        }
    }
}

pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn check_probability(p: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ServeError::InvalidProbability(p));
    }
    Ok(p)
}

fn check_stake(stake: f64) -> Result<f64> {
    if !stake.is_finite() || stake <= 0.0 {
        return Err(ServeError::InvalidStake(stake));
    }
    Ok(stake)
}

fn check_threshold(threshold: f64) -> Result<f64> {
    if threshold.is_nan() || threshold < 0.0 {
        return Err(ServeError::InvalidThreshold(threshold));
    }
    Ok(threshold)
}

/// Expected profit of staking `stake` at `odds` when the win probability is `p`
pub fn expected_value(p: f64, odds: &OddsValue, format: OddsFormat, stake: f64) -> Result<f64> {
    let profit_if_win = odds::payout(odds, format, stake)? - stake;
    Ok(p * profit_if_win - (1.0 - p) * stake)
}

/// Evaluate a betting opportunity
pub fn evaluate(
    model_probability: f64,
    odds: &OddsValue,
    format: OddsFormat,
    edge_threshold: f64,
    stake: f64,
) -> Result<EdgeCalculation> {
    let p = check_probability(model_probability)?;
    let stake = check_stake(stake)?;
    let edge_threshold = check_threshold(edge_threshold)?;

    let implied_probability = odds::implied_probability(odds, format)?;
    let edge = p - implied_probability;
    let ev = expected_value(p, odds, format, stake)?;
    let recommended_side = RecommendedSide::from_edge(edge, edge_threshold);
    let confidence = (edge.abs() * 2.0).min(1.0);

    tracing::debug!(
        "Edge calculation: model_prob={:.4}, odds={} ({}), edge={:.4}, ev={:.2}, side={:?}",
        p,
        odds,
        format,
        edge,
        ev,
        recommended_side
    );

    Ok(EdgeCalculation {
        model_probability: p,
        implied_probability,
        edge,
        expected_value: ev,
        recommended_side,
        confidence,
    })
}

/// Fractional Kelly stake as a share of bankroll
///
/// Kelly formula: f* = (b * p - q) / b
/// Where:
///   b = decimal odds - 1 (net odds)
///   p = probability of winning
///   q = 1 - p
///
/// A negative full Kelly means "don't bet" and is clamped to zero
/// before the fraction is applied.
pub fn kelly_stake(
    model_probability: f64,
    odds: &OddsValue,
    format: OddsFormat,
    fraction: f64,
) -> Result<f64> {
    let p = check_probability(model_probability)?;
    if !(fraction > 0.0 && fraction <= 1.0) {
        return Err(ServeError::InvalidStake(fraction));
    }

    let b = odds::decimal_odds(odds, format)? - 1.0;
    if b <= 0.0 {
        return Err(ServeError::InvalidOdds(format!(
            "Kelly sizing needs decimal odds above 1.0, got {}",
            b + 1.0
        )));
    }

    let full_kelly = (b * p - (1.0 - p)) / b;
    Ok(full_kelly.max(0.0) * fraction)
}

/// Edge evaluation with configured defaults
#[derive(Debug, Clone)]
pub struct EdgeEngine {
    config: EdgeConfig,
}

impl EdgeEngine {
    pub fn new(config: EdgeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }

    /// Evaluate, falling back to configured threshold and stake
    pub fn evaluate(
        &self,
        model_probability: f64,
        odds: &OddsValue,
        format: OddsFormat,
        edge_threshold: Option<f64>,
        stake: Option<f64>,
    ) -> Result<EdgeCalculation> {
        evaluate(
            model_probability,
            odds,
            format,
            edge_threshold.unwrap_or(self.config.threshold),
            stake.unwrap_or(self.config.stake),
        )
    }

    /// Kelly stake, falling back to the configured fraction
    pub fn kelly_stake(
        &self,
        model_probability: f64,
        odds: &OddsValue,
        format: OddsFormat,
        fraction: Option<f64>,
    ) -> Result<f64> {
        kelly_stake(
            model_probability,
            odds,
            format,
            fraction.unwrap_or(self.config.kelly_fraction),
        )
    }
}

impl Default for EdgeEngine {
    fn default() -> Self {
        Self::new(EdgeConfig::default())
    }
}
