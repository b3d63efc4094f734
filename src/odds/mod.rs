//! Bookmaker odds conversion
//!
//! Converts American, decimal and fractional odds into raw implied
//! probability (no vig removal), total payout and decimal odds.
//!
//! - American: `-110`, `+150`
//! - Decimal: `1.91`, `2.50`
//! - Fractional: `"5/2"`, `"11/10"` (always a string)


use crate::error::{Result, ServeError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported odds representations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OddsFormat {
    #[default]
    American,
    Decimal,
    Fractional,
}

impl OddsFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OddsFormat::American => "american",
            OddsFormat::Decimal => "decimal",
            OddsFormat::Fractional => "fractional",
        }
    }
}

impl fmt::Display for OddsFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OddsFormat {
    type Err = ServeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "american" => Ok(OddsFormat::American),
            "decimal" => Ok(OddsFormat::Decimal),
            "fractional" => Ok(OddsFormat::Fractional),
            other => Err(ServeError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Odds as supplied by a caller: a number, or a string such as `"5/2"` or `"-110"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OddsValue {
    Number(f64),
    Text(String),
}

impl From<f64> for OddsValue {
    fn from(v: f64) -> Self {
        OddsValue::Number(v)
    }
}

impl From<&str> for OddsValue {
    fn from(s: &str) -> Self {
        OddsValue::Text(s.to_string())
    }
}

impl fmt::Display for OddsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OddsValue::Number(n) => write!(f, "{}", n),
            OddsValue::Text(s) => f.write_str(s),
        }
    }
}

impl OddsValue {
    /// Numeric value for american/decimal odds. Numeric strings like `"+150"` are accepted.
    pub fn as_number(&self) -> Result<f64> {
        let value = match self {
            OddsValue::Number(n) => *n,
            OddsValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ServeError::InvalidOdds(format!("'{}' is not a number", s)))?,
        };
        if !value.is_finite() {
            return Err(ServeError::InvalidOdds(format!("{} is not finite", value)));
        }
        Ok(value)
    }

    /// `(numerator, denominator)` of fractional odds
    pub fn as_fraction(&self) -> Result<(f64, f64)> {
        let s = match self {
            OddsValue::Text(s) => s,
            OddsValue::Number(_) => {
                return Err(ServeError::InvalidOdds(
                    "Fractional odds must be a string in 'numerator/denominator' form".into(),
                ))
            }
        };

        let (num, den) = s
            .split_once('/')
            .ok_or_else(|| ServeError::InvalidOdds(format!("'{}' is not 'numerator/denominator'", s)))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ServeError::InvalidOdds(format!("'{}' is not 'numerator/denominator'", s)))
        };
        let numerator = parse(num)?;
        let denominator = parse(den)?;

        if numerator < 0.0 || denominator <= 0.0 {
            return Err(ServeError::InvalidOdds(format!(
                "'{}' needs a non-negative numerator and positive denominator",
                s
            )));
        }
        Ok((numerator, denominator))
    }
}

fn american(odds: &OddsValue) -> Result<f64> {
    let value = odds.as_number()?;
    if value == 0.0 {
        return Err(ServeError::InvalidOdds("American odds of 0 are undefined".into()));
    }
    Ok(value)
}

fn decimal(odds: &OddsValue) -> Result<f64> {
    let value = odds.as_number()?;
    if value <= 0.0 {
        return Err(ServeError::InvalidOdds(format!(
            "Decimal odds must be positive, got {}",
            value
        )));
    }
    Ok(value)
}

/// Raw implied probability encoded by the odds
pub fn implied_probability(odds: &OddsValue, format: OddsFormat) -> Result<f64> {
    match format {
        OddsFormat::American => {
            let value = american(odds)?;
            if value > 0.0 {
                Ok(100.0 / (value + 100.0))
            } else {
                Ok(value.abs() / (value.abs() + 100.0))
            }
        }
        OddsFormat::Decimal => Ok(1.0 / decimal(odds)?),
        OddsFormat::Fractional => {
            let (numerator, denominator) = odds.as_fraction()?;
            Ok(denominator / (numerator + denominator))
        }
    }
}

/// Total return on a winning bet, including the stake
pub fn payout(odds: &OddsValue, format: OddsFormat, stake: f64) -> Result<f64> {
    match format {
        OddsFormat::American => {
            let value = american(odds)?;
            if value > 0.0 {
                Ok(stake + stake * value / 100.0)
            } else {
                Ok(stake + stake * 100.0 / value.abs())
            }
        }
        OddsFormat::Decimal => Ok(stake * decimal(odds)?),
        OddsFormat::Fractional => {
            let (numerator, denominator) = odds.as_fraction()?;
            Ok(stake + stake * numerator / denominator)
        }
    }
}

/// Convert American odds to decimal odds
pub fn american_to_decimal(american_odds: f64) -> Result<f64> {
    let value = american(&OddsValue::Number(american_odds))?;
    if value > 0.0 {
        Ok(value / 100.0 + 1.0)
    } else {
        Ok(100.0 / value.abs() + 1.0)
    }
}

/// Decimal odds for Kelly sizing. Fractional odds are not accepted here.
pub fn decimal_odds(odds: &OddsValue, format: OddsFormat) -> Result<f64> {
    match format {
        OddsFormat::American => american_to_decimal(odds.as_number()?),
        OddsFormat::Decimal => decimal(odds),
        OddsFormat::Fractional => Err(ServeError::UnsupportedFormat(
            "Kelly criterion requires american or decimal odds".into(),
        )),
    }
}
