//! Configuration management

use crate::error::{Result, ServeError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub edge: EdgeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelsConfig {
    /// Directory scanned for model artifacts
    #[serde(default = "default_models_dir")]
    pub dir: PathBuf,
    /// Predictions slower than this are logged (never enforced)
    #[serde(default = "default_slow_prediction_ms")]
    pub slow_prediction_ms: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EdgeConfig {
    /// Minimum edge before recommending a bet
    #[serde(default = "default_edge_threshold")]
    pub threshold: f64,
    /// Stake used for expected value when the caller omits one
    #[serde(default = "default_stake")]
    pub stake: f64,
    /// Fractional Kelly multiplier (0.25 = quarter Kelly)
    #[serde(default = "default_kelly_fraction")]
    pub kelly_fraction: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_slow_prediction_ms() -> f64 {
    200.0
}

fn default_edge_threshold() -> f64 {
    0.05
}

fn default_stake() -> f64 {
    100.0
}

fn default_kelly_fraction() -> f64 {
    0.25
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            dir: default_models_dir(),
            slow_prediction_ms: default_slow_prediction_ms(),
        }
    }
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            threshold: default_edge_threshold(),
            stake: default_stake(),
            kelly_fraction: default_kelly_fraction(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from an optional TOML file, then `MONEYBALL__*` env vars
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = path.as_ref();
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path).required(false))
            .add_source(
                ::config::Environment::with_prefix("MONEYBALL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Config = settings.try_deserialize()?;
        config.models.dir = expand_path(&config.models.dir)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.edge.threshold.is_nan() || self.edge.threshold < 0.0 {
            return Err(ServeError::Config(format!(
                "edge.threshold must be non-negative, got {}",
                self.edge.threshold
            )));
        }
        if !self.edge.stake.is_finite() || self.edge.stake <= 0.0 {
            return Err(ServeError::Config(format!(
                "edge.stake must be positive, got {}",
                self.edge.stake
            )));
        }
        if !(self.edge.kelly_fraction > 0.0 && self.edge.kelly_fraction <= 1.0) {
            return Err(ServeError::Config(format!(
                "edge.kelly_fraction must be in (0, 1], got {}",
                self.edge.kelly_fraction
            )));
        }
        if self.models.slow_prediction_ms.is_nan() || self.models.slow_prediction_ms <= 0.0 {
            return Err(ServeError::Config(format!(
                "models.slow_prediction_ms must be positive, got {}",
                self.models.slow_prediction_ms
            )));
        }
        Ok(())
    }
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)
        .map_err(|e| ServeError::Config(format!("Cannot expand models.dir: {}", e)))?;
    Ok(PathBuf::from(expanded.into_owned()))
}
