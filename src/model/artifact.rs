//! Loaded model artifacts and their metadata contract

use super::scorer::ModelHandle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Sidecar metadata stored next to a model file as `<stem>.json`
///
/// ```json
/// {
///   "is_active": true,
///   "expected_features": ["home_win_rate", "away_win_rate"],
///   "description": "NBA home win v1"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Feature order the model was trained on; empty means alphabetical
    #[serde(default)]
    pub expected_features: Vec<String>,
    /// Descriptive fields, kept for introspection only
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_active() -> bool {
    true
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            is_active: true,
            expected_features: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl ModelMetadata {
    /// Read metadata, falling back to defaults when absent or malformed
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|raw| serde_json::from_str::<ModelMetadata>(&raw).map_err(|e| e.to_string()));

        match parsed {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!("Failed to load metadata from {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// A model held in memory by the registry
#[derive(Debug)]
pub struct ModelArtifact {
    pub version: String,
    pub handle: ModelHandle,
    /// Estimator kind, e.g. `logistic_regression`
    pub kind: String,
    pub is_active: bool,
    pub expected_features: Vec<String>,
    pub loaded_at: DateTime<Utc>,
    pub source_path: PathBuf,
    pub extra: Map<String, Value>,
}

impl ModelArtifact {
    pub fn new(
        version: impl Into<String>,
        handle: ModelHandle,
        kind: impl Into<String>,
        metadata: ModelMetadata,
        source_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            version: version.into(),
            handle,
            kind: kind.into(),
            is_active: metadata.is_active,
            expected_features: metadata.expected_features,
            loaded_at: Utc::now(),
            source_path: source_path.into(),
            extra: metadata.extra,
        }
    }

    pub fn loaded_at_epoch_seconds(&self) -> f64 {
        self.loaded_at.timestamp_micros() as f64 / 1_000_000.0
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            version: self.version.clone(),
            kind: self.kind.clone(),
            probabilistic: self.handle.is_probabilistic(),
            path: self.source_path.display().to_string(),
            loaded_at: self.loaded_at,
            loaded_at_epoch_seconds: self.loaded_at_epoch_seconds(),
            is_active: self.is_active,
            expected_features: self.expected_features.clone(),
            metadata: self.extra.clone(),
        }
    }
}

/// Introspection view of an artifact, without the scorer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub version: String,
    pub kind: String,
    pub probabilistic: bool,
    pub path: String,
    pub loaded_at: DateTime<Utc>,
    pub loaded_at_epoch_seconds: f64,
    pub is_active: bool,
    pub expected_features: Vec<String>,
    pub metadata: Map<String, Value>,
}
