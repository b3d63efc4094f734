//! Model registry
//!
//! Scans a directory for model artifacts, skips inactive ones and indexes
//! the rest by version (the file stem). The map is built off to the side
//! and published with a single pointer swap, so readers never see a
//! partially loaded registry and never wait on a reload.

use super::artifact::{ModelArtifact, ModelInfo, ModelMetadata};
use super::estimator::Estimator;
use crate::error::{Result, ServeError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// JSON-encoded estimator
pub const JSON_MODEL_EXTENSION: &str = "model";
/// TOML-encoded estimator
pub const TOML_MODEL_EXTENSION: &str = "toml";
pub const METADATA_EXTENSION: &str = "json";

type ModelMap = HashMap<String, Arc<ModelArtifact>>;

/// Counts from one load pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub loaded: usize,
    /// Inactive artifacts
    pub skipped: usize,
    pub failed: usize,
}

pub struct ModelRegistry {
    dir: PathBuf,
    models: RwLock<Arc<ModelMap>>,
}

impl ModelRegistry {
    /// Empty registry bound to `dir`; call [`load_all`](Self::load_all) to populate
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            models: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    /// Build a registry from artifacts already in memory. Inactive ones are dropped.
    pub fn from_artifacts(artifacts: impl IntoIterator<Item = ModelArtifact>) -> Self {
        let models: ModelMap = artifacts
            .into_iter()
            .filter(|a| a.is_active)
            .map(|a| (a.version.clone(), Arc::new(a)))
            .collect();
        Self {
            dir: PathBuf::new(),
            models: RwLock::new(Arc::new(models)),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load every active artifact in the directory and publish the result
    ///
    /// A bad file never aborts the pass; it is logged and counted as failed.
    pub fn load_all(&self) -> LoadSummary {
        tracing::info!("Loading models from {}", self.dir.display());
        let start = Instant::now();

        let paths = match self.artifact_paths() {
            Ok(paths) => paths,
            Err(e) => {
                tracing::warn!("Cannot read models directory {}: {}", self.dir.display(), e);
                Vec::new()
            }
        };
        if paths.is_empty() {
            tracing::warn!("No model files found in {}", self.dir.display());
        }

        let mut summary = LoadSummary::default();
        let mut models = ModelMap::new();

        for path in paths {
            match load_artifact(&path) {
                Ok(Some(artifact)) => {
                    if models.contains_key(&artifact.version) {
                        tracing::warn!(
                            "Duplicate model version {}, {} replaces the earlier file",
                            artifact.version,
                            path.display()
                        );
                        summary.loaded -= 1;
                    }
                    tracing::info!("Loaded model {} ({})", artifact.version, artifact.kind);
                    models.insert(artifact.version.clone(), Arc::new(artifact));
                    summary.loaded += 1;
                }
                Ok(None) => {
                    summary.skipped += 1;
                }
                Err(e) => {
                    tracing::error!("{}", e);
                    summary.failed += 1;
                }
            }
        }

        let mut versions: Vec<&String> = models.keys().collect();
        versions.sort();
        tracing::info!(
            "Model loading complete: {} loaded, {} skipped, {} failed, took {:.2}s",
            summary.loaded,
            summary.skipped,
            summary.failed,
            start.elapsed().as_secs_f64()
        );
        if !versions.is_empty() {
            tracing::info!("Available models: {:?}", versions);
        }

        let previous = std::mem::replace(&mut *self.models.write(), Arc::new(models));
        drop(previous);
        summary
    }

    /// Exact, case-sensitive version lookup
    pub fn lookup(&self, version: &str) -> Option<Arc<ModelArtifact>> {
        self.snapshot().get(version).cloned()
    }

    /// Loaded versions, sorted
    pub fn list_versions(&self) -> Vec<String> {
        let mut versions: Vec<String> = self.snapshot().keys().cloned().collect();
        versions.sort();
        versions
    }

    pub fn model_info(&self, version: &str) -> Option<ModelInfo> {
        self.lookup(version).map(|a| a.info())
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    fn snapshot(&self) -> Arc<ModelMap> {
        self.models.read().clone()
    }

    /// Model files in the directory, sorted so the pass order is deterministic
    fn artifact_paths(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {}: {}", self.dir.display(), e);
                    continue;
                }
            };
            if path.is_file() && is_model_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

fn is_model_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some(JSON_MODEL_EXTENSION) | Some(TOML_MODEL_EXTENSION)
    )
}

/// Load one artifact; `Ok(None)` when its metadata marks it inactive
fn load_artifact(path: &Path) -> Result<Option<ModelArtifact>> {
    let load_error = |reason: String| ServeError::ModelLoad {
        path: path.to_path_buf(),
        reason,
    };

    let version = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| load_error("file name is not valid UTF-8".into()))?
        .to_string();

    let metadata = ModelMetadata::load(&path.with_extension(METADATA_EXTENSION));
    if !metadata.is_active {
        tracing::info!("Skipping inactive model: {}", version);
        return Ok(None);
    }

    let raw = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
    let estimator = match path.extension().and_then(|e| e.to_str()) {
        Some(TOML_MODEL_EXTENSION) => Estimator::from_toml_str(&raw),
        _ => Estimator::from_json_str(&raw),
    }
    .map_err(|e| load_error(e.to_string()))?;

    let kind = estimator.kind();
    let handle = estimator.into_handle().map_err(|e| load_error(e.to_string()))?;

    Ok(Some(ModelArtifact::new(version, handle, kind, metadata, path)))
}
