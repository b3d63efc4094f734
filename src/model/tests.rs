//! Tests for model module

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::error::ServeError;
    use std::fs;
    use std::path::Path;

    const LOGISTIC: &str = r#"{"kind": "logistic_regression", "coefficients": [1.0, -1.0], "intercept": 0.0}"#;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    fn proba(handle: &ModelHandle, row: &[f32]) -> [f64; 2] {
        match handle {
            ModelHandle::Probabilistic(scorer) => scorer.predict_proba(row).unwrap(),
            ModelHandle::Label(_) => panic!("Expected probabilistic scorer"),
        }
    }

    #[test]
    fn test_logistic_regression_scores() {
        let handle = Estimator::from_json_str(LOGISTIC).unwrap().into_handle().unwrap();

        let [p0, p1] = proba(&handle, &[0.0, 0.0]);
        assert!((p1 - 0.5).abs() < 1e-12);
        assert!((p0 + p1 - 1.0).abs() < 1e-12);

        let [_, p1] = proba(&handle, &[2.0, 0.0]);
        assert!(p1 > 0.85);
    }

    #[test]
    fn test_logistic_regression_arity_mismatch() {
        let handle = Estimator::from_json_str(LOGISTIC).unwrap().into_handle().unwrap();
        let ModelHandle::Probabilistic(scorer) = handle else {
            panic!("Expected probabilistic scorer");
        };

        let err = scorer.predict_proba(&[]).unwrap_err();
        assert!(matches!(err, ServeError::DimensionMismatch { expected: 2, actual: 0 }));
    }

    #[test]
    fn test_random_forest_averages_trees() {
        let json = r#"{
            "kind": "random_forest",
            "n_features": 2,
            "trees": [
                {"node": "split", "feature": 0, "threshold": 0.5,
                 "left": {"node": "leaf", "probability": 0.2},
                 "right": {"node": "leaf", "probability": 0.8}},
                {"node": "leaf", "probability": 0.6}
            ]
        }"#;
        let handle = Estimator::from_json_str(json).unwrap().into_handle().unwrap();

        let [_, p1] = proba(&handle, &[0.5, 9.0]);
        assert!((p1 - 0.4).abs() < 1e-12);

        let [p0, p1] = proba(&handle, &[0.9, 9.0]);
        assert!((p1 - 0.7).abs() < 1e-12);
        assert!((p0 - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_random_forest_rejects_bad_definitions() {
        let empty = r#"{"kind": "random_forest", "n_features": 1, "trees": []}"#;
        let err = Estimator::from_json_str(empty).unwrap().into_handle().unwrap_err();
        assert!(matches!(err, ServeError::InvalidModel(_)));

        let out_of_range = r#"{"kind": "random_forest", "n_features": 1, "trees": [
            {"node": "split", "feature": 3, "threshold": 0.0,
             "left": {"node": "leaf", "probability": 0.1},
             "right": {"node": "leaf", "probability": 0.9}}
        ]}"#;
        let err = Estimator::from_json_str(out_of_range).unwrap().into_handle().unwrap_err();
        assert!(matches!(err, ServeError::InvalidModel(_)));
    }

    #[test]
    fn test_label_scorers() {
        let linear = r#"{"kind": "linear_regression", "coefficients": [0.5], "intercept": 0.1}"#;
        let handle = Estimator::from_json_str(linear).unwrap().into_handle().unwrap();
        let ModelHandle::Label(scorer) = handle else {
            panic!("Expected label scorer");
        };
        assert!((scorer.predict(&[1.0]).unwrap() - 0.6).abs() < 1e-9);

        let threshold = r#"{"kind": "threshold_classifier", "feature": 1, "threshold": 10.0}"#;
        let handle = Estimator::from_json_str(threshold).unwrap().into_handle().unwrap();
        assert!(!handle.is_probabilistic());
        let ModelHandle::Label(scorer) = handle else {
            panic!("Expected label scorer");
        };
        assert_eq!(scorer.predict(&[0.0, 12.0]).unwrap(), 1.0);
        assert_eq!(scorer.predict(&[0.0, 10.0]).unwrap(), 0.0);
        assert!(scorer.predict(&[0.0]).is_err());
        assert_eq!(scorer.predict(&[0.0, 12.0, 3.0]).unwrap(), 1.0);
    }

    #[test]
    fn test_threshold_classifier_with_declared_arity() {
        let json = r#"{"kind": "threshold_classifier", "feature": 1, "threshold": 10.0, "n_features": 2}"#;
        let ModelHandle::Label(scorer) = Estimator::from_json_str(json).unwrap().into_handle().unwrap() else {
            panic!("Expected label scorer");
        };
        assert_eq!(scorer.predict(&[0.0, 12.0]).unwrap(), 1.0);
        let err = scorer.predict(&[0.0, 12.0, 3.0]).unwrap_err();
        assert!(matches!(err, ServeError::DimensionMismatch { expected: 2, actual: 3 }));

        let out_of_range = r#"{"kind": "threshold_classifier", "feature": 2, "threshold": 0.0, "n_features": 2}"#;
        let err = Estimator::from_json_str(out_of_range).unwrap().into_handle().unwrap_err();
        assert!(matches!(err, ServeError::InvalidModel(_)));
    }

    #[test]
    fn test_toml_estimator() {
        let toml_str = r#"
kind = "logistic_regression"
coefficients = [0.25, 0.75]
intercept = -0.5
"#;
        let estimator = Estimator::from_toml_str(toml_str).unwrap();
        assert_eq!(estimator.kind(), "logistic_regression");
        assert_eq!(
            estimator,
            Estimator::LogisticRegression(LinearParams {
                coefficients: vec![0.25, 0.75],
                intercept: -0.5,
            })
        );
    }

    #[test]
    fn test_metadata_defaults_and_extras() {
        let dir = tempfile::tempdir().unwrap();
        let absent = ModelMetadata::load(&dir.path().join("missing.json"));
        assert_eq!(absent, ModelMetadata::default());

        write(dir.path(), "broken.json", "{ not json");
        let broken = ModelMetadata::load(&dir.path().join("broken.json"));
        assert!(broken.is_active);
        assert!(broken.expected_features.is_empty());

        write(
            dir.path(),
            "full.json",
            r#"{"is_active": false, "expected_features": ["b", "a"], "description": "NBA v1"}"#,
        );
        let full = ModelMetadata::load(&dir.path().join("full.json"));
        assert!(!full.is_active);
        assert_eq!(full.expected_features, vec!["b", "a"]);
        assert_eq!(full.extra["description"], "NBA v1");
    }

    #[test]
    fn test_registry_isolates_bad_artifacts() {
        let dir = tempfile::tempdir().unwrap();

        write(dir.path(), "home_win.model", LOGISTIC);
        write(dir.path(), "home_win.json", r#"{"expected_features": ["a", "b"]}"#);

        write(dir.path(), "retired.model", LOGISTIC);
        write(dir.path(), "retired.json", r#"{"is_active": false}"#);

        write(dir.path(), "corrupt.model", "\u{0}\u{1}garbage");
        write(dir.path(), "corrupt.json", "{ malformed");

        let registry = ModelRegistry::new(dir.path());
        let summary = registry.load_all();

        assert_eq!(summary, LoadSummary { loaded: 1, skipped: 1, failed: 1 });
        assert_eq!(registry.list_versions(), vec!["home_win".to_string()]);

        let artifact = registry.lookup("home_win").unwrap();
        assert!(artifact.is_active);
        assert_eq!(artifact.expected_features, vec!["a", "b"]);
        assert_eq!(artifact.kind, "logistic_regression");
    }

    #[test]
    fn test_malformed_metadata_defaults_to_active() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "spread.model", LOGISTIC);
        write(dir.path(), "spread.json", "[1, 2");

        let registry = ModelRegistry::new(dir.path());
        let summary = registry.load_all();

        assert_eq!(summary.loaded, 1);
        let artifact = registry.lookup("spread").unwrap();
        assert!(artifact.expected_features.is_empty());
    }

    #[test]
    fn test_registry_reads_toml_and_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "total_over.toml",
            "kind = \"threshold_classifier\"\nfeature = 0\nthreshold = 220.5\n",
        );
        write(dir.path(), "notes.txt", "not a model");
        write(dir.path(), "orphan.json", r#"{"is_active": true}"#);

        let registry = ModelRegistry::new(dir.path());
        let summary = registry.load_all();

        assert_eq!(summary, LoadSummary { loaded: 1, skipped: 0, failed: 0 });
        let artifact = registry.lookup("total_over").unwrap();
        assert!(!artifact.handle.is_probabilistic());
    }

    #[test]
    fn test_duplicate_stem_last_wins() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "dup.model", LOGISTIC);
        write(dir.path(), "dup.toml", "kind = \"threshold_classifier\"\nfeature = 0\nthreshold = 0.0\n");

        let registry = ModelRegistry::new(dir.path());
        let summary = registry.load_all();

        assert_eq!(summary.loaded, 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("dup").unwrap().kind, "threshold_classifier");
    }

    #[test]
    fn test_empty_or_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ModelRegistry::new(dir.path());
        assert_eq!(registry.load_all(), LoadSummary::default());
        assert!(registry.is_empty());

        let registry = ModelRegistry::new(dir.path().join("does-not-exist"));
        assert_eq!(registry.load_all(), LoadSummary::default());
        assert!(registry.list_versions().is_empty());
    }

    #[test]
    fn test_lookup_is_exact_and_case_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "NBA_LogReg_v1.model", LOGISTIC);

        let registry = ModelRegistry::new(dir.path());
        registry.load_all();

        assert!(registry.lookup("NBA_LogReg_v1").is_some());
        assert!(registry.lookup("nba_logreg_v1").is_none());
        assert!(registry.lookup("NBA_LogReg").is_none());
        assert!(registry.model_info("missing").is_none());
    }

    #[test]
    fn test_reload_publishes_new_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "v1.model", LOGISTIC);

        let registry = ModelRegistry::new(dir.path());
        registry.load_all();
        let held = registry.lookup("v1").unwrap();

        write(dir.path(), "v2.model", LOGISTIC);
        fs::remove_file(dir.path().join("v1.model")).unwrap();
        let summary = registry.load_all();

        assert_eq!(summary.loaded, 1);
        assert_eq!(registry.list_versions(), vec!["v2".to_string()]);
        // readers holding the old artifact keep a valid handle
        assert_eq!(held.version, "v1");
        // the replaced map has been released, leaving the reader as sole owner
        assert_eq!(std::sync::Arc::strong_count(&held), 1);
    }

    #[test]
    fn test_scan_skips_entries_that_are_not_model_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "home_win.model", LOGISTIC);
        fs::create_dir(dir.path().join("archive.model")).unwrap();
        #[cfg(unix)]
        std::os::unix::fs::symlink(dir.path().join("gone.model"), dir.path().join("dangling.model")).unwrap();

        let registry = ModelRegistry::new(dir.path());
        let summary = registry.load_all();

        assert_eq!(summary.loaded, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(registry.list_versions(), vec!["home_win".to_string()]);
    }

    #[test]
    fn test_model_info() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "home_cover.model", LOGISTIC);
        write(
            dir.path(),
            "home_cover.json",
            r#"{"expected_features": ["a", "b"], "description": "Spread model", "git_sha": "abc123"}"#,
        );

        let registry = ModelRegistry::new(dir.path());
        registry.load_all();

        let info = registry.model_info("home_cover").unwrap();
        assert_eq!(info.version, "home_cover");
        assert_eq!(info.kind, "logistic_regression");
        assert!(info.probabilistic);
        assert!(info.is_active);
        assert!(info.path.ends_with("home_cover.model"));
        assert!(info.loaded_at_epoch_seconds > 0.0);
        assert_eq!(info.metadata["description"], "Spread model");
        assert_eq!(info.metadata["git_sha"], "abc123");
        assert!(!info.metadata.contains_key("expected_features"));
    }

    #[test]
    fn test_from_artifacts_drops_inactive() {
        let active = ModelArtifact::new(
            "active",
            Estimator::from_json_str(LOGISTIC).unwrap().into_handle().unwrap(),
            "logistic_regression",
            ModelMetadata::default(),
            "active.model",
        );
        let inactive = ModelArtifact::new(
            "inactive",
            Estimator::from_json_str(LOGISTIC).unwrap().into_handle().unwrap(),
            "logistic_regression",
            ModelMetadata {
                is_active: false,
                ..ModelMetadata::default()
            },
            "inactive.model",
        );

        let registry = ModelRegistry::from_artifacts(vec![active, inactive]);
        assert_eq!(registry.list_versions(), vec!["active".to_string()]);
    }
}
