// Integration tests for orbitx
use orbitx::watch;
use orbitx::{
    loading, train, AnalysisResponse, ArtifactStore, EngineConfig, InferenceEngine,
    InferenceRequest, Snapshot,
};
use std::io::Write;
use std::path::Path;

fn write_csv(path: &Path, contents: &str) {
    let mut file = std::fs::File::create(path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
}

/// A small archive slice with a usable target column and two well-separated
/// classes.
fn trained_csv() -> String {
    let mut csv = String::from("pl_orbper,pl_rade,discoverymethod\n");
    for i in 0..15 {
        csv.push_str(&format!("{},{},Transit\n", 3.0 + i as f64 * 0.1, 1.0));
        csv.push_str(&format!("{},{},Radial Velocity\n", 300.0 + i as f64, 11.0));
    }
    csv
}

fn request(json: serde_json::Value) -> InferenceRequest {
    serde_json::from_value(json).unwrap()
}

fn trained_engine(dir: &Path) -> InferenceEngine {
    let csv_path = dir.join("data.csv");
    write_csv(&csv_path, &trained_csv());
    let data = loading::load_prepared(&csv_path).unwrap();
    let (model, _) = train::train(&data).unwrap();
    let engine = InferenceEngine::new(EngineConfig::default());
    engine.install(Snapshot {
        data,
        model: Some(model),
    });
    engine
}

#[test]
fn test_scenario_exact_match() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("data.csv");
    write_csv(
        &csv_path,
        "orbital_period,planetary_radius,classification\n\
         10.0,1.0,Candidate\n\
         20.0,2.0,Confirmed\n",
    );
    let data = loading::load_prepared(&csv_path).unwrap();
    let engine = InferenceEngine::new(EngineConfig::default());
    engine.install(Snapshot { data, model: None });

    // No model is installed, so a non-error response proves the exact-match
    // path ran (and ran first).
    let response = engine.analyze(&request(serde_json::json!({
        "user_inputs": {"orbital_period": 10.0, "planetary_radius": 1.0},
        "selected_columns": ["classification"]
    })));

    match response {
        AnalysisResponse::ExactMatch { result, .. } => {
            assert!(!result.contains_key("classification"));
        }
        other => panic!("expected exact_match, got {other:?}"),
    }
}

#[test]
fn test_scenario_ml_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let engine = trained_engine(dir.path());

    let response = engine.analyze(&request(serde_json::json!({
        "user_inputs": {"pl_orbper": 7.77, "pl_rade": 2.5},
        "selected_columns": ["discoverymethod"]
    })));

    match response {
        AnalysisResponse::MlAnalysis {
            classification,
            neighbors,
            ..
        } => {
            assert_eq!(neighbors.len(), 6);
            let sum: f64 = classification.probabilities.values().sum();
            assert!((sum - 1.0).abs() < 1e-6);
            assert!(classification.confidence > 0.0 && classification.confidence <= 1.0);
            for pair in neighbors.windows(2) {
                assert!(pair[0].distance <= pair[1].distance);
                assert!(pair[0].similarity_score >= pair[1].similarity_score);
            }
            for n in &neighbors {
                assert!(n.similarity_score > 0.0 && n.similarity_score <= 1.0);
            }
        }
        other => panic!("expected ml_analysis, got {other:?}"),
    }
}

#[test]
fn test_scenario_untrained_model() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("data.csv");
    write_csv(&csv_path, &trained_csv());
    let data = loading::load_prepared(&csv_path).unwrap();
    let engine = InferenceEngine::new(EngineConfig::default());
    engine.install(Snapshot { data, model: None });

    let response = engine.analyze(&request(serde_json::json!({
        "user_inputs": {"pl_orbper": 7.77},
        "selected_columns": ["discoverymethod"]
    })));

    match response {
        AnalysisResponse::Error { message, .. } => {
            assert!(message.contains("not trained"));
        }
        other => panic!("expected error, got {other:?}"),
    }
}

#[test]
fn test_exact_match_tolerance_boundary() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("data.csv");
    write_csv(
        &csv_path,
        "orbital_period,classification\n0.0,Candidate\n5.0,Confirmed\n",
    );
    let data = loading::load_prepared(&csv_path).unwrap();
    let engine = InferenceEngine::new(EngineConfig::default());
    engine.install(Snapshot { data, model: None });

    // Off by exactly the tolerance: no exact match, so the untrained model
    // is consulted and the request errors out.
    let miss = engine.analyze(&request(serde_json::json!({
        "user_inputs": {"orbital_period": 1e-6},
        "selected_columns": ["classification"]
    })));
    assert!(matches!(miss, AnalysisResponse::Error { .. }));

    // An order of magnitude closer: a match.
    let hit = engine.analyze(&request(serde_json::json!({
        "user_inputs": {"orbital_period": 1e-7},
        "selected_columns": ["classification"]
    })));
    assert!(matches!(hit, AnalysisResponse::ExactMatch { .. }));
}

#[test]
fn test_response_is_always_json_shaped() {
    let engine = InferenceEngine::new(EngineConfig::default());

    // Nothing loaded at all.
    let response = engine.analyze(&request(serde_json::json!({
        "user_inputs": {"pl_orbper": 1.0},
        "selected_columns": ["pl_rade"]
    })));
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["type"], "error");
    assert!(json["message"].is_string());
}

#[test]
fn test_artifact_round_trip_through_engine() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("data.csv");
    write_csv(&csv_path, &trained_csv());
    let data = loading::load_prepared(&csv_path).unwrap();
    let (model, report) = train::train(&data).unwrap();

    let store = ArtifactStore::new(dir.path().join("models"));
    store.save(&model, &report).unwrap();
    let (loaded, metadata) = store.load().unwrap().unwrap();
    assert_eq!(metadata.feature_columns, data.feature_columns);
    assert_eq!(metadata.n_samples, 30);

    // An engine rebuilt from the persisted artifacts serves the ML path.
    let engine = InferenceEngine::new(EngineConfig::default());
    engine.install(Snapshot {
        data,
        model: Some(loaded),
    });
    let response = engine.analyze(&request(serde_json::json!({
        "user_inputs": {"pl_orbper": 7.77, "pl_rade": 2.5},
        "selected_columns": ["discoverymethod"]
    })));
    assert!(matches!(response, AnalysisResponse::MlAnalysis { .. }));
}

#[test]
fn test_retrain_swaps_snapshot_and_keeps_readers_consistent() {
    let dir = tempfile::tempdir().unwrap();
    let engine = trained_engine(dir.path());
    let store = ArtifactStore::new(dir.path().join("models"));

    let before = engine.snapshot().unwrap();
    assert_eq!(before.data.dataset.n_rows(), 30);

    // Grow the dataset and retrain through the watcher's consumer path.
    let csv_path = dir.path().join("data.csv");
    let mut csv = trained_csv();
    csv.push_str("7.5,4.0,Transit\n");
    write_csv(&csv_path, &csv);
    watch::retrain(&engine, &store, &csv_path).unwrap();

    // The held snapshot is untouched; new requests see the new pair.
    assert_eq!(before.data.dataset.n_rows(), 30);
    let after = engine.snapshot().unwrap();
    assert_eq!(after.data.dataset.n_rows(), 31);
    assert!(after.model.is_some());

    // A failed retrain leaves the installed snapshot in place.
    std::fs::remove_file(&csv_path).unwrap();
    assert!(watch::retrain(&engine, &store, &csv_path).is_err());
    assert_eq!(engine.snapshot().unwrap().data.dataset.n_rows(), 31);
}

#[test]
fn test_synthetic_fallback_trains_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("missing.csv");

    let data = loading::load_or_synthesize(&csv_path).unwrap();
    assert!(csv_path.exists(), "sample data should be persisted");
    assert_eq!(data.dataset.n_rows(), 1000);

    let (model, report) = train::train(&data).unwrap();
    assert_eq!(report.class_names, vec!["Candidate", "Confirmed"]);

    let engine = InferenceEngine::new(EngineConfig::default());
    engine.install(Snapshot {
        data,
        model: Some(model),
    });
    let response = engine.analyze(&request(serde_json::json!({
        "user_inputs": {"pl_orbper": 123.456, "st_teff": 5000.0},
        "selected_columns": ["exoplanet_status"]
    })));
    assert!(matches!(response, AnalysisResponse::MlAnalysis { .. }));
}

#[test]
fn test_column_info_shape() {
    let dir = tempfile::tempdir().unwrap();
    let engine = trained_engine(dir.path());

    let report = engine.column_info();
    assert!(report.error.is_none());
    let by_name: std::collections::HashMap<_, _> = report
        .columns
        .iter()
        .map(|c| (c.name.as_str(), c))
        .collect();

    let orbper = by_name["pl_orbper"];
    assert!(orbper.is_numeric);
    assert_eq!(orbper.non_null_count, 30);
    assert_eq!(orbper.null_count, 0);
    assert!(orbper.min.is_some() && orbper.max.is_some());

    let method = by_name["discoverymethod"];
    assert!(!method.is_numeric);
    assert!(method.min.is_none());
}
