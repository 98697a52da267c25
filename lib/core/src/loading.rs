//! Dataset ingestion and preparation.
//!
//! Loads the raw observation CSV, chooses the classification target, derives
//! the feature schema, and median-imputes the feature columns. When the CSV
//! is missing in a training context a synthetic sample dataset is generated
//! and written in its place.

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::value::Value;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use tracing::{info, warn};

/// Candidate target columns, in priority order.
const TARGET_PRIORITY: [&str; 4] = [
    "pl_controv_flag",
    "discoverymethod",
    "rv_flag",
    "tran_flag",
];

/// Name of the target column derived when no candidate is usable.
pub const SYNTHETIC_TARGET: &str = "exoplanet_status";

/// A numeric column qualifies as a feature only above this non-null share.
const MIN_FEATURE_COVERAGE: f64 = 0.1;

const SAMPLE_ROWS: usize = 1000;
const SAMPLE_SEED: u64 = 42;

/// A dataset ready for training and inference: target chosen, feature
/// schema derived, feature columns imputed.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub dataset: Dataset,
    pub feature_columns: Vec<String>,
    pub target_column: String,
}

/// Read the observation CSV into a dataset, dropping rows that are
/// entirely null.
pub fn read_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| Error::DataUnavailable(format!("{}: {e}", path.display())))?;

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| Error::DataUnavailable(format!("reading CSV headers: {e}")))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| Error::DataUnavailable(format!("reading CSV record: {e}")))?;
        let row: Vec<Value> = record.iter().map(Value::from_cell).collect();
        if row.iter().any(|v| !v.is_null()) {
            rows.push(row);
        }
    }

    if rows.is_empty() {
        return Err(Error::DataUnavailable(format!(
            "{} contains no data rows",
            path.display()
        )));
    }

    Dataset::from_rows(columns, rows)
}

/// Load and prepare the dataset at `path`. Missing file is a hard error;
/// inference must never fabricate data.
pub fn load_prepared(path: &Path) -> Result<PreparedDataset> {
    prepare(read_csv(path)?)
}

/// Load and prepare the dataset at `path`, generating and persisting a
/// synthetic sample dataset when the file does not exist. Training-context
/// counterpart of [`load_prepared`].
pub fn load_or_synthesize(path: &Path) -> Result<PreparedDataset> {
    if path.exists() {
        return load_prepared(path);
    }
    warn!(path = %path.display(), "dataset not found, generating sample data");
    let dataset = sample_dataset(SAMPLE_ROWS, SAMPLE_SEED);
    write_csv(&dataset, path)?;
    prepare(dataset)
}

/// Choose the target column, derive the feature schema, and impute feature
/// columns with their medians.
pub fn prepare(mut dataset: Dataset) -> Result<PreparedDataset> {
    let target_column = select_target(&mut dataset)?;

    let n_rows = dataset.n_rows();
    let mut feature_columns = Vec::new();
    for (c, name) in dataset.columns().to_vec().into_iter().enumerate() {
        if name == target_column || !dataset.is_numeric(c) {
            continue;
        }
        if dataset.non_null_count(c) as f64 > n_rows as f64 * MIN_FEATURE_COVERAGE {
            feature_columns.push(name);
        }
    }

    for name in &feature_columns {
        let c = dataset
            .column_index(name)
            .ok_or_else(|| Error::Internal(format!("feature column '{name}' vanished")))?;
        let median = dataset
            .median(c)
            .ok_or_else(|| Error::Internal(format!("no median for feature column '{name}'")))?;
        for row in 0..n_rows {
            if dataset.value(row, c).is_null() {
                dataset.set_value(row, c, Value::Number(median));
            }
        }
    }

    info!(
        rows = n_rows,
        features = feature_columns.len(),
        target = %target_column,
        "dataset prepared"
    );

    Ok(PreparedDataset {
        dataset,
        feature_columns,
        target_column,
    })
}

/// First usable candidate from the priority list wins. Otherwise a
/// synthetic status column is derived: from the discovery method when the
/// column exists, else from orbital period and planetary radius.
fn select_target(dataset: &mut Dataset) -> Result<String> {
    for candidate in TARGET_PRIORITY {
        if let Some(c) = dataset.column_index(candidate) {
            if dataset.non_null_count(c) > 0 {
                return Ok(candidate.to_string());
            }
        }
    }

    let n_rows = dataset.n_rows();
    let status: Vec<Value> = if let Some(c) = dataset.column_index("discoverymethod") {
        (0..n_rows)
            .map(|row| {
                let confirmed = dataset
                    .value(row, c)
                    .as_str()
                    .is_some_and(|s| s.contains("Radial Velocity"));
                Value::Text(if confirmed { "Confirmed" } else { "Candidate" }.to_string())
            })
            .collect()
    } else {
        let orbper = dataset.column_index("pl_orbper");
        let rade = dataset.column_index("pl_rade");
        (0..n_rows)
            .map(|row| {
                let confirmed = match (orbper, rade) {
                    (Some(p), Some(r)) => {
                        let p = dataset.value(row, p).as_f64();
                        let r = dataset.value(row, r).as_f64();
                        matches!((p, r), (Some(p), Some(r)) if p > 0.0 && r > 0.0)
                    }
                    _ => false,
                };
                Value::Text(if confirmed { "Confirmed" } else { "Candidate" }.to_string())
            })
            .collect()
    };

    dataset.push_column(SYNTHETIC_TARGET.to_string(), status)?;
    Ok(SYNTHETIC_TARGET.to_string())
}

/// Write a dataset back out as CSV. Nulls become empty cells.
pub fn write_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;
    writer
        .write_record(dataset.columns())
        .map_err(|e| Error::Serialization(e.to_string()))?;
    for row in 0..dataset.n_rows() {
        let cells: Vec<String> = dataset.row(row).iter().map(|v| v.to_string()).collect();
        writer
            .write_record(&cells)
            .map_err(|e| Error::Serialization(e.to_string()))?;
    }
    writer
        .flush()
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;
    Ok(())
}

/// Generate a synthetic observation table with the usual archive columns
/// and a two-class status label.
pub fn sample_dataset(n_rows: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut columns: Vec<String> = Vec::new();
    let mut generators: Vec<Box<dyn FnMut(&mut StdRng) -> f64>> = Vec::new();

    columns.push("pl_orbper".into());
    generators.push(Box::new(|r| exponential(r, 100.0)));
    columns.push("pl_rade".into());
    generators.push(Box::new(|r| log_normal(r, 0.0, 1.0)));
    columns.push("pl_bmasse".into());
    generators.push(Box::new(|r| log_normal(r, 0.0, 1.0)));
    columns.push("st_teff".into());
    generators.push(Box::new(|r| normal(r, 5500.0, 1000.0)));
    columns.push("st_rad".into());
    generators.push(Box::new(|r| log_normal(r, 0.0, 0.5)));
    columns.push("st_mass".into());
    generators.push(Box::new(|r| log_normal(r, 0.0, 0.3)));
    columns.push("sy_dist".into());
    generators.push(Box::new(|r| exponential(r, 50.0)));
    columns.push("pl_insol".into());
    generators.push(Box::new(|r| exponential(r, 1000.0)));
    columns.push("pl_eqt".into());
    generators.push(Box::new(|r| normal(r, 300.0, 100.0)));
    columns.push("st_met".into());
    generators.push(Box::new(|r| normal(r, 0.0, 0.3)));
    columns.push(SYNTHETIC_TARGET.into());

    let rows: Vec<Vec<Value>> = (0..n_rows)
        .map(|_| {
            let mut row: Vec<Value> = generators
                .iter_mut()
                .map(|g| Value::Number(g(&mut rng)))
                .collect();
            let label = if rng.random_bool(0.3) {
                "Confirmed"
            } else {
                "Candidate"
            };
            row.push(Value::Text(label.to_string()));
            row
        })
        .collect();

    Dataset::from_rows(columns, rows).expect("generated rows are rectangular")
}

fn normal(rng: &mut StdRng, mean: f64, std: f64) -> f64 {
    // Box-Muller transform.
    let u1: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.random();
    mean + std * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

fn log_normal(rng: &mut StdRng, mu: f64, sigma: f64) -> f64 {
    normal(rng, mu, sigma).exp()
}

fn exponential(rng: &mut StdRng, mean: f64) -> f64 {
    let u: f64 = rng.random();
    -mean * (1.0 - u).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(columns: &[&str], rows: Vec<Vec<Value>>) -> Dataset {
        Dataset::from_rows(columns.iter().map(|c| c.to_string()).collect(), rows).unwrap()
    }

    #[test]
    fn test_target_priority() {
        let ds = dataset(
            &["pl_orbper", "tran_flag", "discoverymethod"],
            vec![
                vec![
                    Value::Number(1.0),
                    Value::Number(1.0),
                    Value::Text("Transit".into()),
                ],
                vec![Value::Number(2.0), Value::Number(0.0), Value::Null],
            ],
        );
        let prepared = prepare(ds).unwrap();
        // discoverymethod outranks tran_flag in the priority list.
        assert_eq!(prepared.target_column, "discoverymethod");
    }

    #[test]
    fn test_synthetic_target_from_discovery_method() {
        // discoverymethod exists but is entirely null, so it is skipped as a
        // target and instead drives the derived status column.
        let ds = dataset(
            &["pl_orbper", "discoverymethod"],
            vec![
                vec![Value::Number(1.0), Value::Null],
                vec![Value::Number(2.0), Value::Null],
            ],
        );
        let prepared = prepare(ds).unwrap();
        assert_eq!(prepared.target_column, SYNTHETIC_TARGET);
        let c = prepared.dataset.column_index(SYNTHETIC_TARGET).unwrap();
        assert_eq!(
            prepared.dataset.value(0, c),
            &Value::Text("Candidate".into())
        );
    }

    #[test]
    fn test_synthetic_target_from_orbit_and_radius() {
        let ds = dataset(
            &["pl_orbper", "pl_rade"],
            vec![
                vec![Value::Number(10.0), Value::Number(1.0)],
                vec![Value::Number(-1.0), Value::Number(1.0)],
                vec![Value::Null, Value::Number(1.0)],
            ],
        );
        let prepared = prepare(ds).unwrap();
        let c = prepared.dataset.column_index(SYNTHETIC_TARGET).unwrap();
        assert_eq!(
            prepared.dataset.value(0, c),
            &Value::Text("Confirmed".into())
        );
        assert_eq!(
            prepared.dataset.value(1, c),
            &Value::Text("Candidate".into())
        );
        assert_eq!(
            prepared.dataset.value(2, c),
            &Value::Text("Candidate".into())
        );
    }

    #[test]
    fn test_feature_coverage_rule() {
        // Column "sparse" has 1 of 10 non-null values (10%), which does not
        // clear the strict >10% bar.
        let mut rows = Vec::new();
        for i in 0..10 {
            rows.push(vec![
                Value::Number(i as f64),
                if i == 0 { Value::Number(1.0) } else { Value::Null },
                Value::Text(if i % 2 == 0 { "a" } else { "b" }.into()),
            ]);
        }
        let ds = dataset(&["dense", "sparse", "tran_flag"], rows);
        let prepared = prepare(ds).unwrap();
        assert_eq!(prepared.target_column, "tran_flag");
        assert_eq!(prepared.feature_columns, vec!["dense".to_string()]);
    }

    #[test]
    fn test_imputation_fills_median() {
        let ds = dataset(
            &["a", "tran_flag"],
            vec![
                vec![Value::Number(1.0), Value::Number(0.0)],
                vec![Value::Number(3.0), Value::Number(1.0)],
                vec![Value::Null, Value::Number(1.0)],
            ],
        );
        let prepared = prepare(ds).unwrap();
        let c = prepared.dataset.column_index("a").unwrap();
        assert_eq!(prepared.dataset.value(2, c), &Value::Number(2.0));
    }

    #[test]
    fn test_sample_dataset_shape() {
        let ds = sample_dataset(100, 7);
        assert_eq!(ds.n_rows(), 100);
        assert_eq!(ds.columns().len(), 11);
        let c = ds.column_index(SYNTHETIC_TARGET).unwrap();
        assert!(!ds.is_numeric(c));
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let ds = sample_dataset(20, 3);
        write_csv(&ds, &path).unwrap();
        let reloaded = read_csv(&path).unwrap();
        assert_eq!(reloaded.n_rows(), 20);
        assert_eq!(reloaded.columns(), ds.columns());
    }

    #[test]
    fn test_missing_csv_is_hard_error() {
        let err = load_prepared(Path::new("/nonexistent/data.csv")).unwrap_err();
        assert!(matches!(err, Error::DataUnavailable(_)));
    }
}
