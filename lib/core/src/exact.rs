use crate::dataset::Dataset;
use crate::value::{json_as_f64, json_as_string, Value};
use crate::vectorize::UserInputs;
use std::collections::BTreeMap;

/// A dataset row that matched every supplied query field.
#[derive(Debug, Clone, PartialEq)]
pub struct ExactMatch {
    /// Row index in the dataset.
    pub index: usize,
    /// All columns of the matched row except the caller's selected set.
    pub record: BTreeMap<String, Value>,
}

enum FieldCmp {
    Numeric(usize, f64),
    Text(usize, String),
}

/// Scan the dataset in row order for the first row matching every query
/// field: numeric columns within `tolerance` (strict), categorical columns
/// by trimmed string equality. Query keys that are not dataset columns are
/// ignored. Null cells never match. Read-only, O(rows x |query|).
pub fn find_exact_match(
    dataset: &Dataset,
    inputs: &UserInputs,
    selected_columns: &[String],
    tolerance: f64,
) -> Option<ExactMatch> {
    let mut comparisons = Vec::with_capacity(inputs.len());
    for (name, raw) in inputs {
        let Some(c) = dataset.column_index(name) else {
            continue;
        };
        if dataset.is_numeric(c) {
            // A value that does not parse as a number can never equal a
            // numeric cell, so the scan as a whole cannot succeed.
            let query = json_as_f64(raw)?;
            comparisons.push(FieldCmp::Numeric(c, query));
        } else {
            comparisons.push(FieldCmp::Text(c, json_as_string(raw).trim().to_string()));
        }
    }

    (0..dataset.n_rows()).find_map(|row| {
        let matched = comparisons.iter().all(|cmp| match cmp {
            FieldCmp::Numeric(c, query) => dataset
                .value(row, *c)
                .as_f64()
                .is_some_and(|v| (v - query).abs() < tolerance),
            FieldCmp::Text(c, query) => {
                let cell = dataset.value(row, *c);
                !cell.is_null() && cell.to_string().trim() == query
            }
        });
        matched.then(|| ExactMatch {
            index: row,
            record: dataset.record(row, selected_columns),
        })
    })
}
