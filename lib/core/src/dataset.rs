use crate::error::{Error, Result};
use crate::value::Value;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An in-memory tabular dataset.
///
/// The column set is fixed once loaded (except for the synthetic target
/// column appended during preparation). Row order is stable and the row
/// index is the implicit record identifier used by exact match and neighbor
/// search. The dataset is never mutated in place after preparation; reload
/// replaces it wholesale.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    col_index: AHashMap<String, usize>,
    rows: Vec<Vec<Value>>,
    numeric: Vec<bool>,
}

impl Dataset {
    /// Build a dataset from raw rows. Every row must have one cell per
    /// column. A column is numeric when all of its non-null cells are
    /// numbers.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(Error::InvalidInput(format!(
                    "row {} has {} cells, expected {}",
                    i,
                    row.len(),
                    columns.len()
                )));
            }
        }

        let col_index: AHashMap<String, usize> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();

        let numeric = (0..columns.len())
            .map(|c| {
                rows.iter()
                    .map(|r| &r[c])
                    .all(|v| !matches!(v, Value::Text(_)))
            })
            .collect();

        Ok(Self {
            columns,
            col_index,
            rows,
            numeric,
        })
    }

    #[inline]
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[inline]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.col_index.get(name).copied()
    }

    #[inline]
    pub fn is_numeric(&self, col: usize) -> bool {
        self.numeric[col]
    }

    #[inline]
    pub fn value(&self, row: usize, col: usize) -> &Value {
        &self.rows[row][col]
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[Value] {
        &self.rows[row]
    }

    pub(crate) fn set_value(&mut self, row: usize, col: usize, value: Value) {
        self.rows[row][col] = value;
    }

    /// Append a derived column. Used only during preparation, before the
    /// dataset is published to readers.
    pub fn push_column(&mut self, name: String, values: Vec<Value>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(Error::Internal(format!(
                "derived column '{}' has {} values for {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }
        if self.col_index.contains_key(&name) {
            return Err(Error::Internal(format!("column '{name}' already exists")));
        }
        let numeric = values.iter().all(|v| !matches!(v, Value::Text(_)));
        self.col_index.insert(name.clone(), self.columns.len());
        self.columns.push(name);
        self.numeric.push(numeric);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    /// One full record as a column-name keyed map, minus the excluded
    /// columns.
    pub fn record(&self, row: usize, exclude: &[String]) -> BTreeMap<String, Value> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, name)| !exclude.contains(name))
            .map(|(c, name)| (name.clone(), self.rows[row][c].clone()))
            .collect()
    }

    pub fn non_null_count(&self, col: usize) -> usize {
        self.rows.iter().filter(|r| !r[col].is_null()).count()
    }

    fn numeric_values(&self, col: usize) -> Vec<f64> {
        self.rows.iter().filter_map(|r| r[col].as_f64()).collect()
    }

    /// Median of the column's non-null numeric values. Even counts average
    /// the two middle values.
    pub fn median(&self, col: usize) -> Option<f64> {
        let mut values = self.numeric_values(col);
        if values.is_empty() {
            return None;
        }
        values.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let mid = values.len() / 2;
        if values.len() % 2 == 1 {
            Some(values[mid])
        } else {
            Some((values[mid - 1] + values[mid]) / 2.0)
        }
    }

    pub fn mean(&self, col: usize) -> Option<f64> {
        let values = self.numeric_values(col);
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    pub fn min(&self, col: usize) -> Option<f64> {
        self.numeric_values(col)
            .into_iter()
            .reduce(f64::min)
    }

    pub fn max(&self, col: usize) -> Option<f64> {
        self.numeric_values(col)
            .into_iter()
            .reduce(f64::max)
    }

    /// Per-column summary statistics for the column-info surface.
    pub fn column_summaries(&self) -> Vec<ColumnSummary> {
        self.columns
            .iter()
            .enumerate()
            .map(|(c, name)| {
                let non_null = self.non_null_count(c);
                let is_numeric = self.numeric[c];
                let with_stats = is_numeric && non_null > 0;
                ColumnSummary {
                    name: name.clone(),
                    dtype: if is_numeric { "number" } else { "text" }.to_string(),
                    non_null_count: non_null,
                    null_count: self.n_rows() - non_null,
                    is_numeric,
                    min: if with_stats { self.min(c) } else { None },
                    max: if with_stats { self.max(c) } else { None },
                    mean: if with_stats { self.mean(c) } else { None },
                    median: if with_stats { self.median(c) } else { None },
                }
            })
            .collect()
    }
}

/// Summary statistics for a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub dtype: String,
    pub non_null_count: usize,
    pub null_count: usize,
    pub is_numeric: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
}
