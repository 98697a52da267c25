//! Request and response types for the inference boundary. Responses are
//! the JSON shapes printed by the CLI; every code path produces exactly one
//! of them.

use crate::dataset::ColumnSummary;
use crate::error::{Error, Result};
use crate::value::Value;
use crate::vectorize::UserInputs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const EXACT_MATCH_MESSAGE: &str = "Exact match found in dataset!";
pub const ML_ANALYSIS_MESSAGE: &str = "No exact match found. Using ML analysis.";

/// One inference request: the caller's known field values plus the columns
/// to leave out of an exact-match record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InferenceRequest {
    #[serde(default)]
    pub user_inputs: UserInputs,
    #[serde(default)]
    pub selected_columns: Vec<String>,
}

impl InferenceRequest {
    /// Both fields must be present and non-empty before any processing is
    /// attempted.
    pub fn validate(&self) -> Result<()> {
        if self.user_inputs.is_empty() || self.selected_columns.is_empty() {
            return Err(Error::InvalidInput(
                "missing user_inputs or selected_columns".into(),
            ));
        }
        Ok(())
    }
}

/// The single tagged result of an analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisResponse {
    ExactMatch {
        result: BTreeMap<String, Value>,
        message: String,
    },
    MlAnalysis {
        classification: Classification,
        neighbors: Vec<Neighbor>,
        message: String,
    },
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl AnalysisResponse {
    pub fn exact_match(result: BTreeMap<String, Value>) -> Self {
        AnalysisResponse::ExactMatch {
            result,
            message: EXACT_MATCH_MESSAGE.to_string(),
        }
    }

    pub fn ml_analysis(classification: Classification, neighbors: Vec<Neighbor>) -> Self {
        AnalysisResponse::MlAnalysis {
            classification,
            neighbors,
            message: ML_ANALYSIS_MESSAGE.to_string(),
        }
    }

    pub fn failure(err: &Error) -> Self {
        AnalysisResponse::Error {
            message: format!("analysis failed: {err}"),
            error: Some(err.to_string()),
        }
    }
}

/// Classifier output: top label, its probability, and the full
/// distribution keyed by class name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub classification: String,
    pub confidence: f64,
    pub probabilities: BTreeMap<String, f64>,
}

/// One neighbor-search hit with its source record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neighbor {
    pub index: usize,
    pub similarity_score: f64,
    pub distance: f64,
    pub record: BTreeMap<String, Value>,
}

/// The column-info surface: summaries, or an error with an empty list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub columns: Vec<ColumnSummary>,
}

impl ColumnReport {
    pub fn ok(columns: Vec<ColumnSummary>) -> Self {
        Self {
            error: None,
            columns,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            columns: Vec::new(),
        }
    }
}
