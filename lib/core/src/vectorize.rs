use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::value::json_as_f64;
use std::collections::BTreeMap;

/// User-supplied field values, as they arrive from the request boundary.
/// Values may be JSON numbers or numeric strings.
pub type UserInputs = BTreeMap<String, serde_json::Value>;

/// Map a partial query onto the feature schema as a dense ordered vector.
///
/// Fields present in the query are parsed as floats; absent fields fall
/// back to the column's median in the current dataset. Deterministic for a
/// fixed dataset snapshot and query.
pub fn feature_vector(
    dataset: &Dataset,
    feature_columns: &[String],
    inputs: &UserInputs,
) -> Result<Vec<f64>> {
    feature_columns
        .iter()
        .map(|name| {
            if let Some(raw) = inputs.get(name) {
                json_as_f64(raw).ok_or_else(|| {
                    Error::InvalidInput(format!("value for '{name}' is not numeric: {raw}"))
                })
            } else {
                let c = dataset
                    .column_index(name)
                    .ok_or_else(|| Error::Internal(format!("feature column '{name}' missing")))?;
                dataset
                    .median(c)
                    .ok_or_else(|| Error::Internal(format!("no median for column '{name}'")))
            }
        })
        .collect()
}
