use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell in the dataset.
///
/// Columns are dynamically typed at load time: a column whose non-null cells
/// all parse as floats is numeric, everything else is categorical text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Null,
}

impl Value {
    /// Parse a raw CSV cell. Empty cells are null.
    pub fn from_cell(cell: &str) -> Self {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        match trimmed.parse::<f64>() {
            Ok(n) => Value::Number(n),
            Err(_) => Value::Text(trimmed.to_string()),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Null => write!(f, ""),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// Coerce a user-supplied JSON value to a float.
///
/// Inputs arrive from the CLI boundary as either numbers or strings; both
/// forms are accepted, anything else is rejected by the caller.
pub fn json_as_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Render a user-supplied JSON value as a bare string for categorical
/// comparison (no surrounding quotes for strings).
pub fn json_as_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cell() {
        assert_eq!(Value::from_cell("1.5"), Value::Number(1.5));
        assert_eq!(Value::from_cell("  42 "), Value::Number(42.0));
        assert_eq!(Value::from_cell("Transit"), Value::Text("Transit".to_string()));
        assert_eq!(Value::from_cell(""), Value::Null);
        assert_eq!(Value::from_cell("   "), Value::Null);
    }

    #[test]
    fn test_json_coercion() {
        assert_eq!(json_as_f64(&serde_json::json!(10.0)), Some(10.0));
        assert_eq!(json_as_f64(&serde_json::json!("10.5")), Some(10.5));
        assert_eq!(json_as_f64(&serde_json::json!("not a number")), None);
        assert_eq!(json_as_string(&serde_json::json!("Transit")), "Transit");
        assert_eq!(json_as_string(&serde_json::json!(1.5)), "1.5");
    }

    #[test]
    fn test_serialize_untagged() {
        assert_eq!(serde_json::to_string(&Value::Number(1.0)).unwrap(), "1.0");
        assert_eq!(serde_json::to_string(&Value::Text("a".into())).unwrap(), "\"a\"");
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
    }
}
