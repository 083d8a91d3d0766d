//! Row records and their heterogeneous cell values

use ahash::AHashSet;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Stable identity of a row, independent of its position in any view
pub type RowId = String;

static NULL: Value = Value::Null;

/// A single cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Str(String),
    Num(f64),
    Date(DateTime<Utc>),
    Null,
}

impl Value {
    /// Whether this value orders as "missing". NaN counts as missing.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Num(n) => n.is_nan(),
            _ => false,
        }
    }

    /// Numeric sort key for numbers and dates (epoch milliseconds)
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Num(n) if !n.is_nan() => Some(*n),
            Value::Date(d) => Some(d.timestamp_millis() as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Num(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Num(value as f64)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Date(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// An externally owned record with a stable id and keyed cell values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    pub fields: IndexMap<String, Value>,
}

impl Row {
    /// Create a row with no fields
    pub fn new(id: impl Into<RowId>) -> Self {
        Self {
            id: id.into(),
            fields: IndexMap::new(),
        }
    }

    /// Builder-style field assignment
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Read a field; missing keys read as `Value::Null`
    pub fn get(&self, key: &str) -> &Value {
        self.fields.get(key).unwrap_or(&NULL)
    }
}

/// Fail on the first id that appears twice in `rows`
pub fn check_unique_ids(rows: &[Row]) -> Result<(), CoreError> {
    let mut seen = AHashSet::with_capacity(rows.len());
    for row in rows {
        if !seen.insert(row.id.as_str()) {
            return Err(CoreError::DuplicateRowId(row.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_missing_field_reads_null() {
        let row = Row::new("R1").with("name", "Ada");
        assert_eq!(row.get("name"), &Value::Str("Ada".to_string()));
        assert!(row.get("age").is_null());
    }

    #[test]
    fn test_nan_is_null() {
        assert!(Value::Num(f64::NAN).is_null());
        assert_eq!(Value::Num(f64::NAN).as_number(), None);
        assert!(!Value::Num(0.0).is_null());
    }

    #[test]
    fn test_date_as_number() {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(Value::from(date).as_number(), Some(date.timestamp_millis() as f64));
    }

    #[test]
    fn test_duplicate_ids_detected() {
        let rows = vec![Row::new("a"), Row::new("b"), Row::new("a")];
        assert_eq!(check_unique_ids(&rows), Err(CoreError::DuplicateRowId("a".to_string())));
        assert!(check_unique_ids(&rows[..2]).is_ok());
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<f64>), Value::Null);
        assert_eq!(Value::from(Some(3_i64)), Value::Num(3.0));
    }
}
