//! Dynamically typed column values, as bound to statements and read back from rows.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// One row or attribute map, keyed by column name in column order.
pub type Row = IndexMap<String, Value>;

/// A single cell value. Booleans are stored as integers (0/1); arrays and objects as JSON text.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// Declared storage type of a column. Drives value coercion on fill and typed placeholders on Postgres.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
    Timestamp,
    Blob,
}

impl ColumnType {
    /// PostgreSQL type used in `$n::TYPE` placeholder casts.
    pub fn pg_cast(self) -> &'static str {
        match self {
            ColumnType::Integer => "BIGINT",
            ColumnType::Float => "DOUBLE PRECISION",
            ColumnType::Text => "TEXT",
            ColumnType::Timestamp => "TIMESTAMPTZ",
            ColumnType::Blob => "BYTEA",
        }
    }
}

impl Value {
    pub fn from_json(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Integer(i64::from(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => Value::Text(v.to_string()),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Integer(n) => serde_json::Value::Number((*n).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Blob(b) => serde_json::Value::Array(b.iter().map(|x| (*x).into()).collect()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Coerce to the declared column type. Values that cannot be converted are returned unchanged
    /// and left for the database to reject.
    pub fn cast(self, ty: ColumnType) -> Value {
        match (ty, self) {
            (_, Value::Null) => Value::Null,
            (ColumnType::Integer, Value::Text(s)) => match s.trim().parse::<i64>() {
                Ok(n) => Value::Integer(n),
                Err(_) => Value::Text(s),
            },
            (ColumnType::Integer, Value::Float(f)) if f.fract() == 0.0 => Value::Integer(f as i64),
            (ColumnType::Float, Value::Integer(n)) => Value::Float(n as f64),
            (ColumnType::Float, Value::Text(s)) => match s.trim().parse::<f64>() {
                Ok(f) => Value::Float(f),
                Err(_) => Value::Text(s),
            },
            (ColumnType::Text, Value::Integer(n)) => Value::Text(n.to_string()),
            (ColumnType::Text, Value::Float(f)) => Value::Text(f.to_string()),
            (ColumnType::Blob, Value::Text(s)) => Value::Blob(s.into_bytes()),
            (_, v) => v,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Integer(n) => serializer.serialize_i64(*n),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Blob(b) => serializer.serialize_bytes(b),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Integer(i64::from(b))
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

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Blob(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Convert a JSON object (e.g. validated request data) to a row.
pub fn row_from_json(map: &serde_json::Map<String, serde_json::Value>) -> Row {
    map.iter().map(|(k, v)| (k.clone(), Value::from_json(v))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_cast_parses_numeric_text() {
        assert_eq!(Value::from("1").cast(ColumnType::Integer), Value::Integer(1));
        assert_eq!(Value::from(" 42 ").cast(ColumnType::Integer), Value::Integer(42));
        assert_eq!(Value::from("abc").cast(ColumnType::Integer), Value::from("abc"));
        assert_eq!(Value::Null.cast(ColumnType::Integer), Value::Null);
    }

    #[test]
    fn json_conversion_keeps_scalars() {
        assert_eq!(Value::from_json(&json!(7)), Value::Integer(7));
        assert_eq!(Value::from_json(&json!(true)), Value::Integer(1));
        assert_eq!(Value::from_json(&json!("x")), Value::from("x"));
        assert_eq!(Value::from_json(&json!([1, 2])), Value::from("[1,2]"));
        assert_eq!(Value::Float(1.5).to_json(), json!(1.5));
        assert_eq!(serde_json::to_value(Value::Null).unwrap(), json!(null));
    }
}
