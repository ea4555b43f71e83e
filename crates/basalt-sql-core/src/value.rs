//! Native value payloads bound as query arguments.
//!
//! Values never appear inline in rendered SQL; they travel through the
//! argument bag and are handed to the driver as positional arguments.

use chrono::{DateTime, Utc};

/// A native value that can be bound as a query argument.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary value.
    Bytes(Vec<u8>),
    /// JSON document.
    Json(serde_json::Value),
    /// UTC timestamp.
    Timestamp(DateTime<Utc>),
    /// Array of values. Accepted as a payload, but the converter rejects
    /// array-typed bindings (see `convert`).
    Array(Vec<SqlValue>),
}

impl SqlValue {
    /// Returns true when the value is NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the text payload, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// SQL type tag inferred from the value kind alone.
    ///
    /// Used by the converter when no type was declared for a binding.
    #[must_use]
    pub fn kind_type(&self) -> String {
        match self {
            Self::Null => String::from("null"),
            Self::Bool(_) => String::from("boolean"),
            Self::Int(_) => String::from("integer"),
            Self::Float(_) => String::from("float"),
            Self::Text(_) => String::from("text"),
            Self::Bytes(_) => String::from("blob"),
            Self::Json(_) => String::from("json"),
            Self::Timestamp(_) => String::from("timestamp"),
            Self::Array(items) => {
                let element = items
                    .first()
                    .map_or_else(|| String::from("text"), Self::kind_type);
                format!("{element}[]")
            }
        }
    }
}

/// Trait for types that can be converted to a [`SqlValue`].
pub trait ToSqlValue {
    /// Converts the value into a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

impl ToSqlValue for i32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for i16 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bytes(self)
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bytes(self.to_vec())
    }
}

impl ToSqlValue for serde_json::Value {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Json(self)
    }
}

impl ToSqlValue for DateTime<Utc> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Timestamp(self)
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_sql_value_conversions() {
        assert_eq!(true.to_sql_value(), SqlValue::Bool(true));
        assert_eq!(42_i32.to_sql_value(), SqlValue::Int(42));
        assert_eq!(2.5_f64.to_sql_value(), SqlValue::Float(2.5));
        assert_eq!("hi".to_sql_value(), SqlValue::Text(String::from("hi")));
        assert_eq!(None::<i64>.to_sql_value(), SqlValue::Null);
        assert_eq!(Some(7_i64).to_sql_value(), SqlValue::Int(7));
    }

    #[test]
    fn test_kind_type_inference() {
        assert_eq!(SqlValue::Bool(true).kind_type(), "boolean");
        assert_eq!(SqlValue::Int(1).kind_type(), "integer");
        assert_eq!(SqlValue::Text(String::new()).kind_type(), "text");
        assert_eq!(SqlValue::Bytes(vec![]).kind_type(), "blob");
        assert_eq!(
            SqlValue::Array(vec![SqlValue::Int(1)]).kind_type(),
            "integer[]"
        );
        assert_eq!(SqlValue::Array(vec![]).kind_type(), "text[]");
    }
}
