//! Value conversion between native payloads and placeholder arguments.
//!
//! Two directions: [`Converter::to_expression`] materializes raw-template
//! arguments into expressions (driven by the `?::type` hint), and
//! [`Converter::to_sql`] converts a bag value into the driver-facing
//! argument for its declared or inferred SQL type.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::ast::expression::{ArrayExpr, Expression, Name, RowExpr, ValueExpr};
use crate::value::SqlValue;

/// Errors from converting a native value.
#[derive(Debug, Error)]
pub enum ValueConversionError {
    /// Array-typed bindings are not supported.
    #[error("array types are not supported: {0}")]
    ArrayUnsupported(String),

    /// A placeholder hint requires a different value kind.
    #[error("placeholder hint `{hint}` requires a {expected} value")]
    HintMismatch {
        /// The `?::hint` that was given.
        hint: String,
        /// The value kind the hint needs.
        expected: &'static str,
    },

    /// No conversion from the value kind to the requested type exists.
    #[error("cannot convert {kind} value to `{ty}`")]
    Incoercible {
        /// Kind tag of the offending value.
        kind: String,
        /// The requested SQL type.
        ty: String,
        /// The failure that ended the conversion, when one was raised.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON serialization failed.
    #[error("json serialization failed")]
    Json(#[from] serde_json::Error),
}

/// Converts a native value into the driver-facing argument for one SQL
/// type. Registered per type (or under `*` as a wildcard); a failure
/// makes the registry try the next candidate.
pub trait InputConverter: Send + Sync {
    /// Attempts the conversion.
    fn convert(&self, value: &SqlValue, ty: &str) -> Result<SqlValue, ValueConversionError>;
}

/// Guesses a SQL type for payloads the kind-tag inference cannot place,
/// e.g. JSON documents carrying domain objects.
pub trait InputTypeGuesser: Send + Sync {
    /// Returns a type tag, or `None` to defer to the next guesser.
    fn guess(&self, value: &SqlValue) -> Option<String>;
}

/// Registry of conversion plugins. Populated during setup, then frozen
/// inside a shared [`Converter`]; it is never mutated while a render is
/// in flight.
#[derive(Default)]
pub struct ConverterRegistry {
    converters: HashMap<String, Vec<Arc<dyn InputConverter>>>,
    guessers: Vec<Arc<dyn InputTypeGuesser>>,
}

impl ConverterRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a converter for a SQL type; `*` matches every type.
    pub fn register_converter(&mut self, ty: impl Into<String>, converter: Arc<dyn InputConverter>) {
        self.converters.entry(ty.into()).or_default().push(converter);
    }

    /// Registers a type guesser.
    pub fn register_guesser(&mut self, guesser: Arc<dyn InputTypeGuesser>) {
        self.guessers.push(guesser);
    }

    fn converters_for(&self, ty: &str) -> impl Iterator<Item = &Arc<dyn InputConverter>> {
        self.converters
            .get(ty)
            .into_iter()
            .flatten()
            .chain(self.converters.get("*").into_iter().flatten())
    }
}

/// The long-lived, shared value converter.
pub struct Converter {
    registry: ConverterRegistry,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter {
    /// Creates a converter with no plugins.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: ConverterRegistry::new(),
        }
    }

    /// Creates a converter over a populated registry.
    #[must_use]
    pub fn with_registry(registry: ConverterRegistry) -> Self {
        Self { registry }
    }

    /// Materializes a raw-template argument into an expression.
    ///
    /// Null becomes `null`; expressions pass through; the hints `array`,
    /// `column`, `identifier`, `row`, `table` and `value` map to their
    /// constructors; any other hint becomes a typed value; no hint
    /// becomes an untyped value.
    pub fn to_expression(
        &self,
        arg: crate::ast::expression::RawArg,
        hint: Option<&str>,
    ) -> Result<Expression, ValueConversionError> {
        use crate::ast::expression::RawArg;

        let value = match arg {
            RawArg::Expr(expr) => return Ok(expr),
            RawArg::Value(SqlValue::Null) => return Ok(Expression::Null),
            RawArg::Value(value) => value,
        };

        let Some(hint) = hint else {
            return Ok(Expression::Value(ValueExpr { value, ty: None }));
        };

        match hint {
            "value" => Ok(Expression::Value(ValueExpr { value, ty: None })),
            "column" => Ok(Expression::Column(Name::new(Self::text_for(&value, hint)?))),
            "identifier" => Ok(Expression::Identifier(Name::new(Self::text_for(
                &value, hint,
            )?))),
            "table" => Ok(Expression::Table(Name::new(Self::text_for(&value, hint)?))),
            "row" => {
                let items = Self::array_for(value, hint)?;
                Ok(Expression::Row(RowExpr::new(
                    items.into_iter().map(Expression::value).collect(),
                )))
            }
            "array" => {
                let items = Self::array_for(value, hint)?;
                let element_type = items
                    .first()
                    .map_or_else(|| String::from("text"), SqlValue::kind_type);
                Ok(Expression::Array(ArrayExpr {
                    values: items.into_iter().map(Expression::value).collect(),
                    element_type,
                    cast: false,
                }))
            }
            ty => Ok(Expression::Value(ValueExpr {
                value,
                ty: Some(String::from(ty)),
            })),
        }
    }

    /// Converts a bag value into the driver-facing argument for `ty`.
    ///
    /// With no type the value's kind decides (guesser plugins first).
    /// Registered converters for the exact type run before the `*`
    /// wildcard ones; their failures are swallowed and the next
    /// candidate tried. Only the built-in fallback surfaces an error.
    pub fn to_sql(
        &self,
        value: SqlValue,
        ty: Option<&str>,
    ) -> Result<SqlValue, ValueConversionError> {
        if value.is_null() {
            return Ok(SqlValue::Null);
        }

        let ty = match ty {
            Some(t) => String::from(t),
            None => self
                .registry
                .guessers
                .iter()
                .find_map(|g| g.guess(&value))
                .unwrap_or_else(|| value.kind_type()),
        };

        if ty.ends_with("[]") {
            return Err(ValueConversionError::ArrayUnsupported(ty));
        }

        for converter in self.registry.converters_for(&ty) {
            if let Ok(converted) = converter.convert(&value, &ty) {
                return Ok(converted);
            }
        }

        builtin_to_sql(value, &ty)
    }

    fn text_for(value: &SqlValue, hint: &str) -> Result<String, ValueConversionError> {
        value
            .as_text()
            .map(String::from)
            .ok_or_else(|| ValueConversionError::HintMismatch {
                hint: String::from(hint),
                expected: "text",
            })
    }

    fn array_for(value: SqlValue, hint: &str) -> Result<Vec<SqlValue>, ValueConversionError> {
        match value {
            SqlValue::Array(items) => Ok(items),
            _ => Err(ValueConversionError::HintMismatch {
                hint: String::from(hint),
                expected: "array",
            }),
        }
    }
}

fn incoercible(value: &SqlValue, ty: &str) -> ValueConversionError {
    ValueConversionError::Incoercible {
        kind: value.kind_type(),
        ty: String::from(ty),
        source: None,
    }
}

/// The built-in conversion table, tried after every registered plugin.
fn builtin_to_sql(value: SqlValue, ty: &str) -> Result<SqlValue, ValueConversionError> {
    match ty {
        "int" | "integer" | "bigint" | "smallint" | "tinyint" | "serial" | "bigserial" => {
            match value {
                SqlValue::Int(n) => Ok(SqlValue::Int(n)),
                SqlValue::Float(f) => Ok(SqlValue::Int(f as i64)),
                SqlValue::Bool(b) => Ok(SqlValue::Int(i64::from(b))),
                SqlValue::Text(ref s) => {
                    s.parse::<i64>()
                        .map(SqlValue::Int)
                        .map_err(|e| ValueConversionError::Incoercible {
                            kind: value.kind_type(),
                            ty: String::from(ty),
                            source: Some(Box::new(e)),
                        })
                }
                other => Err(incoercible(&other, ty)),
            }
        }
        "float" | "double" | "real" | "numeric" | "decimal" => match value {
            SqlValue::Float(f) => Ok(SqlValue::Float(f)),
            SqlValue::Int(n) => Ok(SqlValue::Float(n as f64)),
            SqlValue::Text(ref s) => {
                s.parse::<f64>()
                    .map(SqlValue::Float)
                    .map_err(|e| ValueConversionError::Incoercible {
                        kind: value.kind_type(),
                        ty: String::from(ty),
                        source: Some(Box::new(e)),
                    })
            }
            other => Err(incoercible(&other, ty)),
        },
        "bool" | "boolean" => match value {
            SqlValue::Bool(b) => Ok(SqlValue::Text(String::from(if b { "true" } else { "false" }))),
            SqlValue::Int(n) => Ok(SqlValue::Text(String::from(if n != 0 {
                "true"
            } else {
                "false"
            }))),
            SqlValue::Text(s) => Ok(SqlValue::Text(s)),
            other => Err(incoercible(&other, ty)),
        },
        "json" | "jsonb" => match value {
            SqlValue::Json(doc) => Ok(SqlValue::Text(serde_json::to_string(&doc)?)),
            SqlValue::Text(s) => Ok(SqlValue::Text(s)),
            SqlValue::Bool(b) => Ok(SqlValue::Text(serde_json::to_string(&b)?)),
            SqlValue::Int(n) => Ok(SqlValue::Text(serde_json::to_string(&n)?)),
            SqlValue::Float(f) => Ok(SqlValue::Text(serde_json::to_string(&f)?)),
            other => Err(incoercible(&other, ty)),
        },
        "text" | "varchar" | "char" | "character" | "string" | "uuid" | "name" => match value {
            SqlValue::Text(s) => Ok(SqlValue::Text(s)),
            SqlValue::Int(n) => Ok(SqlValue::Text(n.to_string())),
            SqlValue::Float(f) => Ok(SqlValue::Text(f.to_string())),
            SqlValue::Bool(b) => Ok(SqlValue::Text(String::from(if b { "true" } else { "false" }))),
            SqlValue::Timestamp(t) => Ok(SqlValue::Text(t.to_rfc3339())),
            SqlValue::Json(doc) => Ok(SqlValue::Text(serde_json::to_string(&doc)?)),
            other => Err(incoercible(&other, ty)),
        },
        "timestamp" | "timestamptz" | "datetime" | "date" | "time" => match value {
            SqlValue::Timestamp(t) => Ok(SqlValue::Timestamp(t)),
            SqlValue::Text(s) => Ok(SqlValue::Text(s)),
            other => Err(incoercible(&other, ty)),
        },
        "blob" | "bytea" | "binary" | "varbinary" => match value {
            SqlValue::Bytes(b) => Ok(SqlValue::Bytes(b)),
            SqlValue::Text(s) => Ok(SqlValue::Bytes(s.into_bytes())),
            other => Err(incoercible(&other, ty)),
        },
        _ => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::expression::RawArg;

    #[test]
    fn test_to_expression_null_and_passthrough() {
        let c = Converter::new();
        assert_eq!(
            c.to_expression(RawArg::Value(SqlValue::Null), None).unwrap(),
            Expression::Null
        );
        let expr = Expression::column("a");
        assert_eq!(
            c.to_expression(RawArg::Expr(expr.clone()), Some("int"))
                .unwrap(),
            expr
        );
    }

    #[test]
    fn test_to_expression_hints() {
        let c = Converter::new();
        let col = c
            .to_expression(RawArg::from("user_id"), Some("column"))
            .unwrap();
        assert_eq!(col, Expression::column("user_id"));

        let typed = c.to_expression(RawArg::from("2"), Some("int")).unwrap();
        match typed {
            Expression::Value(v) => {
                assert_eq!(v.value, SqlValue::Text(String::from("2")));
                assert_eq!(v.ty.as_deref(), Some("int"));
            }
            other => panic!("expected value, got {other:?}"),
        }

        let row = c
            .to_expression(
                RawArg::Value(SqlValue::Array(vec![SqlValue::Int(1), SqlValue::Int(2)])),
                Some("row"),
            )
            .unwrap();
        assert!(matches!(row, Expression::Row(ref r) if r.values.len() == 2));
    }

    #[test]
    fn test_to_expression_hint_mismatch() {
        let c = Converter::new();
        let err = c
            .to_expression(RawArg::Value(SqlValue::Int(3)), Some("column"))
            .unwrap_err();
        assert!(matches!(err, ValueConversionError::HintMismatch { .. }));
    }

    #[test]
    fn test_to_sql_builtin_table() {
        let c = Converter::new();
        assert_eq!(
            c.to_sql(SqlValue::Text(String::from("41")), Some("int"))
                .unwrap(),
            SqlValue::Int(41)
        );
        assert_eq!(
            c.to_sql(SqlValue::Bool(true), None).unwrap(),
            SqlValue::Text(String::from("true"))
        );
        assert_eq!(
            c.to_sql(SqlValue::Int(9), Some("unknown_type")).unwrap(),
            SqlValue::Int(9)
        );
    }

    #[test]
    fn test_to_sql_rejects_arrays() {
        let c = Converter::new();
        let err = c
            .to_sql(SqlValue::Array(vec![SqlValue::Int(1)]), None)
            .unwrap_err();
        assert!(matches!(err, ValueConversionError::ArrayUnsupported(_)));
    }

    #[test]
    fn test_to_sql_incoercible_keeps_cause() {
        let c = Converter::new();
        let err = c
            .to_sql(SqlValue::Text(String::from("not a number")), Some("int"))
            .unwrap_err();
        match err {
            ValueConversionError::Incoercible { source, .. } => assert!(source.is_some()),
            other => panic!("expected incoercible, got {other}"),
        }
    }

    struct UpperCaser;

    impl InputConverter for UpperCaser {
        fn convert(&self, value: &SqlValue, _ty: &str) -> Result<SqlValue, ValueConversionError> {
            match value {
                SqlValue::Text(s) => Ok(SqlValue::Text(s.to_uppercase())),
                other => Err(incoercible(other, "shout")),
            }
        }
    }

    #[test]
    fn test_plugin_failure_falls_through() {
        let mut registry = ConverterRegistry::new();
        registry.register_converter("int", Arc::new(UpperCaser));
        let c = Converter::with_registry(registry);

        // The plugin rejects ints, so the builtin table handles them.
        assert_eq!(
            c.to_sql(SqlValue::Int(5), Some("int")).unwrap(),
            SqlValue::Int(5)
        );
        // But it wins for text values of its registered type.
        assert_eq!(
            c.to_sql(SqlValue::Text(String::from("7")), Some("int"))
                .unwrap(),
            SqlValue::Text(String::from("7"))
        );
    }

    struct JsonGuesser;

    impl InputTypeGuesser for JsonGuesser {
        fn guess(&self, value: &SqlValue) -> Option<String> {
            matches!(value, SqlValue::Json(_)).then(|| String::from("jsonb"))
        }
    }

    #[test]
    fn test_guesser_supplies_type() {
        let mut registry = ConverterRegistry::new();
        registry.register_guesser(Arc::new(JsonGuesser));
        let c = Converter::with_registry(registry);

        let out = c
            .to_sql(SqlValue::Json(serde_json::json!({"a": 1})), None)
            .unwrap();
        assert_eq!(out, SqlValue::Text(String::from("{\"a\":1}")));
    }
}
