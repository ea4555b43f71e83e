//! Error types for query building.

use thiserror::Error;

use crate::convert::ValueConversionError;

/// Errors raised while rendering a query.
///
/// Rendering is synchronous and performs no I/O, so every variant is a
/// structural or conversion failure; nothing here is transient.
#[derive(Debug, Error)]
pub enum QueryBuilderError {
    /// The statement is missing its target table.
    #[error("{0} requires a table")]
    MissingTable(&'static str),

    /// INSERT with explicit columns but no source of values.
    #[error("insert requires a source of values")]
    MissingValues,

    /// UPDATE with an empty SET list.
    #[error("update requires at least one SET assignment")]
    EmptySet,

    /// MERGE without a USING source.
    #[error("merge requires a USING source")]
    MissingUsing,

    /// MERGE without key columns to match on.
    #[error("merge requires at least one key column")]
    EmptyMergeKeys,

    /// A function call or aggregate with an empty name.
    #[error("function call requires a name")]
    MissingFunctionName,

    /// Only INNER and NATURAL joins can be promoted into the leading
    /// table of an UPDATE or DELETE.
    #[error("cannot promote a {mode} join into the leading table of a {statement}")]
    IllegalJoinPromotion {
        /// The offending join mode, as rendered.
        mode: &'static str,
        /// The statement kind the promotion was attempted for.
        statement: &'static str,
    },

    /// The writer has no rendering for this expression.
    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),

    /// Unknown platform tag.
    #[error("unknown platform: {0}")]
    UnknownPlatform(String),

    /// Value conversion failed.
    #[error(transparent)]
    Conversion(#[from] ValueConversionError),
}

/// Result type alias for query building.
pub type Result<T> = std::result::Result<T, QueryBuilderError>;
