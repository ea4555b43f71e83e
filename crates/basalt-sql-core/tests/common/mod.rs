#![allow(dead_code)]

use basalt_sql_core::writer::PrepareInput;
use basalt_sql_core::{SqlString, SqlValue, SqlWriter, StandardWriter};

/// Prepares an input with the standard writer, panicking on error.
pub fn prepare(input: impl Into<PrepareInput>) -> SqlString {
    StandardWriter::default()
        .prepare(input.into())
        .unwrap_or_else(|e| panic!("prepare failed: {e}"))
}

/// Prepares an input with a specific writer, panicking on error.
pub fn prepare_with(writer: &dyn SqlWriter, input: impl Into<PrepareInput>) -> SqlString {
    writer
        .prepare(input.into())
        .unwrap_or_else(|e| panic!("prepare failed: {e}"))
}

/// The bound values of a prepared statement, in placeholder order.
pub fn values(prepared: &SqlString) -> Vec<SqlValue> {
    prepared.arguments.values().cloned().collect()
}

/// The declared types of the bound arguments, in placeholder order.
pub fn types(prepared: &SqlString) -> Vec<Option<String>> {
    prepared.arguments.iter().map(|a| a.ty.clone()).collect()
}
