//! MySQL / MariaDB dialect.

use std::sync::Arc;

use super::Escaper;
use crate::ast::expression::{Expression, RowExpr};
use crate::convert::Converter;
use crate::error::Result;
use crate::writer::{SqlWriter, WriterContext, WriterCore};

/// Escaper for backtick-quoted identifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct MysqlEscaper;

impl Escaper for MysqlEscaper {
    fn escape_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn escape_sequences(&self) -> &[(&'static str, &'static str)] {
        &[("'", "'"), ("\"", "\""), ("`", "`")]
    }
}

/// MySQL writer. Also used for MariaDB.
pub struct MysqlWriter {
    core: WriterCore,
}

impl MysqlWriter {
    /// Creates a writer over a shared converter.
    #[must_use]
    pub fn new(converter: Arc<Converter>) -> Self {
        Self {
            core: WriterCore::new(Box::new(MysqlEscaper), converter),
        }
    }
}

impl Default for MysqlWriter {
    fn default() -> Self {
        Self::new(Arc::new(Converter::new()))
    }
}

impl SqlWriter for MysqlWriter {
    fn core(&self) -> &WriterCore {
        &self.core
    }

    fn supports_filter_clause(&self) -> bool {
        false
    }

    fn format_current_timestamp(&self) -> String {
        String::from("now()")
    }

    fn format_random(&self) -> String {
        String::from("rand()")
    }

    fn insert_default_values(&self) -> String {
        String::from("() values ()")
    }

    // `||` is logical OR unless PIPES_AS_CONCAT is set.
    fn format_concat(&self, parts: &[Expression], ctx: &mut WriterContext<'_>) -> Result<String> {
        let rendered: Vec<String> = parts
            .iter()
            .map(|p| self.format(p, ctx, true))
            .collect::<Result<_>>()?;
        Ok(format!("concat({})", rendered.join(", ")))
    }

    // MySQL 8.0.19+ requires the ROW keyword in VALUES statements.
    fn format_constant_table_row(
        &self,
        row: &RowExpr,
        ctx: &mut WriterContext<'_>,
    ) -> Result<String> {
        self.format_row(row, ctx, true)
    }

    fn format_limit_offset(&self, limit: u64, offset: u64) -> Option<String> {
        match (limit, offset) {
            (0, 0) => None,
            (l, 0) => Some(format!("limit {l}")),
            // OFFSET needs a LIMIT; the manual suggests this value.
            (0, o) => Some(format!("limit 18446744073709551615 offset {o}")),
            (l, o) => Some(format!("limit {l} offset {o}")),
        }
    }

    fn cast_type(&self, ty: &str) -> String {
        match ty {
            "int" | "integer" | "bigint" | "smallint" | "tinyint" => String::from("signed"),
            "text" | "varchar" | "string" => String::from("char"),
            "float" | "double" | "real" => String::from("double"),
            other => String::from(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backtick_quoting() {
        let escaper = MysqlEscaper;
        assert_eq!(escaper.escape_identifier("name"), "`name`");
        assert_eq!(escaper.escape_identifier("a`b"), "`a``b`");
    }

    #[test]
    fn test_cast_type_mapping() {
        let writer = MysqlWriter::default();
        assert_eq!(writer.cast_type("int"), "signed");
        assert_eq!(writer.cast_type("varchar"), "char");
        assert_eq!(writer.cast_type("uuid"), "uuid");
    }

    #[test]
    fn test_offset_without_limit() {
        let writer = MysqlWriter::default();
        assert_eq!(
            writer.format_limit_offset(0, 5).unwrap(),
            "limit 18446744073709551615 offset 5"
        );
    }
}
