//! Microsoft SQL Server dialect.

use std::sync::Arc;

use super::Escaper;
use crate::convert::Converter;
use crate::writer::{SqlWriter, WriterCore};

/// Escaper for bracket-quoted identifiers and `@pN` placeholders.
#[derive(Debug, Default, Clone, Copy)]
pub struct MssqlEscaper;

impl Escaper for MssqlEscaper {
    fn escape_identifier(&self, name: &str) -> String {
        format!("[{}]", name.replace(']', "]]"))
    }

    fn write_placeholder(&self, index: u32) -> String {
        format!("@p{}", index + 1)
    }

    fn escape_blob(&self, bytes: &[u8]) -> String {
        let mut hex = String::with_capacity(bytes.len() * 2);
        for byte in bytes {
            hex.push_str(&format!("{byte:02x}"));
        }
        format!("0x{hex}")
    }

    fn escape_sequences(&self) -> &[(&'static str, &'static str)] {
        &[("'", "'"), ("\"", "\""), ("[", "]")]
    }
}

/// SQL Server writer.
pub struct MssqlWriter {
    core: WriterCore,
}

impl MssqlWriter {
    /// Creates a writer over a shared converter.
    #[must_use]
    pub fn new(converter: Arc<Converter>) -> Self {
        Self {
            core: WriterCore::new(Box::new(MssqlEscaper), converter),
        }
    }
}

impl Default for MssqlWriter {
    fn default() -> Self {
        Self::new(Arc::new(Converter::new()))
    }
}

impl SqlWriter for MssqlWriter {
    fn core(&self) -> &WriterCore {
        &self.core
    }

    fn supports_filter_clause(&self) -> bool {
        false
    }

    // OFFSET/FETCH paging; both parts need the OFFSET clause.
    fn format_limit_offset(&self, limit: u64, offset: u64) -> Option<String> {
        match (limit, offset) {
            (0, 0) => None,
            (0, o) => Some(format!("offset {o} rows")),
            (l, o) => Some(format!("offset {o} rows fetch next {l} rows only")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracket_quoting() {
        let escaper = MssqlEscaper;
        assert_eq!(escaper.escape_identifier("name"), "[name]");
        assert_eq!(escaper.escape_identifier("a]b"), "[a]]b]");
    }

    #[test]
    fn test_named_placeholders() {
        let escaper = MssqlEscaper;
        assert_eq!(escaper.write_placeholder(0), "@p1");
        assert_eq!(escaper.write_placeholder(4), "@p5");
    }

    #[test]
    fn test_offset_fetch_paging() {
        let writer = MssqlWriter::default();
        assert_eq!(writer.format_limit_offset(0, 0), None);
        assert_eq!(writer.format_limit_offset(0, 5).unwrap(), "offset 5 rows");
        assert_eq!(
            writer.format_limit_offset(10, 5).unwrap(),
            "offset 5 rows fetch next 10 rows only"
        );
        assert_eq!(
            writer.format_limit_offset(10, 0).unwrap(),
            "offset 0 rows fetch next 10 rows only"
        );
    }
}
