//! The standard SQL-92 dialect.

use std::sync::Arc;

use super::Escaper;
use crate::convert::Converter;
use crate::writer::{SqlWriter, WriterCore};

/// Escaper for double-quoted identifiers and `?` placeholders.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardEscaper;

impl Escaper for StandardEscaper {
    fn escape_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// Writer producing SQL-92/PostgreSQL-compatible output with `?`
/// placeholders. The baseline every dialect writer builds on.
pub struct StandardWriter {
    core: WriterCore,
}

impl StandardWriter {
    /// Creates a writer over a shared converter.
    #[must_use]
    pub fn new(converter: Arc<Converter>) -> Self {
        Self {
            core: WriterCore::new(Box::new(StandardEscaper), converter),
        }
    }
}

impl Default for StandardWriter {
    fn default() -> Self {
        Self::new(Arc::new(Converter::new()))
    }
}

impl SqlWriter for StandardWriter {
    fn core(&self) -> &WriterCore {
        &self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_quoting() {
        let escaper = StandardEscaper;
        assert_eq!(escaper.escape_identifier("name"), "\"name\"");
        assert_eq!(escaper.escape_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_literal_quoting() {
        let escaper = StandardEscaper;
        assert_eq!(escaper.escape_literal("O'Brien"), "'O''Brien'");
    }

    #[test]
    fn test_blob_encoding() {
        let escaper = StandardEscaper;
        assert_eq!(escaper.escape_blob(&[0xde, 0xad]), "x'dead'");
    }

    #[test]
    fn test_placeholder() {
        let escaper = StandardEscaper;
        assert_eq!(escaper.write_placeholder(0), "?");
        assert_eq!(escaper.write_placeholder(9), "?");
        assert_eq!(escaper.unescape_placeholder_char(), "?");
    }
}
