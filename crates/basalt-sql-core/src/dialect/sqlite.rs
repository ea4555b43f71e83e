//! SQLite dialect.

use std::sync::Arc;

use super::Escaper;
use crate::convert::Converter;
use crate::writer::{SqlWriter, WriterCore};

/// Escaper for SQLite; double-quoted identifiers, `?` placeholders.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteEscaper;

impl Escaper for SqliteEscaper {
    fn escape_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// SQLite writer. FILTER has been supported since 3.30, so the standard
/// rendering applies throughout.
pub struct SqliteWriter {
    core: WriterCore,
}

impl SqliteWriter {
    /// Creates a writer over a shared converter.
    #[must_use]
    pub fn new(converter: Arc<Converter>) -> Self {
        Self {
            core: WriterCore::new(Box::new(SqliteEscaper), converter),
        }
    }
}

impl Default for SqliteWriter {
    fn default() -> Self {
        Self::new(Arc::new(Converter::new()))
    }
}

impl SqlWriter for SqliteWriter {
    fn core(&self) -> &WriterCore {
        &self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_escaper_defaults() {
        let escaper = SqliteEscaper;
        assert_eq!(escaper.escape_identifier("t"), "\"t\"");
        assert_eq!(escaper.write_placeholder(3), "?");
        assert_eq!(escaper.escape_blob(&[0xab]), "x'ab'");
    }
}
