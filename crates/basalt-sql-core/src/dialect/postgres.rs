//! PostgreSQL dialect.

use std::sync::Arc;

use super::Escaper;
use crate::convert::Converter;
use crate::writer::{SqlWriter, WriterCore};

/// Escaper emitting `$1`-style placeholders and bytea blobs.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresEscaper;

impl Escaper for PostgresEscaper {
    fn escape_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn write_placeholder(&self, index: u32) -> String {
        format!("${}", index + 1)
    }

    fn escape_blob(&self, bytes: &[u8]) -> String {
        let mut hex = String::with_capacity(bytes.len() * 2);
        for byte in bytes {
            hex.push_str(&format!("{byte:02x}"));
        }
        format!("'\\x{hex}'")
    }

    fn escape_sequences(&self) -> &[(&'static str, &'static str)] {
        // Dollar-quoted bodies may contain anything, `?` included.
        &[("'", "'"), ("\"", "\""), ("$$", "$$")]
    }
}

/// PostgreSQL writer. The standard rendering already targets Postgres;
/// only the escaper differs.
pub struct PostgresWriter {
    core: WriterCore,
}

impl PostgresWriter {
    /// Creates a writer over a shared converter.
    #[must_use]
    pub fn new(converter: Arc<Converter>) -> Self {
        Self {
            core: WriterCore::new(Box::new(PostgresEscaper), converter),
        }
    }
}

impl Default for PostgresWriter {
    fn default() -> Self {
        Self::new(Arc::new(Converter::new()))
    }
}

impl SqlWriter for PostgresWriter {
    fn core(&self) -> &WriterCore {
        &self.core
    }
}
