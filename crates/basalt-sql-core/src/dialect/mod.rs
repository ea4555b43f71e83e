//! SQL dialect support.
//!
//! A dialect is an [`Escaper`] (string-level quoting and placeholder
//! primitives) paired with a writer that overrides the formatting hooks
//! where the dialect's syntax diverges. [`Platform`] maps the public
//! dialect tags onto those pairs.

mod mssql;
mod mysql;
mod postgres;
mod sqlite;
mod standard;

pub use mssql::{MssqlEscaper, MssqlWriter};
pub use mysql::{MysqlEscaper, MysqlWriter};
pub use postgres::{PostgresEscaper, PostgresWriter};
pub use sqlite::{SqliteEscaper, SqliteWriter};
pub use standard::{StandardEscaper, StandardWriter};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::convert::Converter;
use crate::error::QueryBuilderError;
use crate::writer::SqlWriter;

/// String-level primitives for one dialect: identifier and literal
/// quoting, LIKE escaping, blob encoding and placeholder emission.
///
/// The escaper is the only source of quoting truth; the writer never
/// builds quoted tokens itself.
pub trait Escaper: Send + Sync {
    /// Quotes an identifier.
    fn escape_identifier(&self, name: &str) -> String;

    /// Quotes and comma-joins a list of identifiers.
    fn escape_identifier_list(&self, names: &[String]) -> String {
        names
            .iter()
            .map(|n| self.escape_identifier(n))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Quotes a string literal for inclusion in SQL text.
    fn escape_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// Neutralizes LIKE/SIMILAR TO special characters. `reserved`
    /// overrides the default set of `\`, `%` and `_`.
    fn escape_like(&self, value: &str, reserved: Option<&[char]>) -> String {
        let reserved = reserved.unwrap_or(&['\\', '%', '_']);
        let mut out = String::with_capacity(value.len());
        for c in value.chars() {
            if reserved.contains(&c) {
                out.push('\\');
            }
            out.push(c);
        }
        out
    }

    /// Encodes a binary literal.
    fn escape_blob(&self, bytes: &[u8]) -> String {
        let mut hex = String::with_capacity(bytes.len() * 2);
        for byte in bytes {
            hex.push_str(&format!("{byte:02x}"));
        }
        format!("x'{hex}'")
    }

    /// Emits the placeholder token for the argument at a 0-based index.
    fn write_placeholder(&self, index: u32) -> String {
        let _ = index;
        String::from("?")
    }

    /// What a `??` token in a raw template becomes after parsing.
    /// Drivers that substitute placeholders themselves keep `??`.
    fn unescape_placeholder_char(&self) -> &str {
        "?"
    }

    /// Delimiter pairs whose interior the placeholder parser ignores.
    fn escape_sequences(&self) -> &[(&'static str, &'static str)] {
        &[("'", "'"), ("\"", "\"")]
    }
}

/// A supported database platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// PostgreSQL.
    Postgres,
    /// MySQL.
    Mysql,
    /// MariaDB; rendered like MySQL.
    Mariadb,
    /// SQLite.
    Sqlite,
    /// Microsoft SQL Server.
    SqlServer,
}

impl Platform {
    /// The platform tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgresql",
            Self::Mysql => "mysql",
            Self::Mariadb => "mariadb",
            Self::Sqlite => "sqlite",
            Self::SqlServer => "sqlserver",
        }
    }

    /// Builds the writer/escaper pair for this platform.
    #[must_use]
    pub fn writer(&self, converter: Arc<Converter>) -> Box<dyn SqlWriter> {
        match self {
            Self::Postgres => Box::new(PostgresWriter::new(converter)),
            Self::Mysql | Self::Mariadb => Box::new(MysqlWriter::new(converter)),
            Self::Sqlite => Box::new(SqliteWriter::new(converter)),
            Self::SqlServer => Box::new(MssqlWriter::new(converter)),
        }
    }
}

impl FromStr for Platform {
    type Err = QueryBuilderError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "postgresql" => Ok(Self::Postgres),
            "mysql" => Ok(Self::Mysql),
            "mariadb" => Ok(Self::Mariadb),
            "sqlite" => Ok(Self::Sqlite),
            "sqlserver" => Ok(Self::SqlServer),
            other => Err(QueryBuilderError::UnknownPlatform(String::from(other))),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_tags_round_trip() {
        for platform in [
            Platform::Postgres,
            Platform::Mysql,
            Platform::Mariadb,
            Platform::Sqlite,
            Platform::SqlServer,
        ] {
            assert_eq!(platform.as_str().parse::<Platform>().unwrap(), platform);
        }
    }

    #[test]
    fn test_unknown_platform_errors() {
        let err = "oracle".parse::<Platform>().unwrap_err();
        assert!(matches!(err, QueryBuilderError::UnknownPlatform(t) if t == "oracle"));
    }

    #[test]
    fn test_default_like_escaping() {
        let escaper = StandardEscaper;
        assert_eq!(escaper.escape_like("50%_a", None), "50\\%\\_a");
        assert_eq!(
            escaper.escape_like("a*b", Some(&['*'])),
            "a\\*b"
        );
    }
}
