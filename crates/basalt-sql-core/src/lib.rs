//! # basalt-sql-core
//!
//! A dialect-aware SQL query builder: assemble relational queries as a
//! typed expression tree, then render the tree into a dialect-specific
//! SQL string paired with a positional argument vector ready for a
//! database driver.
//!
//! Supported platforms: PostgreSQL, MySQL, MariaDB, SQLite and SQL
//! Server. Their syntactic divergences live behind one expression
//! model; a [`dialect::Platform`] tag selects the matching writer and
//! escaper pair.
//!
//! This crate builds and renders SQL. It does not execute it: drivers,
//! connections, transactions and row hydration are the caller's
//! business.
//!
//! ## Building and preparing a query
//!
//! ```rust
//! use basalt_sql_core::{select, Expression, SqlWriter, StandardWriter};
//!
//! let query = select()
//!     .column(Expression::column("a"))
//!     .from(Expression::table("t"))
//!     .where_clause(Expression::column("a").eq(Expression::value(1)));
//!
//! let writer = StandardWriter::default();
//! let prepared = writer.prepare(query.into()).unwrap();
//!
//! assert_eq!(prepared.sql, "select \"a\"\nfrom \"t\"\nwhere \"a\" = ?");
//! assert_eq!(prepared.arguments.len(), 1);
//! ```
//!
//! Builders never render; all SQL is produced inside
//! [`SqlWriter::prepare`], which threads a fresh [`writer::WriterContext`]
//! through the tree and collects every bound value into the
//! [`ArgumentBag`] in placeholder order.
//!
//! ## Raw SQL fragments
//!
//! Raw templates are the escape hatch. `?` and `?::type` consume
//! positional arguments (the type drives the converter), `??` is an
//! escaped question mark, and anything inside the dialect's string
//! spans is left alone:
//!
//! ```rust
//! use basalt_sql_core::ast::RawArg;
//! use basalt_sql_core::{Expression, SqlWriter, StandardWriter};
//!
//! let writer = StandardWriter::default();
//! let raw = Expression::raw("select ? + ?::int", vec![RawArg::from(1), RawArg::from("2")]);
//! let prepared = writer.prepare(raw.into()).unwrap();
//!
//! assert_eq!(prepared.sql, "select ? + ?");
//! assert_eq!(prepared.arguments.len(), 2);
//! ```
//!
//! ## Dialects
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use basalt_sql_core::convert::Converter;
//! use basalt_sql_core::{select, Expression, Platform, SqlWriter};
//!
//! let converter = Arc::new(Converter::new());
//! let writer = "postgresql".parse::<Platform>().unwrap().writer(converter);
//!
//! let query = select()
//!     .column(Expression::column("id"))
//!     .from(Expression::table("users"))
//!     .where_clause(Expression::column("id").eq(Expression::value(7)));
//!
//! let prepared = writer.prepare(query.into()).unwrap();
//! assert_eq!(prepared.sql, "select \"id\"\nfrom \"users\"\nwhere \"id\" = $1");
//! ```
//!
//! The converter is the only long-lived shared state; configure its
//! plugin registry during setup and share it across writers with an
//! `Arc`. Every render builds its own context, so independent renders
//! may run on independent threads.

pub mod ast;
pub mod builder;
pub mod convert;
pub mod dialect;
pub mod error;
pub mod value;
pub mod writer;

pub use ast::{Expression, SelectQuery, WhereExpr};
pub use builder::{delete, insert, merge, select, update};
pub use dialect::{
    Escaper, MssqlWriter, MysqlWriter, Platform, PostgresWriter, SqliteWriter, StandardEscaper,
    StandardWriter,
};
pub use error::{QueryBuilderError, Result};
pub use value::{SqlValue, ToSqlValue};
pub use writer::{ArgumentBag, PrepareInput, SqlString, SqlWriter, WriterContext};
