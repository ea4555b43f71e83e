//! MERGE builder.

use crate::ast::expression::{Expression, Name};
use crate::ast::statement::{MergeConflict, MergeQuery, QueryOptions, WithClause};

/// Starts a MERGE into a table.
#[must_use]
pub fn merge(table: impl Into<String>) -> MergeQuery {
    MergeQuery {
        table: Some(Name::new(table)),
        ..MergeQuery::default()
    }
}

impl MergeQuery {
    /// Adds a CTE.
    #[must_use]
    pub fn with(mut self, alias: impl Into<String>, expression: impl Into<Expression>) -> Self {
        self.with.push(WithClause {
            alias: alias.into(),
            expression: expression.into(),
        });
        self
    }

    /// Sets the USING source, usually a constant table.
    #[must_use]
    pub fn using(mut self, source: impl Into<Expression>) -> Self {
        self.using = Some(source.into());
        self
    }

    /// Overrides the alias of the USING source (default `excluded`).
    #[must_use]
    pub fn using_alias(mut self, alias: impl Into<String>) -> Self {
        self.using_alias = alias.into();
        self
    }

    /// Sets the key columns matched in the ON clause.
    #[must_use]
    pub fn on_columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.on_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the columns inserted for unmatched rows.
    #[must_use]
    pub fn columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Matched rows are left alone.
    #[must_use]
    pub const fn do_ignore(mut self) -> Self {
        self.conflict = MergeConflict::Ignore;
        self
    }

    /// Matched rows get their non-key columns updated from the USING
    /// alias.
    #[must_use]
    pub const fn do_update(mut self) -> Self {
        self.conflict = MergeConflict::Update;
        self
    }

    /// Sets the logical identifier carried to the prepared statement.
    #[must_use]
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Sets the driver options carried to the prepared statement.
    #[must_use]
    pub fn options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }
}
