//! DELETE builder.

use crate::ast::expression::{Expression, Name};
use crate::ast::statement::{DeleteQuery, JoinClause, QueryOptions, WithClause};

/// Starts a DELETE from a table.
#[must_use]
pub fn delete(table: impl Into<String>) -> DeleteQuery {
    DeleteQuery {
        table: Some(Name::new(table)),
        ..DeleteQuery::default()
    }
}

impl DeleteQuery {
    /// Adds a CTE.
    #[must_use]
    pub fn with(mut self, alias: impl Into<String>, expression: impl Into<Expression>) -> Self {
        self.with.push(WithClause {
            alias: alias.into(),
            expression: expression.into(),
        });
        self
    }

    /// Adds a USING table.
    #[must_use]
    pub fn using(mut self, table: impl Into<Expression>) -> Self {
        self.using.push(table.into());
        self
    }

    /// Adds a JOIN clause; the first one is promoted into USING.
    #[must_use]
    pub fn join(mut self, join: JoinClause) -> Self {
        self.joins.push(join);
        self
    }

    /// Adds a WHERE condition; conditions accumulate with `and`.
    #[must_use]
    pub fn where_clause(mut self, condition: impl Into<Expression>) -> Self {
        self.where_.push(condition);
        self
    }

    /// Adds a RETURNING expression.
    #[must_use]
    pub fn returning(mut self, expression: impl Into<Expression>) -> Self {
        self.returning.push(expression.into());
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
