//! UPDATE builder.

use crate::ast::expression::{Expression, Name};
use crate::ast::statement::{JoinClause, QueryOptions, SetValue, UpdateQuery, WithClause};

/// Starts an UPDATE of a table.
#[must_use]
pub fn update(table: impl Into<String>) -> UpdateQuery {
    UpdateQuery {
        table: Some(Name::new(table)),
        ..UpdateQuery::default()
    }
}

impl UpdateQuery {
    /// Adds a CTE.
    #[must_use]
    pub fn with(mut self, alias: impl Into<String>, expression: impl Into<Expression>) -> Self {
        self.with.push(WithClause {
            alias: alias.into(),
            expression: expression.into(),
        });
        self
    }

    /// Adds a SET assignment. Passing a plain string escapes it as a
    /// literal; pass an [`Expression`] to bind or compute the value.
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<SetValue>) -> Self {
        self.set.push((Name::new(column), value.into()));
        self
    }

    /// Adds a FROM table.
    #[must_use]
    pub fn from(mut self, table: impl Into<Expression>) -> Self {
        self.from.push(table.into());
        self
    }

    /// Adds a JOIN clause; the first one is promoted into FROM.
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_builder_shape() {
        let query = update("t")
            .set("a", Expression::value(1))
            .set("b", "frozen")
            .where_clause(Expression::column("id").eq(Expression::value(7)));

        assert_eq!(query.set.len(), 2);
        assert!(matches!(query.set[1].1, SetValue::Literal(_)));
        assert_eq!(query.where_.conditions.len(), 1);
    }
}
