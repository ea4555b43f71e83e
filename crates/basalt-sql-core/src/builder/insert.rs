//! INSERT builder.

use crate::ast::expression::{ConstantTableExpr, Expression, Name};
use crate::ast::statement::{InsertQuery, QueryOptions, WithClause};

/// Starts an INSERT into a table.
#[must_use]
pub fn insert(table: impl Into<String>) -> InsertQuery {
    InsertQuery {
        table: Some(Name::new(table)),
        ..InsertQuery::default()
    }
}

impl InsertQuery {
    /// Adds a CTE.
    #[must_use]
    pub fn with(mut self, alias: impl Into<String>, expression: impl Into<Expression>) -> Self {
        self.with.push(WithClause {
            alias: alias.into(),
            expression: expression.into(),
        });
        self
    }

    /// Sets the inserted columns.
    #[must_use]
    pub fn columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns = columns.into_iter().map(Name::new).collect();
        self
    }

    /// Sets the source of rows: a constant table or a SELECT.
    #[must_use]
    pub fn values(mut self, source: impl Into<Expression>) -> Self {
        self.values = Some(source.into());
        self
    }

    /// Sets the source to a constant table built from rows of
    /// expressions.
    #[must_use]
    pub fn rows(mut self, rows: Vec<Vec<Expression>>) -> Self {
        self.values = Some(Expression::ConstantTable(ConstantTableExpr::new(rows)));
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
    fn test_insert_builder_shape() {
        let query = insert("users")
            .columns(["name", "email"])
            .rows(vec![vec![
                Expression::value("alice"),
                Expression::value("a@example.com"),
            ]])
            .returning(Expression::column("id"));

        assert_eq!(query.table.as_ref().unwrap().name, "users");
        assert_eq!(query.columns.len(), 2);
        assert!(matches!(query.values, Some(Expression::ConstantTable(_))));
        assert_eq!(query.returning.len(), 1);
    }
}
