//! SELECT builder.

use crate::ast::expression::{Expression, WhereExpr, WindowExpr};
use crate::ast::statement::{
    JoinClause, Order, OrderByClause, QueryOptions, SelectColumn, SelectQuery, UnionClause,
    WithClause,
};

/// Starts a SELECT statement.
#[must_use]
pub fn select() -> SelectQuery {
    SelectQuery::default()
}

impl SelectQuery {
    /// Adds a CTE.
    #[must_use]
    pub fn with(mut self, alias: impl Into<String>, expression: impl Into<Expression>) -> Self {
        self.with.push(WithClause {
            alias: alias.into(),
            expression: expression.into(),
        });
        self
    }

    /// Sets `select distinct`.
    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Adds a projection item.
    #[must_use]
    pub fn column(mut self, expression: impl Into<Expression>) -> Self {
        self.columns.push(SelectColumn::new(expression));
        self
    }

    /// Adds an aliased projection item.
    #[must_use]
    pub fn column_as(
        mut self,
        expression: impl Into<Expression>,
        alias: impl Into<String>,
    ) -> Self {
        self.columns.push(SelectColumn {
            expression: expression.into(),
            alias: Some(alias.into()),
        });
        self
    }

    /// Adds a FROM table.
    #[must_use]
    pub fn from(mut self, table: impl Into<Expression>) -> Self {
        self.from.push(table.into());
        self
    }

    /// Adds a JOIN clause.
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

    /// Adds a GROUP BY expression.
    #[must_use]
    pub fn group_by(mut self, expression: impl Into<Expression>) -> Self {
        self.group_by.push(expression.into());
        self
    }

    /// Adds a HAVING condition.
    #[must_use]
    pub fn having(mut self, condition: impl Into<Expression>) -> Self {
        self.having.push(condition);
        self
    }

    /// Declares a named window.
    #[must_use]
    pub fn window(mut self, window: WindowExpr) -> Self {
        self.windows.push(window);
        self
    }

    /// Adds an ORDER BY item.
    #[must_use]
    pub fn order_by(mut self, column: impl Into<Expression>, order: Order) -> Self {
        self.order_by
            .push(OrderByClause::new(column.into(), order));
        self
    }

    /// Adds a fully specified ORDER BY item.
    #[must_use]
    pub fn order_by_clause(mut self, clause: OrderByClause) -> Self {
        self.order_by.push(clause);
        self
    }

    /// Sets LIMIT and OFFSET together; `0` leaves a part out.
    #[must_use]
    pub const fn range(mut self, limit: u64, offset: u64) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    /// Sets the LIMIT.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the OFFSET.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Appends a `union` arm.
    #[must_use]
    pub fn union(mut self, expression: impl Into<Expression>) -> Self {
        self.unions.push(UnionClause {
            all: false,
            expression: expression.into(),
        });
        self
    }

    /// Appends a `union all` arm.
    #[must_use]
    pub fn union_all(mut self, expression: impl Into<Expression>) -> Self {
        self.unions.push(UnionClause {
            all: true,
            expression: expression.into(),
        });
        self
    }

    /// Sets `for update`.
    #[must_use]
    pub const fn for_update(mut self) -> Self {
        self.for_update = true;
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

    /// Replaces the WHERE group wholesale, e.g. to switch to `or`.
    #[must_use]
    pub fn where_group(mut self, group: WhereExpr) -> Self {
        self.where_ = group;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates_without_rendering() {
        let query = select()
            .column(Expression::column("id"))
            .from(Expression::table("users"))
            .where_clause(Expression::column("active").eq(Expression::value(true)))
            .order_by(Expression::column("id"), Order::Desc)
            .range(10, 20);

        assert_eq!(query.columns.len(), 1);
        assert_eq!(query.from.len(), 1);
        assert_eq!(query.where_.conditions.len(), 1);
        assert_eq!(query.limit, 10);
        assert_eq!(query.offset, 20);
    }
}
