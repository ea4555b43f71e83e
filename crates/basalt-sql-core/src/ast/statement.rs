//! Statement clause holders.
//!
//! Each query kind is a plain struct of clauses; the fluent builders in
//! `builder` only accumulate into these, and the writer renders them.
//! Structural validation (missing table, empty SET list) happens at
//! render time.

use std::time::Duration;

use crate::ast::expression::{Expression, Name, WhereExpr, WindowExpr};
use crate::value::SqlValue;

/// Driver-facing options carried from the builder to the prepared
/// statement. The writer never renders them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    /// Suggested statement timeout.
    pub timeout: Option<Duration>,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl Order {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Placement of NULLs in an ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NullOrder {
    /// Dialect default; nothing is rendered.
    #[default]
    Default,
    /// `nulls first`.
    First,
    /// `nulls last`.
    Last,
}

/// One ORDER BY item.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByClause {
    /// The ordered expression.
    pub column: Expression,
    /// Direction, always rendered.
    pub order: Order,
    /// NULL placement.
    pub nulls: NullOrder,
}

impl OrderByClause {
    /// Creates an item with default NULL placement.
    #[must_use]
    pub fn new(column: Expression, order: Order) -> Self {
        Self {
            column,
            order,
            nulls: NullOrder::Default,
        }
    }
}

/// Join flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinMode {
    /// `inner join`.
    Inner,
    /// `left outer join`.
    Left,
    /// `left outer join`.
    LeftOuter,
    /// `right outer join`.
    Right,
    /// `right outer join`.
    RightOuter,
    /// `natural join`.
    Natural,
}

impl JoinMode {
    /// Returns the SQL join phrase.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "inner join",
            Self::Left | Self::LeftOuter => "left outer join",
            Self::Right | Self::RightOuter => "right outer join",
            Self::Natural => "natural join",
        }
    }

    /// True when this join may be promoted into the leading table of an
    /// UPDATE or DELETE.
    #[must_use]
    pub const fn is_promotable(&self) -> bool {
        matches!(self, Self::Inner | Self::Natural)
    }
}

/// One JOIN clause. An empty condition renders as `cross join`.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    /// Join flavor.
    pub mode: JoinMode,
    /// Joined table (or aliased subquery / constant table).
    pub table: Expression,
    /// Join condition.
    pub condition: WhereExpr,
}

impl JoinClause {
    /// Creates a join.
    #[must_use]
    pub fn new(mode: JoinMode, table: impl Into<Expression>, condition: impl Into<WhereExpr>) -> Self {
        Self {
            mode,
            table: table.into(),
            condition: condition.into(),
        }
    }

    /// Creates an `inner join`.
    #[must_use]
    pub fn inner(table: impl Into<Expression>, condition: impl Into<WhereExpr>) -> Self {
        Self::new(JoinMode::Inner, table, condition)
    }

    /// Creates a `left outer join`.
    #[must_use]
    pub fn left(table: impl Into<Expression>, condition: impl Into<WhereExpr>) -> Self {
        Self::new(JoinMode::Left, table, condition)
    }

    /// Creates a `right outer join`.
    #[must_use]
    pub fn right(table: impl Into<Expression>, condition: impl Into<WhereExpr>) -> Self {
        Self::new(JoinMode::Right, table, condition)
    }

    /// Creates a `natural join`.
    #[must_use]
    pub fn natural(table: impl Into<Expression>) -> Self {
        Self::new(JoinMode::Natural, table, WhereExpr::new())
    }

    /// Creates a `cross join`.
    #[must_use]
    pub fn cross(table: impl Into<Expression>) -> Self {
        Self::new(JoinMode::Inner, table, WhereExpr::new())
    }
}

/// One CTE: `alias as (expression)`.
#[derive(Debug, Clone, PartialEq)]
pub struct WithClause {
    /// CTE name.
    pub alias: String,
    /// CTE body.
    pub expression: Expression,
}

/// One projection item of a SELECT.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    /// The projected expression.
    pub expression: Expression,
    /// Optional alias, subject to the same drop rules as [`super::AliasedExpr`].
    pub alias: Option<String>,
}

impl SelectColumn {
    /// Creates an unaliased projection item.
    #[must_use]
    pub fn new(expression: impl Into<Expression>) -> Self {
        Self {
            expression: expression.into(),
            alias: None,
        }
    }
}

/// One UNION arm.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionClause {
    /// `union all` instead of `union`.
    pub all: bool,
    /// The unioned statement.
    pub expression: Expression,
}

/// A SELECT statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    /// CTEs.
    pub with: Vec<WithClause>,
    /// `select distinct`.
    pub distinct: bool,
    /// Projection; empty renders `*`.
    pub columns: Vec<SelectColumn>,
    /// FROM tables.
    pub from: Vec<Expression>,
    /// JOIN clauses.
    pub joins: Vec<JoinClause>,
    /// WHERE conditions.
    pub where_: WhereExpr,
    /// GROUP BY expressions.
    pub group_by: Vec<Expression>,
    /// HAVING conditions.
    pub having: WhereExpr,
    /// Named windows declared in a WINDOW clause.
    pub windows: Vec<WindowExpr>,
    /// ORDER BY items.
    pub order_by: Vec<OrderByClause>,
    /// Row limit; 0 means absent.
    pub limit: u64,
    /// Row offset; 0 means absent.
    pub offset: u64,
    /// UNION arms.
    pub unions: Vec<UnionClause>,
    /// `for update`.
    pub for_update: bool,
    /// Logical identifier for statement caching by callers.
    pub identifier: Option<String>,
    /// Driver options passed through to the prepared statement.
    pub options: QueryOptions,
}

/// An INSERT statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertQuery {
    /// CTEs.
    pub with: Vec<WithClause>,
    /// Target table.
    pub table: Option<Name>,
    /// Inserted columns; empty with a constant-table source renders the
    /// dialect's empty-insert token.
    pub columns: Vec<Name>,
    /// Source of rows: a constant table or a SELECT.
    pub values: Option<Expression>,
    /// RETURNING expressions.
    pub returning: Vec<Expression>,
    /// Logical identifier for statement caching by callers.
    pub identifier: Option<String>,
    /// Driver options passed through to the prepared statement.
    pub options: QueryOptions,
}

/// The right-hand side of one SET assignment.
///
/// A string passed directly is escaped as a literal; this is the only
/// place a value is inlined instead of bound.
#[derive(Debug, Clone, PartialEq)]
pub enum SetValue {
    /// A literal string, escaped into the SQL text.
    Literal(String),
    /// An expression.
    Expr(Expression),
}

impl From<&str> for SetValue {
    fn from(s: &str) -> Self {
        Self::Literal(String::from(s))
    }
}

impl From<String> for SetValue {
    fn from(s: String) -> Self {
        Self::Literal(s)
    }
}

impl From<Expression> for SetValue {
    fn from(e: Expression) -> Self {
        Self::Expr(e)
    }
}

impl From<SqlValue> for SetValue {
    fn from(v: SqlValue) -> Self {
        Self::Expr(Expression::Value(crate::ast::expression::ValueExpr {
            value: v,
            ty: None,
        }))
    }
}

/// An UPDATE statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateQuery {
    /// CTEs.
    pub with: Vec<WithClause>,
    /// Target table.
    pub table: Option<Name>,
    /// SET assignments.
    pub set: Vec<(Name, SetValue)>,
    /// Extra FROM tables.
    pub from: Vec<Expression>,
    /// JOIN clauses; the first is promoted into FROM.
    pub joins: Vec<JoinClause>,
    /// WHERE conditions.
    pub where_: WhereExpr,
    /// RETURNING expressions.
    pub returning: Vec<Expression>,
    /// Logical identifier for statement caching by callers.
    pub identifier: Option<String>,
    /// Driver options passed through to the prepared statement.
    pub options: QueryOptions,
}

/// A DELETE statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteQuery {
    /// CTEs.
    pub with: Vec<WithClause>,
    /// Target table.
    pub table: Option<Name>,
    /// USING tables.
    pub using: Vec<Expression>,
    /// JOIN clauses; the first is promoted into USING.
    pub joins: Vec<JoinClause>,
    /// WHERE conditions.
    pub where_: WhereExpr,
    /// RETURNING expressions.
    pub returning: Vec<Expression>,
    /// Logical identifier for statement caching by callers.
    pub identifier: Option<String>,
    /// Driver options passed through to the prepared statement.
    pub options: QueryOptions,
}

/// What a MERGE does with matched rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeConflict {
    /// Leave matched rows alone (no `when matched` branch).
    #[default]
    Ignore,
    /// Update non-key columns from the USING alias.
    Update,
}

/// A MERGE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeQuery {
    /// CTEs.
    pub with: Vec<WithClause>,
    /// Target table.
    pub table: Option<Name>,
    /// USING source, usually a constant table.
    pub using: Option<Expression>,
    /// Alias for the USING source.
    pub using_alias: String,
    /// Key columns matched in the ON clause.
    pub on_columns: Vec<String>,
    /// Columns inserted for unmatched rows.
    pub columns: Vec<String>,
    /// Matched-row policy.
    pub conflict: MergeConflict,
    /// Logical identifier for statement caching by callers.
    pub identifier: Option<String>,
    /// Driver options passed through to the prepared statement.
    pub options: QueryOptions,
}

impl Default for MergeQuery {
    fn default() -> Self {
        Self {
            with: Vec::new(),
            table: None,
            using: None,
            using_alias: String::from("excluded"),
            on_columns: Vec::new(),
            columns: Vec::new(),
            conflict: MergeConflict::default(),
            identifier: None,
            options: QueryOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_mode_rendering() {
        assert_eq!(JoinMode::Left.as_str(), "left outer join");
        assert_eq!(JoinMode::LeftOuter.as_str(), "left outer join");
        assert_eq!(JoinMode::Inner.as_str(), "inner join");
        assert_eq!(JoinMode::Natural.as_str(), "natural join");
    }

    #[test]
    fn test_join_promotability() {
        assert!(JoinMode::Inner.is_promotable());
        assert!(JoinMode::Natural.is_promotable());
        assert!(!JoinMode::Left.is_promotable());
        assert!(!JoinMode::RightOuter.is_promotable());
    }

    #[test]
    fn test_set_value_from_string_is_literal() {
        assert!(matches!(SetValue::from("now"), SetValue::Literal(_)));
        assert!(matches!(
            SetValue::from(Expression::value(1)),
            SetValue::Expr(_)
        ));
    }
}
