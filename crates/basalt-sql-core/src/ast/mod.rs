//! The SQL expression tree.
//!
//! Everything the writer can render is a variant of [`Expression`];
//! whole statements (SELECT, INSERT, ...) are themselves expression
//! variants so they can appear as subqueries, CTE bodies or join tables.

pub mod expression;
pub mod statement;

pub use expression::{
    AggregateExpr, AliasedExpr, ArrayExpr, BetweenExpr, BoolOperator, CaseWhenExpr, CastExpr,
    ComparisonExpr, ConstantTableExpr, CustomExpr, Expression, FunctionCallExpr, IfThenExpr,
    LikePatternExpr, Name, OverClause, RandomIntExpr, RawArg, RawExpr, RowExpr, SimilarToExpr,
    ValueExpr, WhereExpr, WindowExpr,
};
pub use statement::{
    DeleteQuery, InsertQuery, JoinClause, JoinMode, MergeConflict, MergeQuery, NullOrder, Order,
    OrderByClause, QueryOptions, SelectColumn, SelectQuery, SetValue, UnionClause, UpdateQuery,
    WithClause,
};
