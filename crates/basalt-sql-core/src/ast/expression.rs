//! Expression AST types.

use std::fmt;
use std::sync::Arc;

use crate::ast::statement::{
    DeleteQuery, InsertQuery, MergeQuery, OrderByClause, SelectQuery, UpdateQuery,
};
use crate::error::Result;
use crate::value::{SqlValue, ToSqlValue};
use crate::writer::WriterContext;

/// An identifier payload shared by identifiers, columns and tables.
///
/// For columns the namespace is the table qualifier; for tables it is
/// the schema. Names are quoted as-is, dots included, so `t.id` as a
/// column name renders as one quoted identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Name {
    /// The identifier itself.
    pub name: String,
    /// Optional qualifier rendered in front of the name.
    pub namespace: Option<String>,
}

impl Name {
    /// Creates an unqualified name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
        }
    }

    /// Creates a qualified name.
    #[must_use]
    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
        }
    }
}

/// A value bound as a placeholder argument, with an optional type tag
/// driving later conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueExpr {
    /// The native payload.
    pub value: SqlValue,
    /// Optional declared SQL type.
    pub ty: Option<String>,
}

/// A positional argument supplied with a raw template.
#[derive(Debug, Clone, PartialEq)]
pub enum RawArg {
    /// A native value, resolved through the converter.
    Value(SqlValue),
    /// An expression, spliced in as-is.
    Expr(Expression),
}

impl From<SqlValue> for RawArg {
    fn from(value: SqlValue) -> Self {
        Self::Value(value)
    }
}

impl From<Expression> for RawArg {
    fn from(expr: Expression) -> Self {
        Self::Expr(expr)
    }
}

impl From<i64> for RawArg {
    fn from(value: i64) -> Self {
        Self::Value(SqlValue::Int(value))
    }
}

impl From<i32> for RawArg {
    fn from(value: i32) -> Self {
        Self::Value(SqlValue::Int(i64::from(value)))
    }
}

impl From<f64> for RawArg {
    fn from(value: f64) -> Self {
        Self::Value(SqlValue::Float(value))
    }
}

impl From<bool> for RawArg {
    fn from(value: bool) -> Self {
        Self::Value(SqlValue::Bool(value))
    }
}

impl From<&str> for RawArg {
    fn from(value: &str) -> Self {
        Self::Value(SqlValue::Text(String::from(value)))
    }
}

impl From<String> for RawArg {
    fn from(value: String) -> Self {
        Self::Value(SqlValue::Text(value))
    }
}

/// A user-supplied SQL template with positional arguments.
///
/// The template is subject to placeholder parsing: `?` and `?::type`
/// consume arguments, `??` is an escaped `?`, and spans delimited by the
/// dialect's escape sequences are passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct RawExpr {
    /// The SQL template.
    pub template: String,
    /// Positional arguments, consumed left to right.
    pub args: Vec<RawArg>,
}

/// An expression carrying an alias.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasedExpr {
    /// The aliased expression.
    pub inner: Box<Expression>,
    /// The alias. Numeric aliases are dropped at render time.
    pub alias: String,
}

/// A comparison with all parts optional; missing parts are omitted from
/// the rendering, so `is not null` can be an operator-only comparison.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonExpr {
    /// Left operand.
    pub left: Option<Box<Expression>>,
    /// Operator, rendered verbatim.
    pub operator: Option<String>,
    /// Right operand.
    pub right: Option<Box<Expression>>,
}

/// `column between from and to`.
#[derive(Debug, Clone, PartialEq)]
pub struct BetweenExpr {
    /// The tested expression.
    pub column: Box<Expression>,
    /// Lower bound.
    pub from: Box<Expression>,
    /// Upper bound.
    pub to: Box<Expression>,
}

/// One WHEN/THEN arm of a CASE expression.
#[derive(Debug, Clone, PartialEq)]
pub struct IfThenExpr {
    /// The condition.
    pub condition: Expression,
    /// The result when the condition holds.
    pub then: Expression,
}

impl IfThenExpr {
    /// Reduces this arm to a single-armed CASE expression.
    #[must_use]
    pub fn into_case_when(self) -> CaseWhenExpr {
        CaseWhenExpr {
            cases: vec![self],
            else_: None,
        }
    }
}

/// `CASE WHEN ... THEN ... ELSE ... END`. With no arms it degenerates to
/// the else expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseWhenExpr {
    /// The WHEN/THEN arms.
    pub cases: Vec<IfThenExpr>,
    /// The ELSE expression.
    pub else_: Option<Box<Expression>>,
}

/// `cast(inner as type)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CastExpr {
    /// The expression being cast.
    pub inner: Box<Expression>,
    /// Target type, passed through the dialect's type mapping.
    pub ty: String,
}

/// A plain function call.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCallExpr {
    /// Function name; identifier-escaped only when it contains
    /// characters outside `[A-Za-z0-9_]`.
    pub function: String,
    /// Ordered arguments.
    pub args: Vec<Expression>,
}

/// The window an aggregate runs over.
#[derive(Debug, Clone, PartialEq)]
pub enum OverClause {
    /// Reference to a window named in the statement's WINDOW clause.
    Named(String),
    /// An inline window.
    Window(WindowExpr),
}

/// An aggregate call with optional FILTER and OVER clauses.
///
/// On dialects without FILTER support the filter is rewritten into a
/// CASE expression around the aggregated operand.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateExpr {
    /// Aggregate function name, always identifier-escaped.
    pub function: String,
    /// Aggregated operand; `count` with no operand renders `count(*)`.
    pub column: Option<Box<Expression>>,
    /// Optional FILTER condition.
    pub filter: Option<WhereExpr>,
    /// Optional window.
    pub over: Option<OverClause>,
}

/// A window specification, inline or named.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowExpr {
    /// Name, when declared in a statement's WINDOW clause.
    pub name: Option<String>,
    /// PARTITION BY expressions.
    pub partition_by: Vec<Expression>,
    /// ORDER BY items.
    pub order_by: Vec<OrderByClause>,
}

/// `floor(random() * (max - min + 1) + min)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomIntExpr {
    /// Inclusive lower bound.
    pub min: i64,
    /// Inclusive upper bound; clamped so that `max >= min`.
    pub max: i64,
}

impl RandomIntExpr {
    /// Creates a guarded range.
    #[must_use]
    pub fn new(min: i64, max: i64) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }
}

/// A LIKE comparison whose pattern is composed from a raw value.
///
/// The value is LIKE-escaped by the dialect and substituted for every
/// `{}` in the pattern template; the composed pattern is bound as an
/// argument, never inlined.
#[derive(Debug, Clone, PartialEq)]
pub struct LikePatternExpr {
    /// The matched expression.
    pub column: Option<Box<Expression>>,
    /// The raw (unescaped) value.
    pub value: Option<String>,
    /// Pattern template, e.g. `%{}%`.
    pub pattern: String,
    /// Per-call reserved characters for LIKE escaping.
    pub reserved: Option<Vec<char>>,
}

/// A SIMILAR TO / regex comparison built like [`LikePatternExpr`].
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarToExpr {
    /// The matched expression.
    pub column: Option<Box<Expression>>,
    /// The raw (unescaped) value.
    pub value: Option<String>,
    /// Pattern template, e.g. `%{}%`.
    pub pattern: String,
    /// Per-call reserved characters.
    pub reserved: Option<Vec<char>>,
    /// Case-sensitive matching.
    pub case_sensitive: bool,
    /// Use the dialect's regex operator instead of SIMILAR TO.
    pub regex: bool,
}

/// A parenthesized value row, optionally cast.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowExpr {
    /// Ordered values.
    pub values: Vec<Expression>,
    /// Optional cast target.
    pub cast_to: Option<String>,
}

impl RowExpr {
    /// Creates a row of values.
    #[must_use]
    pub fn new(values: Vec<Expression>) -> Self {
        Self {
            values,
            cast_to: None,
        }
    }
}

/// `array[...]`, optionally cast to `type[]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayExpr {
    /// Ordered element expressions.
    pub values: Vec<Expression>,
    /// Element type.
    pub element_type: String,
    /// Whether to cast the literal to `element_type[]`.
    pub cast: bool,
}

/// A `values (...), (...)` literal table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantTableExpr {
    /// Ordered rows.
    pub rows: Vec<RowExpr>,
    /// Optional column names, attached when the table is aliased.
    pub columns: Vec<String>,
}

impl ConstantTableExpr {
    /// Creates a constant table from rows of expressions.
    #[must_use]
    pub fn new(rows: Vec<Vec<Expression>>) -> Self {
        Self {
            rows: rows.into_iter().map(RowExpr::new).collect(),
            columns: Vec::new(),
        }
    }

    /// Attaches column names.
    #[must_use]
    pub fn columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }
}

/// The boolean connective of a WHERE group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoolOperator {
    /// Conditions joined with `and`.
    #[default]
    And,
    /// Conditions joined with `or`.
    Or,
}

impl BoolOperator {
    /// Returns the SQL connective.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// A group of conditions joined by one connective.
///
/// An empty group renders as `1`; empty nested groups are skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereExpr {
    /// The connective.
    pub operator: BoolOperator,
    /// Ordered conditions.
    pub conditions: Vec<Expression>,
}

impl WhereExpr {
    /// Creates an empty AND group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty OR group.
    #[must_use]
    pub fn any() -> Self {
        Self {
            operator: BoolOperator::Or,
            conditions: Vec::new(),
        }
    }

    /// Appends a condition.
    pub fn push(&mut self, condition: impl Into<Expression>) {
        self.conditions.push(condition.into());
    }

    /// True when the group contains no renderable condition, looking
    /// through nested groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.iter().all(|c| match c {
            Expression::Where(w) => w.is_empty(),
            _ => false,
        })
    }
}

impl From<Expression> for WhereExpr {
    fn from(condition: Expression) -> Self {
        Self {
            operator: BoolOperator::And,
            conditions: vec![condition],
        }
    }
}

/// An expression rendered by a caller-supplied closure.
///
/// This is the extension point for expression kinds the writer does not
/// know about; the closure receives the render context and returns the
/// SQL fragment.
#[derive(Clone)]
pub struct CustomExpr {
    /// The renderer.
    pub render: Arc<dyn Fn(&mut WriterContext) -> Result<String> + Send + Sync>,
}

impl CustomExpr {
    /// Wraps a render closure.
    pub fn new(render: impl Fn(&mut WriterContext) -> Result<String> + Send + Sync + 'static) -> Self {
        Self {
            render: Arc::new(render),
        }
    }
}

impl fmt::Debug for CustomExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomExpr")
    }
}

impl PartialEq for CustomExpr {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.render, &other.render)
    }
}

/// An SQL expression.
///
/// The closed set of nodes the writer can render. Trees are immutable
/// once handed to a writer; sharing a subtree across positions is done
/// by cloning it.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// The `null` literal.
    Null,
    /// A bound value, emitted as a placeholder.
    Value(ValueExpr),
    /// A parenthesized row of values.
    Row(RowExpr),
    /// An `array[...]` literal.
    Array(ArrayExpr),
    /// A generic identifier.
    Identifier(Name),
    /// A column reference; `*` is special-cased.
    Column(Name),
    /// A table reference.
    Table(Name),
    /// A raw SQL fragment.
    Raw(RawExpr),
    /// A raw fragment that is a full statement; parenthesized when
    /// embedded in a sub-position.
    RawQuery(RawExpr),
    /// An aliased expression.
    Aliased(AliasedExpr),
    /// A comparison.
    Comparison(ComparisonExpr),
    /// A BETWEEN test.
    Between(BetweenExpr),
    /// A negation with forced parentheses.
    Not(Box<Expression>),
    /// A CASE expression.
    CaseWhen(CaseWhenExpr),
    /// A single WHEN/THEN arm, reduced to CASE at render time.
    IfThen(Box<IfThenExpr>),
    /// String concatenation.
    Concat(Vec<Expression>),
    /// A cast.
    Cast(CastExpr),
    /// A plain function call.
    FunctionCall(FunctionCallExpr),
    /// An aggregate call.
    Aggregate(AggregateExpr),
    /// A window specification.
    Window(WindowExpr),
    /// `current_timestamp`.
    CurrentTimestamp,
    /// The dialect's random() function.
    Random,
    /// A random integer in an inclusive range.
    RandomInt(RandomIntExpr),
    /// A LIKE comparison with a composed pattern.
    LikePattern(LikePatternExpr),
    /// A SIMILAR TO / regex comparison.
    SimilarToPattern(SimilarToExpr),
    /// A `values (...), (...)` table.
    ConstantTable(ConstantTableExpr),
    /// A condition group.
    Where(WhereExpr),
    /// A SELECT statement.
    Select(Box<SelectQuery>),
    /// An INSERT statement.
    Insert(Box<InsertQuery>),
    /// An UPDATE statement.
    Update(Box<UpdateQuery>),
    /// A DELETE statement.
    Delete(Box<DeleteQuery>),
    /// A MERGE statement.
    Merge(Box<MergeQuery>),
    /// A caller-rendered expression.
    Custom(CustomExpr),
}

impl Expression {
    /// Creates an untyped bound value.
    #[must_use]
    pub fn value(value: impl ToSqlValue) -> Self {
        Self::Value(ValueExpr {
            value: value.to_sql_value(),
            ty: None,
        })
    }

    /// Creates a bound value with a declared SQL type.
    #[must_use]
    pub fn typed_value(value: impl ToSqlValue, ty: impl Into<String>) -> Self {
        Self::Value(ValueExpr {
            value: value.to_sql_value(),
            ty: Some(ty.into()),
        })
    }

    /// Creates a column reference.
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column(Name::new(name))
    }

    /// Creates a table-qualified column reference.
    #[must_use]
    pub fn qualified_column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Column(Name::namespaced(table, name))
    }

    /// Creates an identifier.
    #[must_use]
    pub fn identifier(name: impl Into<String>) -> Self {
        Self::Identifier(Name::new(name))
    }

    /// Creates a table reference.
    #[must_use]
    pub fn table(name: impl Into<String>) -> Self {
        Self::Table(Name::new(name))
    }

    /// Creates a raw fragment with positional arguments.
    #[must_use]
    pub fn raw(template: impl Into<String>, args: Vec<RawArg>) -> Self {
        Self::Raw(RawExpr {
            template: template.into(),
            args,
        })
    }

    /// Creates a raw full statement.
    #[must_use]
    pub fn raw_query(template: impl Into<String>, args: Vec<RawArg>) -> Self {
        Self::RawQuery(RawExpr {
            template: template.into(),
            args,
        })
    }

    /// Creates a row of values.
    #[must_use]
    pub fn row(values: Vec<Expression>) -> Self {
        Self::Row(RowExpr::new(values))
    }

    /// Creates an `array[...]` literal.
    #[must_use]
    pub fn array(values: Vec<Expression>, element_type: impl Into<String>) -> Self {
        Self::Array(ArrayExpr {
            values,
            element_type: element_type.into(),
            cast: false,
        })
    }

    /// Creates a function call.
    #[must_use]
    pub fn function(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Self::FunctionCall(FunctionCallExpr {
            function: name.into(),
            args,
        })
    }

    /// Wraps this expression in a cast.
    #[must_use]
    pub fn cast(self, ty: impl Into<String>) -> Self {
        Self::Cast(CastExpr {
            inner: Box::new(self),
            ty: ty.into(),
        })
    }

    /// Attaches an alias. Aliasing an already-aliased expression
    /// replaces the alias instead of nesting.
    #[must_use]
    pub fn alias(self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        match self {
            Self::Aliased(a) => Self::Aliased(AliasedExpr {
                inner: a.inner,
                alias,
            }),
            inner => Self::Aliased(AliasedExpr {
                inner: Box::new(inner),
                alias,
            }),
        }
    }

    fn compare(self, operator: &str, right: Self) -> Self {
        Self::Comparison(ComparisonExpr {
            left: Some(Box::new(self)),
            operator: Some(String::from(operator)),
            right: Some(Box::new(right)),
        })
    }

    /// `self = right`.
    #[must_use]
    pub fn eq(self, right: Self) -> Self {
        self.compare("=", right)
    }

    /// `self != right`.
    #[must_use]
    pub fn ne(self, right: Self) -> Self {
        self.compare("!=", right)
    }

    /// `self < right`.
    #[must_use]
    pub fn lt(self, right: Self) -> Self {
        self.compare("<", right)
    }

    /// `self <= right`.
    #[must_use]
    pub fn lt_eq(self, right: Self) -> Self {
        self.compare("<=", right)
    }

    /// `self > right`.
    #[must_use]
    pub fn gt(self, right: Self) -> Self {
        self.compare(">", right)
    }

    /// `self >= right`.
    #[must_use]
    pub fn gt_eq(self, right: Self) -> Self {
        self.compare(">=", right)
    }

    /// `self like right`.
    #[must_use]
    pub fn like(self, right: Self) -> Self {
        self.compare("like", right)
    }

    /// `self in (a, b, ...)`.
    #[must_use]
    pub fn in_list(self, values: Vec<Expression>) -> Self {
        self.compare("in", Self::row(values))
    }

    /// `self is null`.
    #[must_use]
    pub fn is_null(self) -> Self {
        Self::Comparison(ComparisonExpr {
            left: Some(Box::new(self)),
            operator: Some(String::from("is null")),
            right: None,
        })
    }

    /// `self is not null`.
    #[must_use]
    pub fn is_not_null(self) -> Self {
        Self::Comparison(ComparisonExpr {
            left: Some(Box::new(self)),
            operator: Some(String::from("is not null")),
            right: None,
        })
    }

    /// `self between from and to`.
    #[must_use]
    pub fn between(self, from: Self, to: Self) -> Self {
        Self::Between(BetweenExpr {
            column: Box::new(self),
            from: Box::new(from),
            to: Box::new(to),
        })
    }

    /// `not (self)`.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// True when evaluating the expression produces a value. Statements
    /// without a RETURNING list do not.
    #[must_use]
    pub fn returns(&self) -> bool {
        match self {
            Self::Insert(q) => !q.returning.is_empty(),
            Self::Update(q) => !q.returning.is_empty(),
            Self::Delete(q) => !q.returning.is_empty(),
            Self::Merge(_) => false,
            _ => true,
        }
    }

    /// A short tag for the variant, used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Value(_) => "value",
            Self::Row(_) => "row",
            Self::Array(_) => "array",
            Self::Identifier(_) => "identifier",
            Self::Column(_) => "column",
            Self::Table(_) => "table",
            Self::Raw(_) => "raw",
            Self::RawQuery(_) => "raw query",
            Self::Aliased(_) => "aliased",
            Self::Comparison(_) => "comparison",
            Self::Between(_) => "between",
            Self::Not(_) => "not",
            Self::CaseWhen(_) => "case",
            Self::IfThen(_) => "if-then",
            Self::Concat(_) => "concat",
            Self::Cast(_) => "cast",
            Self::FunctionCall(_) => "function call",
            Self::Aggregate(_) => "aggregate",
            Self::Window(_) => "window",
            Self::CurrentTimestamp => "current timestamp",
            Self::Random => "random",
            Self::RandomInt(_) => "random int",
            Self::LikePattern(_) => "like pattern",
            Self::SimilarToPattern(_) => "similar-to pattern",
            Self::ConstantTable(_) => "constant table",
            Self::Where(_) => "where",
            Self::Select(_) => "select",
            Self::Insert(_) => "insert",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
            Self::Merge(_) => "merge",
            Self::Custom(_) => "custom",
        }
    }
}

impl From<WhereExpr> for Expression {
    fn from(w: WhereExpr) -> Self {
        Self::Where(w)
    }
}

impl From<ConstantTableExpr> for Expression {
    fn from(t: ConstantTableExpr) -> Self {
        Self::ConstantTable(t)
    }
}

impl From<SelectQuery> for Expression {
    fn from(q: SelectQuery) -> Self {
        Self::Select(Box::new(q))
    }
}

impl From<InsertQuery> for Expression {
    fn from(q: InsertQuery) -> Self {
        Self::Insert(Box::new(q))
    }
}

impl From<UpdateQuery> for Expression {
    fn from(q: UpdateQuery) -> Self {
        Self::Update(Box::new(q))
    }
}

impl From<DeleteQuery> for Expression {
    fn from(q: DeleteQuery) -> Self {
        Self::Delete(Box::new(q))
    }
}

impl From<MergeQuery> for Expression {
    fn from(q: MergeQuery) -> Self {
        Self::Merge(Box::new(q))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_chaining() {
        let expr = Expression::column("age").gt(Expression::value(18));
        assert!(matches!(
            expr,
            Expression::Comparison(ComparisonExpr {
                operator: Some(ref op),
                ..
            }) if op == ">"
        ));
    }

    #[test]
    fn test_alias_replaces_existing_alias() {
        let aliased = Expression::column("a").alias("x").alias("y");
        match aliased {
            Expression::Aliased(a) => {
                assert_eq!(a.alias, "y");
                assert!(matches!(*a.inner, Expression::Column(_)));
            }
            other => panic!("expected aliased, got {other:?}"),
        }
    }

    #[test]
    fn test_random_int_range_guard() {
        let r = RandomIntExpr::new(10, 3);
        assert_eq!(r.min, 10);
        assert_eq!(r.max, 10);
    }

    #[test]
    fn test_empty_where_detection() {
        let mut w = WhereExpr::new();
        assert!(w.is_empty());
        w.push(Expression::Where(WhereExpr::new()));
        assert!(w.is_empty());
        w.push(Expression::column("a").is_null());
        assert!(!w.is_empty());
    }

    #[test]
    fn test_returns() {
        let insert = InsertQuery::default();
        assert!(!Expression::from(insert).returns());
        let mut with_returning = InsertQuery::default();
        with_returning.returning.push(Expression::column("id"));
        assert!(Expression::from(with_returning).returns());
        assert!(Expression::value(1).returns());
    }
}
