//! The SQL writer: renders expression trees into dialect SQL.
//!
//! [`SqlWriter`] is a trait whose default methods implement the full
//! SQL-92/PostgreSQL-compatible rendering; dialect writers override the
//! few hooks where their syntax diverges. Formatting is synchronous,
//! performs no I/O and never returns partial SQL.

mod context;
mod placeholder;

pub use context::{ArgumentBag, BoundArgument, WriterContext};
pub use placeholder::PlaceholderParser;

use std::sync::Arc;

use tracing::debug;

use crate::ast::expression::{
    AggregateExpr, AliasedExpr, ArrayExpr, BetweenExpr, CaseWhenExpr, CastExpr, ComparisonExpr,
    ConstantTableExpr, Expression, FunctionCallExpr, Name, OverClause, RandomIntExpr, RawArg,
    RawExpr, RowExpr, WhereExpr, WindowExpr,
};
use crate::ast::statement::{
    DeleteQuery, InsertQuery, JoinClause, JoinMode, MergeConflict, MergeQuery, NullOrder,
    OrderByClause, QueryOptions, SelectColumn, SelectQuery, UpdateQuery, WithClause,
};
use crate::convert::Converter;
use crate::dialect::Escaper;
use crate::error::{QueryBuilderError, Result};
use crate::value::SqlValue;

/// Shared writer state: the escaper, the converter, and the placeholder
/// pattern compiled from the escaper's escape sequences.
pub struct WriterCore {
    escaper: Box<dyn Escaper>,
    converter: Arc<Converter>,
    placeholders: PlaceholderParser,
}

impl WriterCore {
    /// Builds the core for an escaper/converter pair.
    #[must_use]
    pub fn new(escaper: Box<dyn Escaper>, converter: Arc<Converter>) -> Self {
        let placeholders = PlaceholderParser::new(escaper.as_ref());
        Self {
            escaper,
            converter,
            placeholders,
        }
    }

    /// The dialect's escaper.
    #[must_use]
    pub fn escaper(&self) -> &dyn Escaper {
        self.escaper.as_ref()
    }

    /// The shared converter.
    #[must_use]
    pub fn converter(&self) -> &Converter {
        self.converter.as_ref()
    }

    /// The compiled placeholder parser.
    #[must_use]
    pub fn placeholders(&self) -> &PlaceholderParser {
        &self.placeholders
    }
}

/// Rendered SQL plus its bound arguments.
#[derive(Debug, Clone)]
pub struct SqlString {
    /// The SQL text with dialect placeholders.
    pub sql: String,
    /// The bound arguments, in placeholder order.
    pub arguments: ArgumentBag,
    /// Logical identifier carried from the root query, for statement
    /// caching by callers.
    pub identifier: Option<String>,
    /// Driver options carried from the root query.
    pub options: QueryOptions,
}

impl SqlString {
    /// Turns this prepared statement back into an expression: a raw
    /// query over the rendered text whose arguments are the bag's typed
    /// values. Re-preparing it yields the same text and arguments.
    #[must_use]
    pub fn to_expression(&self) -> Expression {
        let args = self
            .arguments
            .iter()
            .map(|a| {
                RawArg::Expr(Expression::Value(crate::ast::expression::ValueExpr {
                    value: a.value.clone(),
                    ty: a.ty.clone(),
                }))
            })
            .collect();
        Expression::raw_query(self.sql.clone(), args)
    }
}

/// Input accepted by [`SqlWriter::prepare`].
pub enum PrepareInput {
    /// A raw SQL string, promoted to a `Raw` expression.
    Sql(String),
    /// An expression tree.
    Expression(Expression),
    /// An already-prepared statement, returned as-is.
    Prepared(SqlString),
}

impl From<&str> for PrepareInput {
    fn from(sql: &str) -> Self {
        Self::Sql(String::from(sql))
    }
}

impl From<String> for PrepareInput {
    fn from(sql: String) -> Self {
        Self::Sql(sql)
    }
}

impl From<Expression> for PrepareInput {
    fn from(expr: Expression) -> Self {
        Self::Expression(expr)
    }
}

impl From<SqlString> for PrepareInput {
    fn from(sql: SqlString) -> Self {
        Self::Prepared(sql)
    }
}

impl From<SelectQuery> for PrepareInput {
    fn from(q: SelectQuery) -> Self {
        Self::Expression(q.into())
    }
}

impl From<InsertQuery> for PrepareInput {
    fn from(q: InsertQuery) -> Self {
        Self::Expression(q.into())
    }
}

impl From<UpdateQuery> for PrepareInput {
    fn from(q: UpdateQuery) -> Self {
        Self::Expression(q.into())
    }
}

impl From<DeleteQuery> for PrepareInput {
    fn from(q: DeleteQuery) -> Self {
        Self::Expression(q.into())
    }
}

impl From<MergeQuery> for PrepareInput {
    fn from(q: MergeQuery) -> Self {
        Self::Expression(q.into())
    }
}

/// True for the variants that are wrapped when the caller enforces
/// parenthesization.
fn needs_parens(expr: &Expression) -> bool {
    matches!(
        expr,
        Expression::ConstantTable(_)
            | Expression::RawQuery(_)
            | Expression::Select(_)
            | Expression::Where(_)
    )
}

/// True when the alias adds nothing over the rendered fragment: empty,
/// numeric, or equal to the fragment itself.
fn alias_is_dropped(alias: &str, rendered: &str, escaped: &str) -> bool {
    alias.is_empty() || alias.parse::<f64>().is_ok() || alias == rendered || escaped == rendered
}

/// A writer renders expression trees into SQL for one dialect.
///
/// The default methods produce SQL-92/PostgreSQL-compatible output;
/// dialects override individual `format_*` hooks. Writers are cheap to
/// keep around and may be used from many threads at once, since every
/// render builds its own [`WriterContext`].
pub trait SqlWriter: Send + Sync {
    /// The shared writer state.
    fn core(&self) -> &WriterCore;

    /// Whether the dialect supports `filter (where ...)` on aggregates.
    /// When false, filters are rewritten into CASE expressions.
    fn supports_filter_clause(&self) -> bool {
        true
    }

    /// The dialect's current-timestamp expression.
    fn format_current_timestamp(&self) -> String {
        String::from("current_timestamp")
    }

    /// The dialect's random function.
    fn format_random(&self) -> String {
        String::from("random()")
    }

    /// The token emitted for an INSERT without columns over a constant
    /// table source.
    fn insert_default_values(&self) -> String {
        String::from("default values")
    }

    /// Maps a cast target type into the dialect's spelling.
    fn cast_type(&self, ty: &str) -> String {
        String::from(ty)
    }

    /// Renders one row of a constant table.
    fn format_constant_table_row(
        &self,
        row: &RowExpr,
        ctx: &mut WriterContext<'_>,
    ) -> Result<String> {
        self.format_row(row, ctx, false)
    }

    /// Renders the LIMIT/OFFSET clause; `0` means the part is absent,
    /// and `None` means no clause at all.
    fn format_limit_offset(&self, limit: u64, offset: u64) -> Option<String> {
        match (limit, offset) {
            (0, 0) => None,
            (l, 0) => Some(format!("limit {l}")),
            (0, o) => Some(format!("offset {o}")),
            (l, o) => Some(format!("limit {l} offset {o}")),
        }
    }

    /// Renders string concatenation.
    fn format_concat(&self, parts: &[Expression], ctx: &mut WriterContext<'_>) -> Result<String> {
        let rendered: Vec<String> = parts
            .iter()
            .map(|p| self.format(p, ctx, true))
            .collect::<Result<_>>()?;
        Ok(rendered.join(" || "))
    }

    /// Prepares an input into rendered SQL plus bound arguments.
    fn prepare(&self, input: PrepareInput) -> Result<SqlString> {
        match input {
            PrepareInput::Prepared(sql) => Ok(sql),
            PrepareInput::Sql(text) => self.prepare_expression(&Expression::raw(text, vec![])),
            PrepareInput::Expression(expr) => self.prepare_expression(&expr),
        }
    }

    /// Renders one expression tree with a fresh context.
    fn prepare_expression(&self, expr: &Expression) -> Result<SqlString> {
        let mut ctx = WriterContext::new(self.core().converter());
        let sql = self.format(expr, &mut ctx, false)?;
        let (identifier, options) = match expr {
            Expression::Select(q) => (q.identifier.clone(), q.options.clone()),
            Expression::Insert(q) => (q.identifier.clone(), q.options.clone()),
            Expression::Update(q) => (q.identifier.clone(), q.options.clone()),
            Expression::Delete(q) => (q.identifier.clone(), q.options.clone()),
            Expression::Merge(q) => (q.identifier.clone(), q.options.clone()),
            _ => (None, QueryOptions::default()),
        };
        debug!(
            kind = expr.kind(),
            arguments = ctx.args.len(),
            "prepared statement"
        );
        Ok(SqlString {
            sql,
            arguments: ctx.into_arguments(),
            identifier,
            options,
        })
    }

    /// Renders one expression. With `enforce_parens`, constant tables,
    /// raw queries, selects and condition groups are wrapped.
    fn format(
        &self,
        expr: &Expression,
        ctx: &mut WriterContext<'_>,
        enforce_parens: bool,
    ) -> Result<String> {
        let sql = match expr {
            Expression::Null => String::from("null"),
            Expression::Value(v) => {
                let index = ctx.bind(v.value.clone(), v.ty.clone());
                self.core().escaper().write_placeholder(index)
            }
            Expression::Row(row) => self.format_row(row, ctx, false)?,
            Expression::Array(array) => self.format_array(array, ctx)?,
            Expression::Identifier(name) | Expression::Table(name) => self.format_name(name),
            Expression::Column(name) => self.format_column(name),
            Expression::Raw(raw) | Expression::RawQuery(raw) => self.format_raw(raw, ctx)?,
            Expression::Aliased(aliased) => self.format_aliased(aliased, ctx)?,
            Expression::Comparison(cmp) => self.format_comparison(cmp, ctx)?,
            Expression::Between(between) => self.format_between(between, ctx)?,
            Expression::Not(inner) => format!("not ({})", self.format(inner, ctx, false)?),
            Expression::CaseWhen(case) => self.format_case_when(case, ctx)?,
            Expression::IfThen(arm) => {
                self.format_case_when(&arm.as_ref().clone().into_case_when(), ctx)?
            }
            Expression::Concat(parts) => self.format_concat(parts, ctx)?,
            Expression::Cast(cast) => self.format_cast(cast, ctx)?,
            Expression::FunctionCall(call) => self.format_function_call(call, ctx)?,
            Expression::Aggregate(aggregate) => self.format_aggregate(aggregate, ctx)?,
            Expression::Window(window) => {
                format!("({})", self.format_window_body(window, ctx)?)
            }
            Expression::CurrentTimestamp => self.format_current_timestamp(),
            Expression::Random => self.format_random(),
            Expression::RandomInt(range) => self.format_random_int(range),
            Expression::LikePattern(p) => self.format_pattern(
                p.column.as_deref(),
                p.value.as_deref(),
                &p.pattern,
                p.reserved.as_deref(),
                "like",
                ctx,
            )?,
            Expression::SimilarToPattern(p) => {
                let operator = if p.regex {
                    if p.case_sensitive {
                        "~"
                    } else {
                        "~*"
                    }
                } else {
                    "similar to"
                };
                self.format_pattern(
                    p.column.as_deref(),
                    p.value.as_deref(),
                    &p.pattern,
                    p.reserved.as_deref(),
                    operator,
                    ctx,
                )?
            }
            Expression::ConstantTable(table) => self.format_constant_table(table, ctx)?,
            Expression::Where(where_) => self.format_where(where_, ctx)?,
            Expression::Select(query) => self.format_select(query, ctx)?,
            Expression::Insert(query) => self.format_insert(query, ctx)?,
            Expression::Update(query) => self.format_update(query, ctx)?,
            Expression::Delete(query) => self.format_delete(query, ctx)?,
            Expression::Merge(query) => self.format_merge(query, ctx)?,
            Expression::Custom(custom) => (custom.render)(ctx)?,
        };

        if enforce_parens && needs_parens(expr) {
            Ok(format!("({sql})"))
        } else {
            Ok(sql)
        }
    }

    /// Renders an identifier or table name with its namespace.
    fn format_name(&self, name: &Name) -> String {
        let escaper = self.core().escaper();
        match &name.namespace {
            Some(ns) => format!(
                "{}.{}",
                escaper.escape_identifier(ns),
                escaper.escape_identifier(&name.name)
            ),
            None => escaper.escape_identifier(&name.name),
        }
    }

    /// Renders a column reference; a literal `*` stays unquoted.
    fn format_column(&self, name: &Name) -> String {
        let escaper = self.core().escaper();
        let column = if name.name == "*" {
            String::from("*")
        } else {
            escaper.escape_identifier(&name.name)
        };
        match &name.namespace {
            Some(ns) => format!("{}.{column}", escaper.escape_identifier(ns)),
            None => column,
        }
    }

    /// Renders a row; `keyword` prefixes the SQL `row` keyword, required
    /// in projections and casts.
    fn format_row(
        &self,
        row: &RowExpr,
        ctx: &mut WriterContext<'_>,
        keyword: bool,
    ) -> Result<String> {
        let values: Vec<String> = row
            .values
            .iter()
            .map(|v| self.format(v, ctx, true))
            .collect::<Result<_>>()?;
        let list = values.join(", ");
        Ok(match &row.cast_to {
            Some(ty) => format!("cast(row({list}) as {})", self.cast_type(ty)),
            None if keyword => format!("row({list})"),
            None => format!("({list})"),
        })
    }

    /// Renders an `array[...]` literal.
    fn format_array(&self, array: &ArrayExpr, ctx: &mut WriterContext<'_>) -> Result<String> {
        let values: Vec<String> = array
            .values
            .iter()
            .map(|v| self.format(v, ctx, true))
            .collect::<Result<_>>()?;
        let literal = format!("array[{}]", values.join(", "));
        Ok(if array.cast {
            format!(
                "cast({literal} as {}[])",
                self.cast_type(&array.element_type)
            )
        } else {
            literal
        })
    }

    /// Rewrites a raw template, resolving placeholders through the
    /// converter.
    fn format_raw(&self, raw: &RawExpr, ctx: &mut WriterContext<'_>) -> Result<String> {
        let core = self.core();
        core.placeholders()
            .rewrite(&raw.template, &raw.args, ctx, &mut |arg, hint, ctx| {
                let expr = core.converter().to_expression(arg, hint)?;
                self.format(&expr, ctx, false)
            })
    }

    /// Renders an aliased expression, applying the alias drop rules.
    fn format_aliased(&self, aliased: &AliasedExpr, ctx: &mut WriterContext<'_>) -> Result<String> {
        let rendered = self.format(&aliased.inner, ctx, true)?;
        let escaper = self.core().escaper();
        let escaped = escaper.escape_identifier(&aliased.alias);
        if alias_is_dropped(&aliased.alias, &rendered, &escaped) {
            return Ok(rendered);
        }
        let mut out = format!("{rendered} as {escaped}");
        if let Expression::ConstantTable(table) = aliased.inner.as_ref() {
            if !table.columns.is_empty() {
                out.push_str(&format!(
                    " ({})",
                    escaper.escape_identifier_list(&table.columns)
                ));
            }
        }
        Ok(out)
    }

    /// Renders a comparison; missing parts are omitted.
    fn format_comparison(
        &self,
        cmp: &ComparisonExpr,
        ctx: &mut WriterContext<'_>,
    ) -> Result<String> {
        let mut parts = Vec::with_capacity(3);
        if let Some(left) = &cmp.left {
            parts.push(self.format(left, ctx, true)?);
        }
        if let Some(operator) = &cmp.operator {
            parts.push(operator.clone());
        }
        if let Some(right) = &cmp.right {
            parts.push(self.format(right, ctx, true)?);
        }
        Ok(parts.join(" "))
    }

    /// Renders `column between from and to`.
    fn format_between(&self, between: &BetweenExpr, ctx: &mut WriterContext<'_>) -> Result<String> {
        Ok(format!(
            "{} between {} and {}",
            self.format(&between.column, ctx, true)?,
            self.format(&between.from, ctx, true)?,
            self.format(&between.to, ctx, true)?
        ))
    }

    /// Renders a CASE expression; with no arms it degenerates to the
    /// else expression.
    fn format_case_when(&self, case: &CaseWhenExpr, ctx: &mut WriterContext<'_>) -> Result<String> {
        if case.cases.is_empty() {
            return match &case.else_ {
                Some(else_) => self.format(else_, ctx, false),
                None => Ok(String::from("null")),
            };
        }
        let mut out = String::from("CASE");
        for arm in &case.cases {
            out.push_str(" WHEN ");
            out.push_str(&self.format(&arm.condition, ctx, false)?);
            out.push_str(" THEN ");
            out.push_str(&self.format(&arm.then, ctx, false)?);
        }
        if let Some(else_) = &case.else_ {
            out.push_str(" ELSE ");
            out.push_str(&self.format(else_, ctx, false)?);
        }
        out.push_str(" END");
        Ok(out)
    }

    /// Renders a cast; row operands keep the `row` keyword.
    fn format_cast(&self, cast: &CastExpr, ctx: &mut WriterContext<'_>) -> Result<String> {
        let inner = match cast.inner.as_ref() {
            Expression::Row(row) => self.format_row(row, ctx, true)?,
            other => self.format(other, ctx, true)?,
        };
        Ok(format!("cast({inner} as {})", self.cast_type(&cast.ty)))
    }

    /// Renders a plain function call. The name is identifier-escaped
    /// only when it is not a plain word.
    fn format_function_call(
        &self,
        call: &FunctionCallExpr,
        ctx: &mut WriterContext<'_>,
    ) -> Result<String> {
        if call.function.is_empty() {
            return Err(QueryBuilderError::MissingFunctionName);
        }
        let plain = call
            .function
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
        let name = if plain {
            call.function.clone()
        } else {
            self.core().escaper().escape_identifier(&call.function)
        };
        let args: Vec<String> = call
            .args
            .iter()
            .map(|a| self.format(a, ctx, true))
            .collect::<Result<_>>()?;
        Ok(format!("{name}({})", args.join(", ")))
    }

    /// Renders an aggregate call. On dialects without FILTER support the
    /// filter condition is folded into a CASE around the operand; an
    /// absent operand becomes `*` natively and `1` under the fallback.
    fn format_aggregate(
        &self,
        aggregate: &AggregateExpr,
        ctx: &mut WriterContext<'_>,
    ) -> Result<String> {
        if aggregate.function.is_empty() {
            return Err(QueryBuilderError::MissingFunctionName);
        }
        let escaper = self.core().escaper();
        let name = escaper.escape_identifier(&aggregate.function);

        let filtered = aggregate.filter.as_ref().filter(|f| !f.is_empty());
        let mut out = match filtered {
            Some(filter) if !self.supports_filter_clause() => {
                let operand = match aggregate.column.as_deref() {
                    None => String::from("1"),
                    Some(Expression::Column(col)) => {
                        let name = escaper.escape_identifier(&col.name);
                        match &col.namespace {
                            Some(ns) => format!("{}.{name}", escaper.escape_identifier(ns)),
                            None => name,
                        }
                    }
                    Some(other) => self.format(other, ctx, true)?,
                };
                let condition = self.format_where(filter, ctx)?;
                format!("{name}(CASE WHEN {condition} THEN {operand} END)")
            }
            _ => {
                let operand = match aggregate.column.as_deref() {
                    None => String::from("*"),
                    Some(column) => self.format(column, ctx, true)?,
                };
                let mut base = format!("{name}({operand})");
                if let Some(filter) = filtered {
                    base.push_str(&format!(
                        " filter (where {})",
                        self.format_where(filter, ctx)?
                    ));
                }
                base
            }
        };

        match &aggregate.over {
            Some(OverClause::Named(window)) => {
                out.push_str(&format!(" over {}", escaper.escape_identifier(window)));
            }
            Some(OverClause::Window(window)) => {
                out.push_str(&format!(" over ({})", self.format_window_body(window, ctx)?));
            }
            None => {}
        }
        Ok(out)
    }

    /// Renders the body of a window specification.
    fn format_window_body(
        &self,
        window: &WindowExpr,
        ctx: &mut WriterContext<'_>,
    ) -> Result<String> {
        let mut parts = Vec::new();
        if !window.partition_by.is_empty() {
            let columns: Vec<String> = window
                .partition_by
                .iter()
                .map(|c| self.format(c, ctx, true))
                .collect::<Result<_>>()?;
            parts.push(format!("partition by {}", columns.join(", ")));
        }
        if !window.order_by.is_empty() {
            let items: Vec<String> = window
                .order_by
                .iter()
                .map(|o| self.format_order_by(o, ctx))
                .collect::<Result<_>>()?;
            parts.push(format!("order by {}", items.join(", ")));
        }
        Ok(parts.join(" "))
    }

    /// Renders `floor(random() * (max - min + 1) + min)` with an
    /// explicit cast on the upper bound.
    fn format_random_int(&self, range: &RandomIntExpr) -> String {
        format!(
            "floor({} * (cast({} as bigint) - {} + 1) + {})",
            self.format_random(),
            range.max,
            range.min,
            range.min
        )
    }

    /// Renders a LIKE-family comparison: the value is LIKE-escaped,
    /// substituted into the pattern template, and bound as an argument.
    fn format_pattern(
        &self,
        column: Option<&Expression>,
        value: Option<&str>,
        pattern: &str,
        reserved: Option<&[char]>,
        operator: &str,
        ctx: &mut WriterContext<'_>,
    ) -> Result<String> {
        let column_sql = match column {
            Some(column) => Some(self.format(column, ctx, true)?),
            None => None,
        };
        let composed = match value {
            Some(value) => pattern.replace("{}", &self.core().escaper().escape_like(value, reserved)),
            None => String::from(pattern),
        };
        let index = ctx.bind(SqlValue::Text(composed), None);
        let placeholder = self.core().escaper().write_placeholder(index);
        Ok(match column_sql {
            Some(column) => format!("{column} {operator} {placeholder}"),
            None => placeholder,
        })
    }

    /// Renders a `values (...), (...)` table.
    fn format_constant_table(
        &self,
        table: &ConstantTableExpr,
        ctx: &mut WriterContext<'_>,
    ) -> Result<String> {
        let rows: Vec<String> = table
            .rows
            .iter()
            .map(|r| self.format_constant_table_row(r, ctx))
            .collect::<Result<_>>()?;
        Ok(format!("values {}", rows.join("\n,")))
    }

    /// Renders a condition group; an empty group renders `1`.
    fn format_where(&self, where_: &WhereExpr, ctx: &mut WriterContext<'_>) -> Result<String> {
        let mut parts = Vec::new();
        for condition in &where_.conditions {
            if let Expression::Where(nested) = condition {
                if nested.is_empty() {
                    continue;
                }
            }
            parts.push(self.format(condition, ctx, true)?);
        }
        if parts.is_empty() {
            return Ok(String::from("1"));
        }
        Ok(parts.join(&format!(" {} ", where_.operator.as_str())))
    }

    /// Renders one projection item, keeping the `row` keyword and
    /// applying the alias drop rules.
    fn format_select_column(
        &self,
        column: &SelectColumn,
        ctx: &mut WriterContext<'_>,
    ) -> Result<String> {
        let rendered = match &column.expression {
            Expression::Row(row) => self.format_row(row, ctx, true)?,
            other => self.format(other, ctx, true)?,
        };
        let Some(alias) = &column.alias else {
            return Ok(rendered);
        };
        let escaped = self.core().escaper().escape_identifier(alias);
        if alias_is_dropped(alias, &rendered, &escaped) {
            return Ok(rendered);
        }
        Ok(format!("{rendered} as {escaped}"))
    }

    /// Renders the WITH clause line, or nothing without CTEs.
    fn format_with(
        &self,
        clauses: &[WithClause],
        ctx: &mut WriterContext<'_>,
    ) -> Result<Option<String>> {
        if clauses.is_empty() {
            return Ok(None);
        }
        let escaper = self.core().escaper();
        let mut items = Vec::with_capacity(clauses.len());
        for clause in clauses {
            let alias = escaper.escape_identifier(&clause.alias);
            let head = match &clause.expression {
                Expression::ConstantTable(table) if !table.columns.is_empty() => {
                    format!("{alias} ({})", escaper.escape_identifier_list(&table.columns))
                }
                _ => alias,
            };
            let body = self.format(&clause.expression, ctx, false)?;
            items.push(format!("{head} as ({body})"));
        }
        Ok(Some(format!("with {}", items.join(", "))))
    }

    /// Renders one JOIN clause; an empty condition renders `cross join`.
    fn format_join(&self, join: &JoinClause, ctx: &mut WriterContext<'_>) -> Result<String> {
        let table = self.format(&join.table, ctx, true)?;
        if join.mode == JoinMode::Natural {
            return Ok(format!("natural join {table}"));
        }
        if join.condition.is_empty() {
            return Ok(format!("cross join {table}"));
        }
        Ok(format!(
            "{} {table} on {}",
            join.mode.as_str(),
            self.format_where(&join.condition, ctx)?
        ))
    }

    /// Renders one ORDER BY item; the direction is always explicit.
    fn format_order_by(&self, item: &OrderByClause, ctx: &mut WriterContext<'_>) -> Result<String> {
        let mut out = format!(
            "{} {}",
            self.format(&item.column, ctx, true)?,
            item.order.as_str()
        );
        match item.nulls {
            NullOrder::Default => {}
            NullOrder::First => out.push_str(" nulls first"),
            NullOrder::Last => out.push_str(" nulls last"),
        }
        Ok(out)
    }

    /// Renders the RETURNING line, or nothing.
    fn format_returning(
        &self,
        returning: &[Expression],
        ctx: &mut WriterContext<'_>,
    ) -> Result<Option<String>> {
        if returning.is_empty() {
            return Ok(None);
        }
        let items: Vec<String> = returning
            .iter()
            .map(|e| self.format(e, ctx, true))
            .collect::<Result<_>>()?;
        Ok(Some(format!("returning {}", items.join(", "))))
    }

    /// Renders a SELECT statement.
    fn format_select(&self, query: &SelectQuery, ctx: &mut WriterContext<'_>) -> Result<String> {
        let mut lines = Vec::new();
        if let Some(with) = self.format_with(&query.with, ctx)? {
            lines.push(with);
        }

        let projection = if query.columns.is_empty() {
            String::from("*")
        } else {
            let columns: Vec<String> = query
                .columns
                .iter()
                .map(|c| self.format_select_column(c, ctx))
                .collect::<Result<_>>()?;
            columns.join(", ")
        };
        lines.push(if query.distinct {
            format!("select distinct {projection}")
        } else {
            format!("select {projection}")
        });

        if !query.from.is_empty() {
            let tables: Vec<String> = query
                .from
                .iter()
                .map(|t| self.format(t, ctx, true))
                .collect::<Result<_>>()?;
            lines.push(format!("from {}", tables.join(", ")));
        }

        for join in &query.joins {
            lines.push(self.format_join(join, ctx)?);
        }

        if !query.where_.is_empty() {
            lines.push(format!("where {}", self.format_where(&query.where_, ctx)?));
        }

        if !query.group_by.is_empty() {
            let columns: Vec<String> = query
                .group_by
                .iter()
                .map(|c| self.format(c, ctx, true))
                .collect::<Result<_>>()?;
            lines.push(format!("group by {}", columns.join(", ")));
        }

        if !query.having.is_empty() {
            lines.push(format!("having {}", self.format_where(&query.having, ctx)?));
        }

        let named: Vec<&WindowExpr> = query.windows.iter().filter(|w| w.name.is_some()).collect();
        if !named.is_empty() {
            let escaper = self.core().escaper();
            let mut items = Vec::with_capacity(named.len());
            for window in named {
                let name = window.name.as_deref().unwrap_or_default();
                items.push(format!(
                    "{} as ({})",
                    escaper.escape_identifier(name),
                    self.format_window_body(window, ctx)?
                ));
            }
            lines.push(format!("window {}", items.join(", ")));
        }

        if !query.order_by.is_empty() {
            let items: Vec<String> = query
                .order_by
                .iter()
                .map(|o| self.format_order_by(o, ctx))
                .collect::<Result<_>>()?;
            lines.push(format!("order by {}", items.join(", ")));
        }

        if let Some(range) = self.format_limit_offset(query.limit, query.offset) {
            lines.push(range);
        }

        for union in &query.unions {
            let arm = self.format(&union.expression, ctx, true)?;
            lines.push(if union.all {
                format!("union all {arm}")
            } else {
                format!("union {arm}")
            });
        }

        if query.for_update {
            lines.push(String::from("for update"));
        }

        Ok(lines.join("\n"))
    }

    /// Renders an INSERT statement.
    fn format_insert(&self, query: &InsertQuery, ctx: &mut WriterContext<'_>) -> Result<String> {
        let table = query
            .table
            .as_ref()
            .ok_or(QueryBuilderError::MissingTable("insert"))?;

        let mut lines = Vec::new();
        if let Some(with) = self.format_with(&query.with, ctx)? {
            lines.push(with);
        }
        lines.push(format!("insert into {}", self.format_name(table)));

        if query.columns.is_empty() {
            match &query.values {
                Some(Expression::ConstantTable(_)) | None => {
                    lines.push(self.insert_default_values());
                }
                Some(source) => lines.push(self.format(source, ctx, false)?),
            }
        } else {
            let escaper = self.core().escaper();
            let columns: Vec<String> = query
                .columns
                .iter()
                .map(|c| escaper.escape_identifier(&c.name))
                .collect();
            lines.push(format!("({})", columns.join(", ")));
            let source = query
                .values
                .as_ref()
                .ok_or(QueryBuilderError::MissingValues)?;
            lines.push(self.format(source, ctx, false)?);
        }

        if let Some(returning) = self.format_returning(&query.returning, ctx)? {
            lines.push(returning);
        }
        Ok(lines.join("\n"))
    }

    /// Renders an UPDATE statement. The first join is promoted into the
    /// FROM list and its condition appended to the WHERE clause.
    fn format_update(&self, query: &UpdateQuery, ctx: &mut WriterContext<'_>) -> Result<String> {
        use crate::ast::statement::SetValue;

        let table = query
            .table
            .as_ref()
            .ok_or(QueryBuilderError::MissingTable("update"))?;
        if query.set.is_empty() {
            return Err(QueryBuilderError::EmptySet);
        }

        let (from_extra, promoted_condition, rest_joins) =
            promote_first_join(&query.joins, "update")?;

        let mut lines = Vec::new();
        if let Some(with) = self.format_with(&query.with, ctx)? {
            lines.push(with);
        }
        lines.push(format!("update {}", self.format_name(table)));

        let mut assignments = Vec::with_capacity(query.set.len());
        for (column, value) in &query.set {
            let column_sql = self.core().escaper().escape_identifier(&column.name);
            let value_sql = match value {
                SetValue::Literal(literal) => self.core().escaper().escape_literal(literal),
                SetValue::Expr(expr) => match expr {
                    Expression::Null | Expression::Value(_) | Expression::Column(_) => {
                        self.format(expr, ctx, false)?
                    }
                    other => format!("({})", self.format(other, ctx, false)?),
                },
            };
            assignments.push(format!("{column_sql} = {value_sql}"));
        }
        lines.push(format!("set {}", assignments.join(", ")));

        let mut from_items: Vec<String> = query
            .from
            .iter()
            .map(|t| self.format(t, ctx, true))
            .collect::<Result<_>>()?;
        if let Some(promoted) = from_extra {
            from_items.push(self.format(promoted, ctx, true)?);
        }
        if !from_items.is_empty() {
            lines.push(format!("from {}", from_items.join(", ")));
        }

        for join in rest_joins {
            lines.push(self.format_join(join, ctx)?);
        }

        let where_ = merge_where(&query.where_, promoted_condition);
        if !where_.is_empty() {
            lines.push(format!("where {}", self.format_where(&where_, ctx)?));
        }

        if let Some(returning) = self.format_returning(&query.returning, ctx)? {
            lines.push(returning);
        }
        Ok(lines.join("\n"))
    }

    /// Renders a DELETE statement. The first join is promoted into the
    /// USING list and its condition appended to the WHERE clause.
    fn format_delete(&self, query: &DeleteQuery, ctx: &mut WriterContext<'_>) -> Result<String> {
        let table = query
            .table
            .as_ref()
            .ok_or(QueryBuilderError::MissingTable("delete"))?;

        let (using_extra, promoted_condition, rest_joins) =
            promote_first_join(&query.joins, "delete")?;

        let mut lines = Vec::new();
        if let Some(with) = self.format_with(&query.with, ctx)? {
            lines.push(with);
        }
        lines.push(format!("delete from {}", self.format_name(table)));

        let mut using_items: Vec<String> = query
            .using
            .iter()
            .map(|t| self.format(t, ctx, true))
            .collect::<Result<_>>()?;
        if let Some(promoted) = using_extra {
            using_items.push(self.format(promoted, ctx, true)?);
        }
        if !using_items.is_empty() {
            lines.push(format!("using {}", using_items.join(", ")));
        }

        for join in rest_joins {
            lines.push(self.format_join(join, ctx)?);
        }

        let where_ = merge_where(&query.where_, promoted_condition);
        if !where_.is_empty() {
            lines.push(format!("where {}", self.format_where(&where_, ctx)?));
        }

        if let Some(returning) = self.format_returning(&query.returning, ctx)? {
            lines.push(returning);
        }
        Ok(lines.join("\n"))
    }

    /// Renders a MERGE statement.
    fn format_merge(&self, query: &MergeQuery, ctx: &mut WriterContext<'_>) -> Result<String> {
        let table = query
            .table
            .as_ref()
            .ok_or(QueryBuilderError::MissingTable("merge"))?;
        let using = query.using.as_ref().ok_or(QueryBuilderError::MissingUsing)?;
        if query.on_columns.is_empty() {
            return Err(QueryBuilderError::EmptyMergeKeys);
        }

        let escaper = self.core().escaper();
        let table_ident = escaper.escape_identifier(&table.name);
        let alias = escaper.escape_identifier(&query.using_alias);

        let mut lines = Vec::new();
        if let Some(with) = self.format_with(&query.with, ctx)? {
            lines.push(with);
        }
        lines.push(format!("merge into {}", self.format_name(table)));

        let mut using_line = format!("using {} as {alias}", self.format(using, ctx, true)?);
        let source_columns = match using {
            Expression::ConstantTable(t) => t.columns.clone(),
            _ => Vec::new(),
        };
        if !source_columns.is_empty() {
            using_line.push_str(&format!(
                " ({})",
                escaper.escape_identifier_list(&source_columns)
            ));
        }
        lines.push(using_line);

        let on: Vec<String> = query
            .on_columns
            .iter()
            .map(|key| {
                let key = escaper.escape_identifier(key);
                format!("{table_ident}.{key} = {alias}.{key}")
            })
            .collect();
        lines.push(format!("on {}", on.join(" and ")));

        let columns: &[String] = if !query.columns.is_empty() {
            &query.columns
        } else if !source_columns.is_empty() {
            &source_columns
        } else {
            &query.on_columns
        };

        if query.conflict == MergeConflict::Update {
            let assignments: Vec<String> = columns
                .iter()
                .filter(|c| !query.on_columns.contains(c))
                .map(|c| {
                    let c = escaper.escape_identifier(c);
                    format!("{c} = {alias}.{c}")
                })
                .collect();
            if !assignments.is_empty() {
                lines.push(String::from("when matched then"));
                lines.push(format!("update set {}", assignments.join(", ")));
            }
        }

        let insert_columns: Vec<String> =
            columns.iter().map(|c| escaper.escape_identifier(c)).collect();
        let insert_values: Vec<String> = insert_columns
            .iter()
            .map(|c| format!("{alias}.{c}"))
            .collect();
        lines.push(String::from("when not matched then"));
        lines.push(format!(
            "insert ({}) values ({})",
            insert_columns.join(", "),
            insert_values.join(", ")
        ));

        Ok(lines.join("\n"))
    }
}

/// Splits off the first join for promotion into the leading FROM/USING
/// table of an UPDATE or DELETE. Only INNER and NATURAL joins qualify.
fn promote_first_join<'a>(
    joins: &'a [JoinClause],
    statement: &'static str,
) -> Result<(Option<&'a Expression>, Option<&'a WhereExpr>, &'a [JoinClause])> {
    match joins.split_first() {
        None => Ok((None, None, joins)),
        Some((first, rest)) => {
            if !first.mode.is_promotable() {
                return Err(QueryBuilderError::IllegalJoinPromotion {
                    mode: first.mode.as_str(),
                    statement,
                });
            }
            let condition = (!first.condition.is_empty()).then_some(&first.condition);
            Ok((Some(&first.table), condition, rest))
        }
    }
}

/// Appends a promoted join condition to a WHERE clause. Conditions with
/// a compatible connective are spliced in directly so simple promotions
/// do not grow parentheses.
fn merge_where(base: &WhereExpr, promoted: Option<&WhereExpr>) -> WhereExpr {
    let Some(condition) = promoted else {
        return base.clone();
    };
    let mut merged = base.clone();
    if condition.operator == merged.operator || condition.conditions.len() == 1 {
        merged.conditions.extend(condition.conditions.iter().cloned());
    } else {
        merged.push(Expression::Where(condition.clone()));
    }
    merged
}
