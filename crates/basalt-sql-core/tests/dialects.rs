//! Dialect-specific rendering divergences.

mod common;

use std::sync::Arc;

use basalt_sql_core::ast::{AggregateExpr, Expression, LikePatternExpr, WhereExpr};
use basalt_sql_core::convert::Converter;
use basalt_sql_core::{
    insert, select, MysqlWriter, Platform, SqlValue, SqlWriter, StandardWriter,
};

use common::{prepare, prepare_with, values};

fn simple_query() -> basalt_sql_core::SelectQuery {
    select()
        .column(Expression::column("id"))
        .from(Expression::table("users"))
        .where_clause(Expression::column("id").eq(Expression::value(7)))
}

#[test]
fn test_platform_writer_selection() {
    let cases = [
        (
            "postgresql",
            "select \"id\"\nfrom \"users\"\nwhere \"id\" = $1",
        ),
        ("mysql", "select `id`\nfrom `users`\nwhere `id` = ?"),
        ("mariadb", "select `id`\nfrom `users`\nwhere `id` = ?"),
        ("sqlite", "select \"id\"\nfrom \"users\"\nwhere \"id\" = ?"),
        ("sqlserver", "select [id]\nfrom [users]\nwhere [id] = @p1"),
    ];

    for (tag, expected) in cases {
        let writer = tag.parse::<Platform>().unwrap().writer(Arc::new(Converter::new()));
        let prepared = prepare_with(writer.as_ref(), simple_query());
        assert_eq!(prepared.sql, expected, "platform {tag}");
        assert_eq!(values(&prepared), vec![SqlValue::Int(7)], "platform {tag}");
    }
}

#[test]
fn test_postgres_numbers_placeholders_in_order() {
    let writer = Platform::Postgres.writer(Arc::new(Converter::new()));
    let prepared = prepare_with(
        writer.as_ref(),
        select()
            .from(Expression::table("t"))
            .where_clause(Expression::column("a").eq(Expression::value(1)))
            .where_clause(Expression::column("b").eq(Expression::value(2))),
    );
    assert!(prepared.sql.contains("\"a\" = $1 and \"b\" = $2"));
}

#[test]
fn test_mysql_constant_table_rows_use_row_keyword() {
    let prepared = prepare_with(
        &MysqlWriter::default(),
        insert("t").columns(["a", "b"]).rows(vec![
            vec![Expression::value(1), Expression::value(2)],
            vec![Expression::value(3), Expression::value(4)],
        ]),
    );

    assert_eq!(
        prepared.sql,
        "insert into `t`\n(`a`, `b`)\nvalues row(?, ?)\n,row(?, ?)"
    );
}

#[test]
fn test_mysql_empty_insert_token() {
    let prepared = prepare_with(&MysqlWriter::default(), insert("t"));
    assert_eq!(prepared.sql, "insert into `t`\n() values ()");
}

#[test]
fn test_concat_rendering() {
    let concat = Expression::Concat(vec![
        Expression::column("first"),
        Expression::column("last"),
    ]);

    let prepared = prepare(select().column(concat.clone()));
    assert_eq!(prepared.sql, "select \"first\" || \"last\"");

    let prepared = prepare_with(&MysqlWriter::default(), select().column(concat));
    assert_eq!(prepared.sql, "select concat(`first`, `last`)");
}

#[test]
fn test_current_timestamp_and_random() {
    let query = || {
        select()
            .column(Expression::CurrentTimestamp)
            .column(Expression::Random)
    };

    assert_eq!(prepare(query()).sql, "select current_timestamp, random()");
    assert_eq!(
        prepare_with(&MysqlWriter::default(), query()).sql,
        "select now(), rand()"
    );
}

#[test]
fn test_random_int_casts_upper_bound() {
    let prepared = prepare(select().column(Expression::RandomInt(
        basalt_sql_core::ast::RandomIntExpr::new(1, 6),
    )));
    assert_eq!(
        prepared.sql,
        "select floor(random() * (cast(6 as bigint) - 1 + 1) + 1)"
    );
}

#[test]
fn test_mysql_aggregate_filter_falls_back_to_case() {
    let mut filter = WhereExpr::new();
    filter.push(Expression::column("a").gt(Expression::value(0)));

    let prepared = prepare_with(
        &MysqlWriter::default(),
        select().column(Expression::Aggregate(AggregateExpr {
            function: String::from("sum"),
            column: Some(Box::new(Expression::column("x"))),
            filter: Some(filter),
            over: None,
        })),
    );

    assert_eq!(prepared.sql, "select `sum`(CASE WHEN `a` > ? THEN `x` END)");
}

#[test]
fn test_mysql_cast_types() {
    let prepared = prepare_with(
        &MysqlWriter::default(),
        select().column(Expression::column("a").cast("int")),
    );
    assert_eq!(prepared.sql, "select cast(`a` as signed)");

    let prepared = prepare(select().column(Expression::column("a").cast("int")));
    assert_eq!(prepared.sql, "select cast(\"a\" as int)");
}

#[test]
fn test_mysql_offset_without_limit() {
    let prepared = prepare_with(
        &MysqlWriter::default(),
        select().from(Expression::table("t")).range(0, 5),
    );
    assert!(prepared
        .sql
        .ends_with("limit 18446744073709551615 offset 5"));
}

#[test]
fn test_mssql_paging() {
    let writer = Platform::SqlServer.writer(Arc::new(Converter::new()));
    let prepared = prepare_with(
        writer.as_ref(),
        select().from(Expression::table("t")).range(10, 5),
    );
    assert!(prepared
        .sql
        .ends_with("offset 5 rows fetch next 10 rows only"));
}

#[test]
fn test_like_pattern_binds_composed_pattern() {
    let prepared = prepare(
        select()
            .from(Expression::table("files"))
            .where_clause(Expression::LikePattern(LikePatternExpr {
                column: Some(Box::new(Expression::column("name"))),
                value: Some(String::from("50%")),
                pattern: String::from("%{}%"),
                reserved: None,
            })),
    );

    assert_eq!(
        prepared.sql,
        "select *\nfrom \"files\"\nwhere \"name\" like ?"
    );
    assert_eq!(
        values(&prepared),
        vec![SqlValue::Text(String::from("%50\\%%"))]
    );
}

#[test]
fn test_identifier_safety_across_dialects() {
    for tag in ["postgresql", "mysql", "sqlite", "sqlserver"] {
        let writer = tag.parse::<Platform>().unwrap().writer(Arc::new(Converter::new()));
        let prepared = prepare_with(
            writer.as_ref(),
            select()
                .column(Expression::column("a"))
                .from(Expression::table("t")),
        );
        // Quoted per dialect: never a bare identifier.
        assert!(!prepared.sql.contains("select a\n"), "dialect {tag}");
        assert!(!prepared.sql.contains("from t"), "dialect {tag}");
    }
}

#[test]
fn test_column_star_stays_unquoted() {
    let prepared = prepare(
        select()
            .column(Expression::column("*"))
            .column(Expression::qualified_column("t", "*"))
            .from(Expression::table("t")),
    );
    assert_eq!(prepared.sql, "select *, \"t\".*\nfrom \"t\"");
}

#[test]
fn test_update_string_set_value_uses_dialect_literal_escaping() {
    let prepared = prepare_with(
        &MysqlWriter::default(),
        basalt_sql_core::update("t").set("a", "it's"),
    );
    assert_eq!(prepared.sql, "update `t`\nset `a` = 'it''s'");
}

#[test]
fn test_standard_writer_shares_one_converter() {
    let converter = Arc::new(Converter::new());
    let first = StandardWriter::new(Arc::clone(&converter));
    let second = StandardWriter::new(converter);

    let a = prepare_with(&first, simple_query());
    let b = prepare_with(&second, simple_query());
    assert_eq!(a.sql, b.sql);
}
