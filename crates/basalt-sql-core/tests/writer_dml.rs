//! INSERT / UPDATE / DELETE / MERGE rendering.

mod common;

use basalt_sql_core::ast::{ConstantTableExpr, Expression, JoinClause, RawArg};
use basalt_sql_core::ast::{InsertQuery, UpdateQuery};
use basalt_sql_core::{delete, insert, merge, select, update};
use basalt_sql_core::{QueryBuilderError, SqlValue, SqlWriter, StandardWriter};

use common::{prepare, values};

#[test]
fn test_insert_constant_table() {
    let prepared = prepare(
        insert("t").columns(["a", "b"]).rows(vec![
            vec![Expression::value(1), Expression::value(2)],
            vec![Expression::value(3), Expression::value(4)],
        ]),
    );

    assert_eq!(
        prepared.sql,
        "insert into \"t\"\n(\"a\", \"b\")\nvalues (?, ?)\n,(?, ?)"
    );
    assert_eq!(
        values(&prepared),
        vec![
            SqlValue::Int(1),
            SqlValue::Int(2),
            SqlValue::Int(3),
            SqlValue::Int(4)
        ]
    );
}

#[test]
fn test_insert_without_columns_uses_default_values() {
    let prepared = prepare(insert("t"));
    assert_eq!(prepared.sql, "insert into \"t\"\ndefault values");
}

#[test]
fn test_insert_from_select() {
    let source = select()
        .column(Expression::column("a"))
        .from(Expression::table("s"));
    let prepared = prepare(insert("t").columns(["a"]).values(source));

    assert_eq!(
        prepared.sql,
        "insert into \"t\"\n(\"a\")\nselect \"a\"\nfrom \"s\""
    );
}

#[test]
fn test_insert_returning() {
    let prepared = prepare(
        insert("t")
            .columns(["a"])
            .rows(vec![vec![Expression::value(1)]])
            .returning(Expression::column("id"))
            .returning(Expression::column("a")),
    );

    assert!(prepared.sql.ends_with("returning \"id\", \"a\""));
}

#[test]
fn test_insert_without_table_fails() {
    let err = StandardWriter::default()
        .prepare(InsertQuery::default().into())
        .unwrap_err();
    assert!(matches!(err, QueryBuilderError::MissingTable("insert")));
}

#[test]
fn test_update_with_raw_set_value() {
    let prepared = prepare(
        update("t")
            .set("x", Expression::raw("? + 1", vec![RawArg::from(5)]))
            .where_clause(Expression::column("id").eq(Expression::value(7))),
    );

    assert_eq!(
        prepared.sql,
        "update \"t\"\nset \"x\" = (? + 1)\nwhere \"id\" = ?"
    );
    assert_eq!(values(&prepared), vec![SqlValue::Int(5), SqlValue::Int(7)]);
}

#[test]
fn test_update_set_shapes() {
    let prepared = prepare(
        update("t")
            .set("a", Expression::value(2))
            .set("b", Expression::column("c"))
            .set("d", "frozen"),
    );

    assert_eq!(
        prepared.sql,
        "update \"t\"\nset \"a\" = ?, \"b\" = \"c\", \"d\" = 'frozen'"
    );
    assert_eq!(values(&prepared), vec![SqlValue::Int(2)]);
}

#[test]
fn test_update_literal_is_escaped() {
    let prepared = prepare(update("t").set("a", "it's"));
    assert_eq!(prepared.sql, "update \"t\"\nset \"a\" = 'it''s'");
}

#[test]
fn test_update_without_set_fails() {
    let err = StandardWriter::default()
        .prepare(
            UpdateQuery {
                table: Some(basalt_sql_core::ast::Name::new("t")),
                ..UpdateQuery::default()
            }
            .into(),
        )
        .unwrap_err();
    assert!(matches!(err, QueryBuilderError::EmptySet));
}

#[test]
fn test_update_first_join_is_promoted() {
    let prepared = prepare(
        update("t")
            .set("a", Expression::value(1))
            .join(JoinClause::inner(
                Expression::table("u"),
                Expression::qualified_column("t", "id")
                    .eq(Expression::qualified_column("u", "t_id")),
            ))
            .where_clause(Expression::column("a").gt(Expression::value(0))),
    );

    assert_eq!(
        prepared.sql,
        "update \"t\"\nset \"a\" = ?\nfrom \"u\"\nwhere \"a\" > ? and \"t\".\"id\" = \"u\".\"t_id\""
    );
    assert_eq!(values(&prepared), vec![SqlValue::Int(1), SqlValue::Int(0)]);
}

#[test]
fn test_update_promotion_rejects_outer_joins() {
    let err = StandardWriter::default()
        .prepare(
            update("t")
                .set("a", Expression::value(1))
                .join(JoinClause::left(
                    Expression::table("u"),
                    Expression::column("x").eq(Expression::column("y")),
                ))
                .into(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        QueryBuilderError::IllegalJoinPromotion {
            statement: "update",
            ..
        }
    ));
}

#[test]
fn test_delete_first_join_is_promoted_into_using() {
    let prepared = prepare(
        delete("t").join(JoinClause::inner(
            Expression::table("u"),
            Expression::column("t.id").eq(Expression::column("u.t_id")),
        )),
    );

    assert_eq!(
        prepared.sql,
        "delete from \"t\"\nusing \"u\"\nwhere \"t.id\" = \"u.t_id\""
    );
    assert!(prepared.arguments.is_empty());
}

#[test]
fn test_delete_remaining_joins_stay_joins() {
    let prepared = prepare(
        delete("t")
            .join(JoinClause::inner(
                Expression::table("u"),
                Expression::qualified_column("t", "id")
                    .eq(Expression::qualified_column("u", "t_id")),
            ))
            .join(JoinClause::left(
                Expression::table("v"),
                Expression::qualified_column("u", "id")
                    .eq(Expression::qualified_column("v", "u_id")),
            )),
    );

    assert_eq!(
        prepared.sql,
        "delete from \"t\"\nusing \"u\"\nleft outer join \"v\" on \"u\".\"id\" = \"v\".\"u_id\"\nwhere \"t\".\"id\" = \"u\".\"t_id\""
    );
}

#[test]
fn test_delete_returning() {
    let prepared = prepare(
        delete("t")
            .where_clause(Expression::column("id").eq(Expression::value(1)))
            .returning(Expression::column("id")),
    );
    assert_eq!(
        prepared.sql,
        "delete from \"t\"\nwhere \"id\" = ?\nreturning \"id\""
    );
}

#[test]
fn test_merge_update_policy() {
    let table = ConstantTableExpr::new(vec![vec![
        Expression::value(1),
        Expression::value("bob"),
    ]])
    .columns(["id", "name"]);

    let prepared = prepare(
        merge("users")
            .using(Expression::ConstantTable(table))
            .on_columns(["id"])
            .do_update(),
    );

    assert_eq!(
        prepared.sql,
        "merge into \"users\"\nusing (values (?, ?)) as \"excluded\" (\"id\", \"name\")\non \"users\".\"id\" = \"excluded\".\"id\"\nwhen matched then\nupdate set \"name\" = \"excluded\".\"name\"\nwhen not matched then\ninsert (\"id\", \"name\") values (\"excluded\".\"id\", \"excluded\".\"name\")"
    );
    assert_eq!(
        values(&prepared),
        vec![SqlValue::Int(1), SqlValue::Text(String::from("bob"))]
    );
}

#[test]
fn test_merge_ignore_policy_omits_matched_branch() {
    let table = ConstantTableExpr::new(vec![vec![
        Expression::value(1),
        Expression::value("bob"),
    ]])
    .columns(["id", "name"]);

    let prepared = prepare(
        merge("users")
            .using(Expression::ConstantTable(table))
            .on_columns(["id"])
            .do_ignore(),
    );

    assert!(!prepared.sql.contains("when matched"));
    assert!(prepared.sql.contains("when not matched then"));
}

#[test]
fn test_merge_structural_errors() {
    let err = StandardWriter::default()
        .prepare(merge("users").on_columns(["id"]).into())
        .unwrap_err();
    assert!(matches!(err, QueryBuilderError::MissingUsing));

    let table = ConstantTableExpr::new(vec![vec![Expression::value(1)]]).columns(["id"]);
    let err = StandardWriter::default()
        .prepare(merge("users").using(Expression::ConstantTable(table)).into())
        .unwrap_err();
    assert!(matches!(err, QueryBuilderError::EmptyMergeKeys));
}
