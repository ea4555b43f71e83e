//! Builds the same queries for several dialects and prints the SQL
//! along with the bound arguments.
//!
//! Run with: `cargo run --example showcase`

use std::sync::Arc;

use basalt_sql_core::ast::{Expression, JoinClause, Order, RawArg};
use basalt_sql_core::convert::Converter;
use basalt_sql_core::{insert, select, update, Platform, SqlString, SqlWriter};

fn dump(label: &str, prepared: &SqlString) {
    println!("-- {label}");
    println!("{}", prepared.sql);
    if !prepared.arguments.is_empty() {
        let args: Vec<String> = prepared
            .arguments
            .iter()
            .map(|a| match &a.ty {
                Some(ty) => format!("{:?}::{ty}", a.value),
                None => format!("{:?}", a.value),
            })
            .collect();
        println!("-- args: [{}]", args.join(", "));
    }
    println!();
}

fn main() {
    let converter = Arc::new(Converter::new());

    let listing = select()
        .column(Expression::qualified_column("u", "id"))
        .column_as(Expression::qualified_column("u", "name"), "user_name")
        .from(Expression::table("users").alias("u"))
        .join(JoinClause::left(
            Expression::table("orders").alias("o"),
            Expression::qualified_column("o", "user_id")
                .eq(Expression::qualified_column("u", "id")),
        ))
        .where_clause(Expression::qualified_column("u", "active").eq(Expression::value(true)))
        .order_by(Expression::qualified_column("u", "name"), Order::Asc)
        .range(25, 0);

    let upsert_rows = insert("settings")
        .columns(["key", "value"])
        .rows(vec![
            vec![Expression::value("theme"), Expression::value("dark")],
            vec![Expression::value("lang"), Expression::value("en")],
        ])
        .returning(Expression::column("key"));

    let touch = update("users")
        .set("last_seen", Expression::CurrentTimestamp)
        .where_clause(Expression::column("id").eq(Expression::value(42)));

    let reporting = Expression::raw(
        "select count(*) from events where kind = ? and payload ->> 'status' = ?::text",
        vec![RawArg::from("login"), RawArg::from("ok")],
    );

    for tag in ["postgresql", "mysql", "sqlite", "sqlserver"] {
        let platform: Platform = tag.parse().expect("known platform");
        let writer = platform.writer(Arc::clone(&converter));

        println!("==== {platform} ====\n");
        dump("listing", &writer.prepare(listing.clone().into()).unwrap());
        dump("upsert rows", &writer.prepare(upsert_rows.clone().into()).unwrap());
        dump("touch", &writer.prepare(touch.clone().into()).unwrap());
        dump("reporting", &writer.prepare(reporting.clone().into()).unwrap());
    }
}
