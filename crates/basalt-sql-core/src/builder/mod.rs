//! Fluent query builders.
//!
//! Builders only accumulate clauses into the statement structs from
//! `ast::statement`; nothing is rendered until the statement is handed
//! to a writer's `prepare`.

mod delete;
mod insert;
mod merge;
mod select;
mod update;

pub use delete::delete;
pub use insert::insert;
pub use merge::merge;
pub use select::select;
pub use update::update;
