//! SELECT statement builder.

use super::{ParameterizedStatement, StatementKind};
use crate::error::DbResult;
use crate::ident::{IdentKind, validate_identifier};

/// Build `SELECT <fields> FROM <table>[ WHERE <condition>]`.
///
/// `fields` may be a single column, a comma-separated list, `*`, or simple aliases
/// (`u.name AS author`). `condition` is trusted caller text that refers to values through
/// placeholders (`@whereParam0`); bind them on the returned statement. A blank condition
/// produces no WHERE clause.
pub fn build_select(fields: &str, table: &str, condition: &str) -> DbResult<ParameterizedStatement> {
    validate_identifier(table, IdentKind::Table)?;
    validate_identifier(fields, IdentKind::Fields)?;

    let sql = if condition.trim().is_empty() {
        format!("SELECT {fields} FROM {table}")
    } else {
        format!("SELECT {fields} FROM {table} WHERE {condition}")
    };

    Ok(ParameterizedStatement::new(
        StatementKind::Select,
        sql,
        Vec::new(),
    ))
}
