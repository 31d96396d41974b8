//! DELETE statement builder.

use super::{ParameterizedStatement, StatementKind};
use crate::error::{DbError, DbResult};
use crate::ident::{IdentKind, validate_identifier};

/// Build `DELETE FROM <table> WHERE <condition>`.
///
/// The condition is mandatory: a blank one fails with [`DbError::MissingCondition`] instead
/// of producing a statement that deletes every row.
pub fn build_delete(table: &str, condition: &str) -> DbResult<ParameterizedStatement> {
    validate_identifier(table, IdentKind::Table)?;
    if condition.trim().is_empty() {
        return Err(DbError::MissingCondition(StatementKind::Delete.as_str()));
    }

    Ok(ParameterizedStatement::new(
        StatementKind::Delete,
        format!("DELETE FROM {table} WHERE {condition}"),
        Vec::new(),
    ))
}
