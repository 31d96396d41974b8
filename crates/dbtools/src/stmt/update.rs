//! UPDATE statement builder.

use super::{Parameter, ParameterizedStatement, SET_PARAM_PREFIX, StatementKind, check_counts};
use crate::error::{DbError, DbResult};
use crate::ident::{IdentKind, InvalidReason, validate_identifier};
use crate::value::Value;

/// Build `UPDATE <table> SET <f0>=@setParam0,<f1>=@setParam1,...[ WHERE <condition>]`.
///
/// SET values use the `@setParam` namespace so they never collide with the condition's own
/// `@whereParam` placeholders once both sets are bound on the same statement.
pub fn build_update<F, I>(
    fields: &[F],
    table: &str,
    values: I,
    condition: &str,
) -> DbResult<ParameterizedStatement>
where
    F: AsRef<str>,
    I: IntoIterator,
    I::Item: Into<Value>,
{
    let values: Vec<Value> = values.into_iter().map(Into::into).collect();
    check_counts(fields.len(), values.len())?;
    if fields.is_empty() {
        return Err(DbError::invalid_identifier(
            IdentKind::Fields,
            "",
            InvalidReason::Empty,
        ));
    }
    validate_identifier(table, IdentKind::Table)?;

    let mut set_clause = String::new();
    let mut parameters = Vec::with_capacity(values.len());

    for (i, (field, value)) in fields.iter().zip(values).enumerate() {
        let field = field.as_ref();
        validate_identifier(field, IdentKind::Field)?;

        if i > 0 {
            set_clause.push(',');
        }
        let name = format!("{SET_PARAM_PREFIX}{i}");
        set_clause.push_str(field);
        set_clause.push('=');
        set_clause.push_str(&name);
        parameters.push(Parameter { name, value });
    }

    let mut sql = format!("UPDATE {table} SET {set_clause}");
    if !condition.trim().is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(condition);
    }

    Ok(ParameterizedStatement::new(
        StatementKind::Update,
        sql,
        parameters,
    ))
}
