//! INSERT statement builder.

use super::{INSERT_PARAM_PREFIX, Parameter, ParameterizedStatement, StatementKind, check_counts};
use crate::error::{DbError, DbResult};
use crate::ident::{IdentKind, InvalidReason, validate_identifier};
use crate::value::Value;

/// Build `INSERT INTO <table>(<f0>,<f1>,...) VALUES(@param0,@param1,...)`.
///
/// `values[i]` is bound to `@param{i}`. Fails with [`DbError::FieldCountMismatch`] before any
/// validation when the lengths differ, and rejects an empty field list.
pub fn build_insert<F, I>(fields: &[F], table: &str, values: I) -> DbResult<ParameterizedStatement>
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

    let mut columns = String::new();
    let mut placeholders = String::new();
    let mut parameters = Vec::with_capacity(values.len());

    for (i, (field, value)) in fields.iter().zip(values).enumerate() {
        let field = field.as_ref();
        validate_identifier(field, IdentKind::Field)?;

        if i > 0 {
            columns.push(',');
            placeholders.push(',');
        }
        let name = format!("{INSERT_PARAM_PREFIX}{i}");
        columns.push_str(field);
        placeholders.push_str(&name);
        parameters.push(Parameter { name, value });
    }

    Ok(ParameterizedStatement::new(
        StatementKind::Insert,
        format!("INSERT INTO {table}({columns}) VALUES({placeholders})"),
        parameters,
    ))
}
