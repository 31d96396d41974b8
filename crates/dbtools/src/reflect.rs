//! Record reflection: turn a typed record into an ordered list of column bindings.
//!
//! Field discovery is a capability of the record type. [`Reflect`] is usually derived:
//!
//! ```ignore
//! use dbtools::Reflect;
//!
//! #[derive(Reflect)]
//! #[dbtools(table = "users")]
//! struct User {
//!     #[dbtools(id)]
//!     id: i64,
//!     name: String,
//!     created_at: chrono::NaiveDateTime,
//! }
//!
//! let reflection = dbtools::reflect(&user, "id", true);
//! let stmt = reflection.insert_into("users")?;
//!
//! // or with the declared table and key
//! let stmt = dbtools::insert_record(&user, true)?;
//! let stmt = dbtools::update_record(&user)?;
//! ```
//!
//! Records without a derive can pass an explicit descriptor list to [`reflect_with`].

use crate::error::{DbError, DbResult};
use crate::ident::{IdentKind, InvalidReason};
use crate::stmt::{self, ParameterizedStatement};
use crate::value::{DATETIME_FORMAT, Value, ValueError};

/// Declared type reported for normalized date/time fields.
pub const DATETIME_TYPE: &str = "DateTime";

/// One field of a record to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBinding {
    pub column: String,
    pub value: Value,
    pub declared_type: String,
}

/// Accessor reading one field of `T`.
pub type FieldAccessor<T> = fn(&T) -> Result<Value, ValueError>;

/// Describes one readable field of a record type.
pub struct FieldDescriptor<T> {
    name: &'static str,
    declared_type: &'static str,
    accessor: FieldAccessor<T>,
}

impl<T> FieldDescriptor<T> {
    pub fn new(name: &'static str, declared_type: &'static str, accessor: FieldAccessor<T>) -> Self {
        Self {
            name,
            declared_type,
            accessor,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn declared_type(&self) -> &'static str {
        self.declared_type
    }

    pub fn read(&self, record: &T) -> Result<Value, ValueError> {
        (self.accessor)(record)
    }
}

impl<T> Clone for FieldDescriptor<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FieldDescriptor<T> {}

impl<T> std::fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("declared_type", &self.declared_type)
            .finish()
    }
}

/// A record type whose fields can be enumerated in declaration order.
///
/// This trait should typically be derived using `#[derive(Reflect)]`.
pub trait Reflect: Sized {
    /// Field descriptors in declaration order.
    fn fields() -> Vec<FieldDescriptor<Self>>;

    /// Table name from `#[dbtools(table = "...")]`, if declared.
    fn table() -> Option<&'static str> {
        None
    }

    /// Column marked `#[dbtools(id)]`, if declared.
    fn primary_key() -> Option<&'static str> {
        None
    }
}

/// A field that could not be read during reflection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedField {
    pub column: String,
    pub reason: String,
}

/// Result of reflecting one record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reflection {
    pub bindings: Vec<ColumnBinding>,
    pub skipped: Vec<SkippedField>,
}

impl Reflection {
    /// `true` when no field was skipped.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Bindings, or [`DbError::ReflectionIncomplete`] if any field was skipped.
    pub fn into_complete(self) -> DbResult<Vec<ColumnBinding>> {
        if self.skipped.is_empty() {
            Ok(self.bindings)
        } else {
            Err(DbError::ReflectionIncomplete(
                self.skipped.into_iter().map(|s| s.column).collect(),
            ))
        }
    }

    pub fn columns(&self) -> Vec<&str> {
        self.bindings.iter().map(|b| b.column.as_str()).collect()
    }

    pub fn values(&self) -> Vec<Value> {
        self.bindings.iter().map(|b| b.value.clone()).collect()
    }

    pub fn declared_types(&self) -> Vec<&str> {
        self.bindings.iter().map(|b| b.declared_type.as_str()).collect()
    }

    /// Build an INSERT for the reflected columns.
    pub fn insert_into(&self, table: &str) -> DbResult<ParameterizedStatement> {
        stmt::build_insert(&self.columns(), table, self.values())
    }

    /// Build an UPDATE setting every reflected column.
    pub fn update(&self, table: &str, condition: &str) -> DbResult<ParameterizedStatement> {
        stmt::build_update(&self.columns(), table, self.values(), condition)
    }
}

/// Reflect a [`Reflect`] record.
///
/// With `auto_increment`, the field named exactly `primary_key` is left out (the server
/// generates it). Fields whose accessor fails are recorded in [`Reflection::skipped`].
pub fn reflect<T: Reflect>(record: &T, primary_key: &str, auto_increment: bool) -> Reflection {
    reflect_with(record, &T::fields(), primary_key, auto_increment)
}

/// Reflect a record through an explicit descriptor list.
pub fn reflect_with<T>(
    record: &T,
    fields: &[FieldDescriptor<T>],
    primary_key: &str,
    auto_increment: bool,
) -> Reflection {
    let mut out = Reflection::default();

    for field in fields {
        if auto_increment && field.name == primary_key {
            continue;
        }

        match field.read(record) {
            Ok(value) => out.bindings.push(normalize(field, value)),
            Err(e) => {
                tracing::warn!(
                    target: "dbtools.reflect",
                    column = field.name,
                    error = %e,
                    "skipping field that could not be read"
                );
                out.skipped.push(SkippedField {
                    column: field.name.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    out
}

/// Reflect a record, excluding the type's declared primary key when `auto_increment` is set.
///
/// Without a declared key every field is emitted.
pub fn reflect_record<T: Reflect>(record: &T, auto_increment: bool) -> Reflection {
    reflect(record, T::primary_key().unwrap_or_default(), auto_increment)
}

/// Build an INSERT into the record type's declared table.
///
/// Unlike [`Reflection::insert_into`], every field must be readable.
pub fn insert_record<T: Reflect>(
    record: &T,
    auto_increment: bool,
) -> DbResult<ParameterizedStatement> {
    let table = declared_table::<T>()?;
    let bindings = reflect_record(record, auto_increment).into_complete()?;
    let (columns, values): (Vec<String>, Vec<Value>) =
        bindings.into_iter().map(|b| (b.column, b.value)).unzip();
    stmt::build_insert(&columns, table, values)
}

/// Build `UPDATE <table> SET <non-key columns> WHERE <key> = @whereParam0` for a record,
/// with `@whereParam0` bound to the record's key value.
pub fn update_record<T: Reflect>(record: &T) -> DbResult<ParameterizedStatement> {
    let table = declared_table::<T>()?;
    let key = T::primary_key().ok_or_else(|| {
        DbError::invalid_identifier(IdentKind::Field, "", InvalidReason::Empty)
    })?;

    let mut key_value = None;
    let mut columns = Vec::new();
    let mut values = Vec::new();
    for binding in reflect(record, key, false).into_complete()? {
        if binding.column == key {
            key_value = Some(binding.value);
        } else {
            columns.push(binding.column);
            values.push(binding.value);
        }
    }
    let key_value = key_value.ok_or_else(|| {
        DbError::invalid_identifier(IdentKind::Field, key, InvalidReason::Empty)
    })?;

    let where_param = format!("{}0", stmt::WHERE_PARAM_PREFIX);
    Ok(
        stmt::build_update(&columns, table, values, &format!("{key} = {where_param}"))?
            .bind(&where_param, key_value),
    )
}

fn declared_table<T: Reflect>() -> DbResult<&'static str> {
    T::table().ok_or_else(|| DbError::invalid_identifier(IdentKind::Table, "", InvalidReason::Empty))
}

fn normalize<T>(field: &FieldDescriptor<T>, value: Value) -> ColumnBinding {
    let (value, declared_type) = match value {
        Value::DateTime(dt) => (
            Value::Text(dt.format(DATETIME_FORMAT).to_string()),
            DATETIME_TYPE.to_string(),
        ),
        Value::Date(d) => (
            Value::Text(d.and_time(chrono::NaiveTime::MIN).format(DATETIME_FORMAT).to_string()),
            DATETIME_TYPE.to_string(),
        ),
        other => (other, field.declared_type.to_string()),
    };
    ColumnBinding {
        column: field.name.to_string(),
        value,
        declared_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ToValue;
    use chrono::NaiveDate;

    struct Person {
        id: i64,
        name: String,
        born: chrono::NaiveDateTime,
        visits: u64,
    }

    impl Reflect for Person {
        fn fields() -> Vec<FieldDescriptor<Self>> {
            vec![
                FieldDescriptor::new("Id", "i64", |p: &Person| p.id.to_value()),
                FieldDescriptor::new("Name", "String", |p: &Person| p.name.to_value()),
                FieldDescriptor::new("Born", "NaiveDateTime", |p: &Person| p.born.to_value()),
                FieldDescriptor::new("Visits", "u64", |p: &Person| p.visits.to_value()),
            ]
        }

        fn table() -> Option<&'static str> {
            Some("people")
        }

        fn primary_key() -> Option<&'static str> {
            Some("Id")
        }
    }

    fn person(visits: u64) -> Person {
        Person {
            id: 1,
            name: "A".into(),
            born: NaiveDate::from_ymd_opt(1990, 12, 31)
                .unwrap()
                .and_hms_opt(23, 59, 58)
                .unwrap(),
            visits,
        }
    }

    struct Simple {
        id: i32,
        name: &'static str,
    }

    impl Reflect for Simple {
        fn fields() -> Vec<FieldDescriptor<Self>> {
            simple_fields()
        }
    }

    fn simple_fields() -> Vec<FieldDescriptor<Simple>> {
        vec![
            FieldDescriptor::new("Id", "i32", |s: &Simple| s.id.to_value()),
            FieldDescriptor::new("Name", "&str", |s: &Simple| s.name.to_value()),
        ]
    }

    #[test]
    fn auto_increment_excludes_primary_key() {
        let rec = Simple { id: 1, name: "A" };
        let r = reflect_with(&rec, &simple_fields(), "Id", true);
        assert_eq!(
            r.bindings,
            vec![ColumnBinding {
                column: "Name".into(),
                value: Value::Text("A".into()),
                declared_type: "&str".into(),
            }]
        );
    }

    #[test]
    fn without_auto_increment_keeps_all_in_order() {
        let rec = Simple { id: 1, name: "A" };
        let r = reflect_with(&rec, &simple_fields(), "Id", false);
        assert_eq!(r.columns(), vec!["Id", "Name"]);
        assert_eq!(r.values(), vec![Value::Int(1), Value::Text("A".into())]);
    }

    #[test]
    fn primary_key_match_is_case_sensitive() {
        let rec = Simple { id: 1, name: "A" };
        let r = reflect_with(&rec, &simple_fields(), "id", true);
        assert_eq!(r.columns(), vec!["Id", "Name"]);
    }

    #[test]
    fn datetime_is_normalized() {
        let r = reflect(&person(3), "Id", true);
        let born = &r.bindings[1];
        assert_eq!(born.column, "Born");
        assert_eq!(born.value, Value::Text("1990-12-31 23:59:58".into()));
        assert_eq!(born.declared_type, DATETIME_TYPE);
    }

    #[test]
    fn unreadable_field_is_skipped_and_reported() {
        let r = reflect(&person(u64::MAX), "Id", false);
        assert_eq!(r.columns(), vec!["Id", "Name", "Born"]);
        assert_eq!(r.skipped.len(), 1);
        assert_eq!(r.skipped[0].column, "Visits");
        assert!(!r.is_complete());

        let err = r.into_complete().unwrap_err();
        assert!(matches!(err, DbError::ReflectionIncomplete(ref cols) if cols == &["Visits"]));
    }

    #[test]
    fn complete_reflection_builds_insert() {
        let r = reflect(&person(3), "Id", true);
        let stmt = r.insert_into("people").unwrap();
        assert_eq!(
            stmt.sql(),
            "INSERT INTO people(Name,Born,Visits) VALUES(@param0,@param1,@param2)"
        );
        assert_eq!(stmt.parameters()[2].value, Value::Int(3));
    }

    #[test]
    fn reflection_builds_update() {
        let r = reflect(&person(3), "Id", true);
        let stmt = r.update("people", "Id = @whereParam0").unwrap();
        assert_eq!(
            stmt.sql(),
            "UPDATE people SET Name=@setParam0,Born=@setParam1,Visits=@setParam2 WHERE Id = @whereParam0"
        );
    }

    #[test]
    fn declared_key_drives_reflection() {
        let r = reflect_record(&person(3), true);
        assert_eq!(r.columns(), vec!["Name", "Born", "Visits"]);
        let r = reflect_record(&person(3), false);
        assert_eq!(r.columns(), vec!["Id", "Name", "Born", "Visits"]);

        // no declared key: nothing is excluded
        let r = reflect_record(&Simple { id: 1, name: "A" }, true);
        assert_eq!(r.columns(), vec!["Id", "Name"]);
    }

    #[test]
    fn insert_record_uses_declared_table() {
        let stmt = insert_record(&person(3), true).unwrap();
        assert_eq!(
            stmt.sql(),
            "INSERT INTO people(Name,Born,Visits) VALUES(@param0,@param1,@param2)"
        );
        stmt.verify().unwrap();
    }

    #[test]
    fn insert_record_requires_every_field() {
        let err = insert_record(&person(u64::MAX), true).unwrap_err();
        assert!(matches!(err, DbError::ReflectionIncomplete(_)));
    }

    #[test]
    fn update_record_binds_key() {
        let stmt = update_record(&person(3)).unwrap();
        assert_eq!(
            stmt.sql(),
            "UPDATE people SET Name=@setParam0,Born=@setParam1,Visits=@setParam2 WHERE Id = @whereParam0"
        );
        assert_eq!(stmt.parameter("@whereParam0"), Some(&Value::Int(1)));
        stmt.verify().unwrap();
    }

    #[test]
    fn record_helpers_need_declared_metadata() {
        let rec = Simple { id: 1, name: "A" };
        let err = insert_record(&rec, true).unwrap_err();
        assert!(matches!(
            err,
            DbError::InvalidIdentifier { kind: IdentKind::Table, .. }
        ));
        assert!(update_record(&rec).unwrap_err().is_invalid_identifier());
    }
}
