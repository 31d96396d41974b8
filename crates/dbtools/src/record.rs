//! Result materialization.
//!
//! A driver hands back a [`Rowset`]: the column schema plus rows of [`Value`]s. [`materialize`]
//! turns it into one [`GenericRecord`] per row, without any knowledge of the caller's types.

use crate::error::{DbError, DbResult};
use crate::value::Value;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

/// Name and driver type name of one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: String,
    pub type_name: String,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// A driver-native tabular result.
///
/// Every row has exactly as many values as there are columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rowset {
    columns: Vec<ColumnMeta>,
    rows: Vec<Vec<Value>>,
}

impl Rowset {
    pub fn new(columns: Vec<ColumnMeta>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row. Fails with [`DbError::Decode`] if its width differs from the schema.
    pub fn push_row(&mut self, row: Vec<Value>) -> DbResult<()> {
        if row.len() != self.columns.len() {
            return Err(DbError::decode(
                format!("row {}", self.rows.len()),
                format!(
                    "expected {} values, got {}",
                    self.columns.len(),
                    row.len()
                ),
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<Vec<Value>> {
        self.rows
    }
}

/// One result row as parallel column / type / value sequences.
///
/// Column and type lists are shared by every record of the same result. Column names may
/// repeat (e.g. `SELECT a.id, b.id`); [`GenericRecord::get_by_name`] returns the first match.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericRecord {
    columns: Arc<[String]>,
    types: Arc<[String]>,
    values: Vec<Value>,
}

impl GenericRecord {
    /// Build a standalone record. The three sequences must have the same length.
    pub fn new(columns: Vec<String>, types: Vec<String>, values: Vec<Value>) -> DbResult<Self> {
        if columns.len() != types.len() || columns.len() != values.len() {
            return Err(DbError::decode(
                "record",
                format!(
                    "{} columns, {} types, {} values",
                    columns.len(),
                    types.len(),
                    values.len()
                ),
            ));
        }
        Ok(Self {
            columns: columns.into(),
            types: types.into(),
            values,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at column position `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Value of the first column named `name`.
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == name)
            .and_then(|i| self.values.get(i))
    }

    /// Column/value pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Convert into a JSON object. Later duplicate column names overwrite earlier ones.
    pub fn to_json_map(&self) -> serde_json::Map<String, serde_json::Value> {
        self.iter()
            .map(|(c, v)| (c.to_string(), serde_json::to_value(v).unwrap_or_default()))
            .collect()
    }
}

impl Serialize for GenericRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Convert a rowset into one record per row, in source order.
///
/// Column names and type names are read once. Nulls stay [`Value::Null`]. An empty rowset
/// yields an empty list.
pub fn materialize(rowset: Rowset) -> Vec<GenericRecord> {
    let columns: Arc<[String]> = rowset.columns.iter().map(|c| c.name.clone()).collect();
    let types: Arc<[String]> = rowset
        .columns
        .iter()
        .map(|c| c.type_name.clone())
        .collect();

    rowset
        .rows
        .into_iter()
        .map(|values| GenericRecord {
            columns: Arc::clone(&columns),
            types: Arc::clone(&types),
            values,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Rowset {
        let mut rs = Rowset::new(vec![
            ColumnMeta::new("id", "Int32"),
            ColumnMeta::new("name", "String"),
        ]);
        rs.push_row(vec![Value::Int(1), Value::from("a")]).unwrap();
        rs.push_row(vec![Value::Int(2), Value::Null]).unwrap();
        rs
    }

    #[test]
    fn one_record_per_row_in_order() {
        let records = materialize(users());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].columns(), &["id", "name"]);
        assert_eq!(records[0].types(), &["Int32", "String"]);
        assert_eq!(records[0].values(), &[Value::Int(1), Value::from("a")]);
        assert_eq!(records[1].get(0), Some(&Value::Int(2)));
    }

    #[test]
    fn null_is_kept_distinct_from_empty_string() {
        let records = materialize(users());
        let name = records[1].get(1).unwrap();
        assert!(name.is_null());
        assert_ne!(name, &Value::Text(String::new()));
    }

    #[test]
    fn empty_rowset_yields_no_records() {
        let rs = Rowset::new(vec![ColumnMeta::new("id", "Int32")]);
        assert!(materialize(rs).is_empty());
    }

    #[test]
    fn records_share_schema() {
        let records = materialize(users());
        assert!(Arc::ptr_eq(&records[0].columns, &records[1].columns));
        assert_eq!(records[0].len(), records[1].len());
    }

    #[test]
    fn push_row_rejects_wrong_width() {
        let mut rs = Rowset::new(vec![ColumnMeta::new("id", "Int32")]);
        let err = rs.push_row(vec![Value::Int(1), Value::Int(2)]).unwrap_err();
        assert!(matches!(err, DbError::Decode { .. }));
        assert!(rs.is_empty());
    }

    #[test]
    fn get_by_name_returns_first_duplicate() {
        let mut rs = Rowset::new(vec![
            ColumnMeta::new("id", "Int32"),
            ColumnMeta::new("id", "Int32"),
        ]);
        rs.push_row(vec![Value::Int(1), Value::Int(2)]).unwrap();
        let rec = &materialize(rs)[0];
        assert_eq!(rec.get_by_name("id"), Some(&Value::Int(1)));
        assert_eq!(rec.get_by_name("missing"), None);
    }

    #[test]
    fn serializes_as_object() {
        let records = materialize(users());
        let json = serde_json::to_string(&records).unwrap();
        assert_eq!(json, r#"[{"id":1,"name":"a"},{"id":2,"name":null}]"#);
        assert_eq!(records[1].to_json_map()["name"], serde_json::Value::Null);
    }

    #[test]
    fn standalone_record_checks_lengths() {
        assert!(GenericRecord::new(vec!["a".into()], vec![], vec![Value::Null]).is_err());
        let rec = GenericRecord::new(vec!["a".into()], vec!["Null".into()], vec![Value::Null]).unwrap();
        assert_eq!(rec.len(), 1);
    }
}
