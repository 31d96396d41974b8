//! Delimited text export of materialized records.

use crate::record::GenericRecord;
use crate::value::Value;

/// Options for [`to_csv`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub separator: char,
    /// Emit a header line of column names.
    pub show_columns: bool,
    /// Emit a line of type names after the header.
    pub show_types: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            separator: ',',
            show_columns: true,
            show_types: false,
        }
    }
}

impl CsvOptions {
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn show_columns(mut self, show: bool) -> Self {
        self.show_columns = show;
        self
    }

    pub fn show_types(mut self, show: bool) -> Self {
        self.show_types = show;
        self
    }
}

/// Render records as delimited text.
///
/// Header lines are taken from the first record. NULL renders as an empty field; a field
/// containing the separator, a double quote or a line break is quoted with inner quotes
/// doubled. Every line ends with `\n`.
pub fn to_csv(records: &[GenericRecord], options: &CsvOptions) -> String {
    let mut out = String::new();

    if let Some(first) = records.first() {
        if options.show_columns {
            write_line(&mut out, first.columns().iter().map(String::as_str), options.separator);
        }
        if options.show_types {
            write_line(&mut out, first.types().iter().map(String::as_str), options.separator);
        }
    }

    for record in records {
        let fields: Vec<String> = record.values().iter().map(Value::to_string).collect();
        write_line(&mut out, fields.iter().map(String::as_str), options.separator);
    }

    out
}

fn write_line<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>, separator: char) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(separator);
        }
        push_field(out, field, separator);
    }
    out.push('\n');
}

fn push_field(out: &mut String, field: &str, separator: char) {
    let needs_quotes = field.contains(separator)
        || field.contains('"')
        || field.contains('\n')
        || field.contains('\r');
    if !needs_quotes {
        out.push_str(field);
        return;
    }
    out.push('"');
    out.push_str(&field.replace('"', "\"\""));
    out.push('"');
}
