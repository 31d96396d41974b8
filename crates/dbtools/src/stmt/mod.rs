//! Parameterized statement construction.
//!
//! Every builder validates its table and field tokens with [`crate::ident`] before they reach
//! SQL text, and never embeds a value: values become named placeholders carried in the
//! parallel parameter list.
//!
//! | Builder | Placeholders |
//! |---|---|
//! | [`build_insert`] | `@param0, @param1, ...` |
//! | [`build_update`] | `@setParam0, @setParam1, ...` |
//! | conditions (caller) | `@whereParam0, @whereParam1, ...` |
//!
//! # Example
//!
//! ```ignore
//! use dbtools::stmt;
//!
//! let select = stmt::build_select("id,name", "users", "status = @whereParam0")?
//!     .bind("@whereParam0", "active");
//!
//! let insert = stmt::build_insert(&["name", "email"], "users", ["John", "j@x.com"])?;
//!
//! let update = stmt::build_update(&["name"], "users", ["Jane"], "id = @whereParam0")?
//!     .bind("@whereParam0", 7);
//!
//! let delete = stmt::build_delete("users", "id = @whereParam0")?.bind("@whereParam0", 7);
//! # Ok::<(), dbtools::DbError>(())
//! ```

mod delete;
mod insert;
mod placeholder;
mod select;
mod update;


pub use delete::build_delete;
pub use insert::build_insert;
pub use select::build_select;
pub use update::build_update;

use crate::error::{DbError, DbResult};
use crate::value::Value;
use std::fmt;

/// Prefix of INSERT value placeholders.
pub const INSERT_PARAM_PREFIX: &str = "@param";
/// Prefix of UPDATE SET-clause placeholders.
pub const SET_PARAM_PREFIX: &str = "@setParam";
/// Prefix conventionally used by callers for condition placeholders.
pub const WHERE_PARAM_PREFIX: &str = "@whereParam";

/// The kind of SQL statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    /// Caller-written SQL of any other shape (DDL, CALL, ...)
    Other,
}

impl StatementKind {
    /// Detect the statement kind from its leading keyword.
    pub fn from_sql(sql: &str) -> Self {
        let head = strip_sql_prefix(sql);
        let keyword: String = head
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_ascii_uppercase();
        match keyword.as_str() {
            "SELECT" | "SHOW" => StatementKind::Select,
            "INSERT" | "REPLACE" => StatementKind::Insert,
            "UPDATE" => StatementKind::Update,
            "DELETE" => StatementKind::Delete,
            _ => StatementKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
            StatementKind::Other => "OTHER",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip leading whitespace, SQL comments (`--` and `/* */`), and parentheses
/// from a SQL string to find the first meaningful keyword.
fn strip_sql_prefix(sql: &str) -> &str {
    let mut s = sql;
    loop {
        let before = s;
        s = s.trim_start();
        if let Some(rest) = s.strip_prefix("--") {
            match rest.find('\n') {
                Some(pos) => {
                    s = &rest[pos + 1..];
                    continue;
                }
                None => return "",
            }
        }
        if let Some(rest) = s.strip_prefix("/*") {
            match rest.find("*/") {
                Some(pos) => {
                    s = &rest[pos + 2..];
                    continue;
                }
                None => return "",
            }
        }
        if let Some(rest) = s.strip_prefix('(') {
            s = rest;
            continue;
        }
        if s == before {
            break;
        }
    }
    s
}

/// A named parameter binding. The name always carries the `@` prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: Value,
}

impl Parameter {
    pub fn new(name: &str, value: impl Into<Value>) -> Self {
        Self {
            name: normalize_name(name),
            value: value.into(),
        }
    }
}

fn normalize_name(name: &str) -> String {
    if name.starts_with('@') {
        name.to_string()
    } else {
        format!("@{name}")
    }
}

/// SQL text plus its named parameters.
///
/// Built by the `build_*` functions (or [`ParameterizedStatement::raw`]); condition values are
/// added with [`ParameterizedStatement::bind`]. The statement is consumed by the execution
/// façade, which calls [`ParameterizedStatement::verify`] before opening a connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterizedStatement {
    kind: StatementKind,
    sql: String,
    parameters: Vec<Parameter>,
}

impl ParameterizedStatement {
    pub(crate) fn new(kind: StatementKind, sql: String, parameters: Vec<Parameter>) -> Self {
        Self {
            kind,
            sql,
            parameters,
        }
    }

    /// Wrap caller-written SQL. Values must still be supplied with [`Self::bind`].
    ///
    /// The SQL text is not validated: it must come from trusted code, never from user input.
    pub fn raw(sql: impl Into<String>) -> Self {
        let sql = sql.into();
        Self {
            kind: StatementKind::from_sql(&sql),
            sql,
            parameters: Vec::new(),
        }
    }

    /// Bind a value to a placeholder name (`"@whereParam0"` or `"whereParam0"`).
    pub fn bind(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.parameters.push(Parameter::new(name, value));
        self
    }

    /// Bind several `(name, value)` pairs in order.
    pub fn bind_all<N, V>(mut self, params: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: AsRef<str>,
        V: Into<Value>,
    {
        self.parameters.extend(
            params
                .into_iter()
                .map(|(name, value)| Parameter::new(name.as_ref(), value)),
        );
        self
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Look up a bound value by placeholder name.
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        let name = normalize_name(name);
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    pub fn into_parts(self) -> (String, Vec<Parameter>) {
        (self.sql, self.parameters)
    }

    /// Placeholder names (with `@`) in order of appearance, outside quotes and comments.
    pub fn placeholders(&self) -> Vec<&str> {
        placeholder::scan(&self.sql)
            .into_iter()
            .map(|p| p.name)
            .collect()
    }

    /// Check that every placeholder is bound exactly once.
    ///
    /// Parameters that no placeholder references are allowed (callers may bind a shared
    /// condition parameter set) and are ignored by positional rewriting.
    pub fn verify(&self) -> DbResult<()> {
        for (i, p) in self.parameters.iter().enumerate() {
            if self.parameters[..i].iter().any(|q| q.name == p.name) {
                return Err(DbError::DuplicateParameter(p.name.clone()));
            }
        }
        for name in self.placeholders() {
            if !self.parameters.iter().any(|p| p.name == name) {
                return Err(DbError::UnboundPlaceholder(name.to_string()));
            }
        }
        Ok(())
    }

    /// Rewrite named placeholders into a driver's positional syntax.
    ///
    /// `render` receives the 1-based position (`|i| format!("${i}")` for Postgres,
    /// `|_| "?".into()` for `?`-style drivers). A name used twice keeps its first position,
    /// so with `?`-style drivers prefer distinct names. Returns the rewritten SQL and the
    /// values in positional order.
    pub fn to_positional(
        &self,
        render: impl Fn(usize) -> String,
    ) -> DbResult<(String, Vec<&Value>)> {
        self.verify()?;
        rewrite_positional(&self.sql, &self.parameters, render)
    }
}

/// Rewrite `@name` placeholders in `sql` using the values in `params`.
///
/// Connections receive SQL and parameters separately; this is the same rewrite as
/// [`ParameterizedStatement::to_positional`] without the duplicate-name check.
pub fn rewrite_positional<'p>(
    sql: &str,
    params: &'p [Parameter],
    render: impl Fn(usize) -> String,
) -> DbResult<(String, Vec<&'p Value>)> {
    let mut out = String::with_capacity(sql.len());
    let mut order: Vec<&str> = Vec::new();
    let mut values: Vec<&Value> = Vec::new();
    let mut last = 0;

    for ph in placeholder::scan(sql) {
        out.push_str(&sql[last..ph.start]);
        let position = match order.iter().position(|n| *n == ph.name) {
            Some(idx) => idx + 1,
            None => {
                let value = params
                    .iter()
                    .find(|p| p.name == ph.name)
                    .map(|p| &p.value)
                    .ok_or_else(|| DbError::UnboundPlaceholder(ph.name.to_string()))?;
                order.push(ph.name);
                values.push(value);
                order.len()
            }
        };
        out.push_str(&render(position));
        last = ph.end;
    }
    out.push_str(&sql[last..]);

    Ok((out, values))
}

impl fmt::Display for ParameterizedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Shared length check for builders taking parallel `fields` / `values`.
fn check_counts(fields: usize, values: usize) -> DbResult<()> {
    if fields != values {
        return Err(DbError::FieldCountMismatch { fields, values });
    }
    Ok(())
}
