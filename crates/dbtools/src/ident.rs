//! Identifier validation.
//!
//! Table and column names cannot be bound as driver parameters, so every identifier that ends
//! up in SQL text goes through this module first.
//!
//! - Single identifiers allow letters, digits, `_`, `` ` `` and `.` (qualified names).
//! - Field lists (`a, b.c, *`) additionally allow `*` and spaces inside a token. A token with a
//!   space is checked against a denylist of keyword and comment fragments, which catches
//!   injection riding on aliasing syntax (`name AS n` passes, `id OR 1=1` does not).
//!
//! # Example
//! ```ignore
//! use dbtools::ident::{validate_identifier, IdentKind};
//!
//! validate_identifier("`users`", IdentKind::Table)?;
//! validate_identifier("id, name AS n", IdentKind::Fields)?;
//! # Ok::<(), dbtools::DbError>(())
//! ```

use crate::error::{DbError, DbResult};
use std::fmt;

/// Keyword fragments rejected inside a field-list token that contains spaces.
pub const DANGEROUS_KEYWORDS: [&str; 12] = [
    " OR ", " AND ", " UNION ", " SELECT ", " INSERT ", " UPDATE ", " DELETE ", " DROP ",
    " CREATE ", " ALTER ", " EXEC ", " EXECUTE ",
];

/// Comment markers rejected inside a field-list token that contains spaces.
pub const COMMENT_MARKERS: [&str; 3] = ["--", "/*", "*/"];

/// What an identifier is used as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentKind {
    /// A table name (`FROM <table>`).
    Table,
    /// A single column name.
    Field,
    /// A SELECT field list (`a,b,c`, `*`, `t.a AS x`).
    Fields,
}

impl fmt::Display for IdentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IdentKind::Table => "table",
            IdentKind::Field => "field",
            IdentKind::Fields => "fields",
        })
    }
}

/// Why an identifier was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    /// Empty or whitespace-only.
    Empty,
    /// A field list with an empty entry (`a,,b`).
    EmptyField,
    /// A character outside the allowed set.
    InvalidCharacter(char),
    /// A denylisted SQL keyword fragment.
    DangerousKeyword(&'static str),
    /// A comment marker (`--`, `/*`, `*/`).
    CommentMarker(&'static str),
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::Empty => f.write_str("name cannot be empty"),
            InvalidReason::EmptyField => f.write_str("field list contains empty fields"),
            InvalidReason::InvalidCharacter(c) => write!(f, "contains invalid character {c:?}"),
            InvalidReason::DangerousKeyword(k) => {
                write!(f, "contains potentially dangerous SQL keyword '{}'", k.trim())
            }
            InvalidReason::CommentMarker(m) => write!(f, "contains comment markers '{m}'"),
        }
    }
}

/// Characters allowed in a single identifier.
pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '`' || c == '.'
}

/// Characters allowed in one trimmed token of a field list.
pub fn is_field_list_char(c: char) -> bool {
    is_identifier_char(c) || c == '*' || c == ' '
}

/// Validate a table, field, or field-list identifier.
///
/// A `Fields` identifier containing `,` or `*` is checked with [`validate_field_list`]; every
/// other identifier must consist of [`is_identifier_char`] characters only.
pub fn validate_identifier(identifier: &str, kind: IdentKind) -> DbResult<()> {
    if identifier.trim().is_empty() {
        return Err(DbError::invalid_identifier(
            kind,
            identifier,
            InvalidReason::Empty,
        ));
    }

    if kind == IdentKind::Fields && (identifier.contains(',') || identifier.contains('*')) {
        return validate_field_list(identifier);
    }

    if let Some(c) = identifier.chars().find(|&c| !is_identifier_char(c)) {
        return Err(DbError::invalid_identifier(
            kind,
            identifier,
            InvalidReason::InvalidCharacter(c),
        ));
    }
    Ok(())
}

/// Validate a comma-separated field list.
pub fn validate_field_list(field_list: &str) -> DbResult<()> {
    let reject = |reason| DbError::invalid_identifier(IdentKind::Fields, field_list, reason);

    if field_list.trim().is_empty() {
        return Err(reject(InvalidReason::Empty));
    }

    for field in field_list.split(',') {
        let field = field.trim();
        if field.is_empty() {
            return Err(reject(InvalidReason::EmptyField));
        }

        // keyword scan runs before the character scan
        if field.contains(' ')
            && let Some(reason) = denylisted_fragment(field)
        {
            return Err(reject(reason));
        }

        if let Some(c) = field.chars().find(|&c| !is_field_list_char(c)) {
            return Err(reject(InvalidReason::InvalidCharacter(c)));
        }
    }
    Ok(())
}

fn denylisted_fragment(token: &str) -> Option<InvalidReason> {
    let upper = token.to_uppercase();
    if let Some(marker) = COMMENT_MARKERS.iter().find(|m| upper.contains(*m)) {
        return Some(InvalidReason::CommentMarker(*marker));
    }
    DANGEROUS_KEYWORDS
        .iter()
        .find(|k| upper.contains(*k))
        .map(|k| InvalidReason::DangerousKeyword(*k))
}

/// A validated single identifier (table or column name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    name: String,
    kind: IdentKind,
}

impl Ident {
    /// Validate `name` as an identifier of `kind`.
    pub fn parse(name: &str, kind: IdentKind) -> DbResult<Self> {
        validate_identifier(name, kind)?;
        Ok(Self {
            name: name.to_string(),
            kind,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> IdentKind {
        self.kind
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
