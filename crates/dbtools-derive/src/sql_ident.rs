use proc_macro2::Span;
use syn::{Error, LitStr, Result};

/// Letters, digits, `_`, `` ` `` and `.`, the same set `dbtools::validate_identifier` accepts.
pub(crate) fn is_valid_sql_ident(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '`' || c == '.')
}

pub(crate) fn parse_sql_ident(lit: &LitStr, what: &str) -> Result<String> {
    check_sql_ident(lit.value().trim(), lit.span(), what)
}

pub(crate) fn check_sql_ident(value: &str, span: Span, what: &str) -> Result<String> {
    if value.is_empty() {
        return Err(Error::new(span, format!("{what} cannot be empty")));
    }
    if !is_valid_sql_ident(value) {
        return Err(Error::new(
            span,
            format!(
                "{what} is not a valid SQL identifier '{value}' \
                 (expected letters, digits, '_', '`' or '.')"
            ),
        ));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_quoted_and_qualified() {
        assert!(is_valid_sql_ident("users"));
        assert!(is_valid_sql_ident("_tmp1"));
        assert!(is_valid_sql_ident("public.users"));
        assert!(is_valid_sql_ident("`order`"));
        assert!(is_valid_sql_ident("prix_été"));
    }

    #[test]
    fn rejects_bad_idents() {
        assert!(!is_valid_sql_ident(""));
        assert!(!is_valid_sql_ident("users;"));
        assert!(!is_valid_sql_ident("first name"));
        assert!(!is_valid_sql_ident("a-b"));
        assert!(!is_valid_sql_ident("id--"));
    }
}
