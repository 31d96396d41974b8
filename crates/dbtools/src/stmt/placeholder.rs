//! `@name` placeholder scanning.

/// One placeholder occurrence; `name` includes the leading `@`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Placeholder<'a> {
    pub start: usize,
    pub end: usize,
    pub name: &'a str,
}

fn is_name_start(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphabetic()
}

fn is_name_char(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphanumeric()
}

/// Find placeholders outside string literals, quoted identifiers and comments.
///
/// `@@name` (server variables) is not a placeholder. Quoted sections follow standard SQL:
/// a doubled quote is an escaped quote and a backslash is an ordinary character. Only
/// `E'...'` escape-string literals treat a backslash as an escape.
pub(crate) fn scan(sql: &str) -> Vec<Placeholder<'_>> {
    let bytes = sql.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                let backslash_escapes = quote == b'\'' && is_escape_string(bytes, i);
                i = skip_quoted(bytes, i, quote, backslash_escapes);
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = match sql[i..].find('\n') {
                    Some(pos) => i + pos + 1,
                    None => bytes.len(),
                };
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = match sql[i + 2..].find("*/") {
                    Some(pos) => i + 2 + pos + 2,
                    None => bytes.len(),
                };
            }
            b'@' if bytes.get(i + 1) == Some(&b'@') => {
                i += 2;
                while i < bytes.len() && (is_name_char(bytes[i]) || bytes[i] == b'.') {
                    i += 1;
                }
            }
            b'@' if bytes.get(i + 1).is_some_and(|b| is_name_start(*b)) => {
                let start = i;
                i += 2;
                while i < bytes.len() && is_name_char(bytes[i]) {
                    i += 1;
                }
                out.push(Placeholder {
                    start,
                    end: i,
                    name: &sql[start..i],
                });
            }
            _ => i += 1,
        }
    }

    out
}

/// `true` when the quote at `open` starts an `E'...'` literal.
fn is_escape_string(bytes: &[u8], open: usize) -> bool {
    match open.checked_sub(1).map(|p| bytes[p]) {
        Some(b'E' | b'e') => open < 2 || !is_name_char(bytes[open - 2]),
        _ => false,
    }
}

/// Returns the index just past the closing quote (or the end of input).
fn skip_quoted(bytes: &[u8], open: usize, quote: u8, backslash_escapes: bool) -> usize {
    let mut i = open + 1;
    while i < bytes.len() {
        let b = bytes[i];
        if backslash_escapes && b == b'\\' {
            i += 2;
            continue;
        }
        if b == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(sql: &str) -> Vec<&str> {
        scan(sql).into_iter().map(|p| p.name).collect()
    }

    #[test]
    fn finds_placeholders_in_order() {
        assert_eq!(
            names("UPDATE t SET a=@setParam0,b=@setParam1 WHERE id = @whereParam0"),
            vec!["@setParam0", "@setParam1", "@whereParam0"]
        );
    }

    #[test]
    fn ignores_quoted_text_and_comments() {
        assert_eq!(names("SELECT '@notme' FROM t WHERE a = @p"), vec!["@p"]);
        assert_eq!(names("SELECT 'it''s @x' , @y"), vec!["@y"]);
        assert_eq!(names(r"SELECT E'a\'@x' , @y"), vec!["@y"]);
        assert_eq!(names("SELECT `@col` FROM t -- @c\nWHERE a = @a /* @b */"), vec!["@a"]);
    }

    #[test]
    fn ignores_server_variables_and_bare_at() {
        assert_eq!(names("SELECT @@session.sql_mode, @v"), vec!["@v"]);
        assert_eq!(names("SELECT 1 @ 2"), Vec::<&str>::new());
        assert_eq!(names("SELECT @1"), Vec::<&str>::new());
    }

    #[test]
    fn spans_cover_the_name() {
        let sql = "a = @x1 AND b = @y";
        let found = scan(sql);
        assert_eq!(&sql[found[0].start..found[0].end], "@x1");
        assert_eq!(found[1].end, sql.len());
    }

    #[test]
    fn backslash_is_literal_outside_escape_strings() {
        assert_eq!(names(r"SELECT 1 WHERE path = 'C:\' AND id = @id"), vec!["@id"]);
        assert_eq!(names(r#"SELECT "a\" FROM t WHERE b = @b"#), vec!["@b"]);
        // a trailing E in an identifier does not start an escape string
        assert_eq!(names(r"SELECT * FROM t WHERE type='C:\' AND x = @x"), vec!["@x"]);
        assert_eq!(names(r"SELECT e'\\' , @y"), vec!["@y"]);
    }

    #[test]
    fn unterminated_quote_swallows_rest() {
        assert_eq!(names("SELECT 'open @x"), Vec::<&str>::new());
    }
}
