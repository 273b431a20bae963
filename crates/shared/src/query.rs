//! Query-string parsing helpers shared by list endpoints.

/// Parses a boolean filter value.
///
/// Only the literal string `"false"` (any casing) is treated as false;
/// every other value, including empty strings, is true.
pub fn parse_bool_param(value: &str) -> bool {
    !value.eq_ignore_ascii_case("false")
}

/// Escapes `%` and `_` wildcards plus the escape character itself so a
/// user-supplied search term can be embedded in an `ILIKE` pattern.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        match c {
            '\\' | '%' | '_' => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Builds a `%term%` contains-pattern with wildcards escaped.
pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_false_literal_any_case() {
        assert!(!parse_bool_param("false"));
        assert!(!parse_bool_param("False"));
        assert!(!parse_bool_param("FALSE"));
    }

    #[test]
    fn test_everything_else_is_true() {
        assert!(parse_bool_param("true"));
        assert!(parse_bool_param("1"));
        assert!(parse_bool_param("0"));
        assert!(parse_bool_param("no"));
        assert!(parse_bool_param(""));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_contains_pattern() {
        assert_eq!(contains_pattern("ram"), "%ram%");
        assert_eq!(contains_pattern("10%"), "%10\\%%");
    }
}
