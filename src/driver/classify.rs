//! Statement classification for the `type` tag.

/// Statement types reported by [`statement_type`], besides `OTHER`.
pub const STATEMENT_TYPES: &[&str] = &[
    "SELECT", "INSERT", "UPDATE", "DELETE", "MERGE", "UPSERT", "REPLACE", "WITH", "CREATE",
    "ALTER", "DROP", "TRUNCATE", "BEGIN", "COMMIT", "ROLLBACK", "SAVEPOINT", "CALL", "EXPLAIN",
    "SET", "SHOW", "GRANT", "REVOKE",
];

/// Returns the uppercase SQL verb of `sql`, or `OTHER`.
///
/// Leading whitespace, parentheses and comments are skipped.
///
/// ```rust
/// use dbcensus::driver::statement_type;
///
/// assert_eq!(statement_type("  select * from t"), "SELECT");
/// assert_eq!(statement_type("-- audit\nINSERT INTO t VALUES (1)"), "INSERT");
/// assert_eq!(statement_type("VACUUM"), "OTHER");
/// ```
pub fn statement_type(sql: &str) -> &'static str {
    let rest = skip_preamble(sql);
    let word: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    STATEMENT_TYPES.iter().find(|t| **t == word).copied().unwrap_or("OTHER")
}

fn skip_preamble(mut sql: &str) -> &str {
    loop {
        sql = sql.trim_start_matches(|c: char| c.is_whitespace() || c == '(');
        if let Some(rest) = sql.strip_prefix("--") {
            sql = rest.find('\n').map_or("", |idx| &rest[idx + 1..]);
        } else if let Some(rest) = sql.strip_prefix("/*") {
            sql = rest.find("*/").map_or("", |idx| &rest[idx + 2..]);
        } else {
            return sql;
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("SELECT 1", "SELECT" ; "plain")]
    #[test_case("\n\tupdate t set a = 1", "UPDATE" ; "lowercase with whitespace")]
    #[test_case("(SELECT 1) UNION (SELECT 2)", "SELECT" ; "parenthesized")]
    #[test_case("/* hint */ DELETE FROM t", "DELETE" ; "block comment")]
    #[test_case("-- one\n-- two\nWITH x AS (SELECT 1) SELECT * FROM x", "WITH" ; "line comments")]
    #[test_case("SELECTED", "OTHER" ; "prefix only")]
    #[test_case("", "OTHER" ; "empty")]
    #[test_case("/* unterminated", "OTHER" ; "unterminated comment")]
    fn test_statement_type(sql: &str, expected: &str) {
        assert_eq!(statement_type(sql), expected);
    }
}
