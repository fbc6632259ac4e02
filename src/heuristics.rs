//! Text-level heuristics over raw statement source.
//!
//! These deliberately work on text rather than the AST: they are best-effort
//! fallbacks whose false negatives are acceptable.

/// Raw text mentions the `auth.users` identity table, quoted or not.
pub fn references_auth_users(raw_sql: &str) -> bool {
    let lower = raw_sql.to_lowercase();
    lower.contains("auth.users") || lower.contains("\"auth\".\"users\"")
}

/// Raw policy text reads `user_metadata` from the JWT or `raw_user_meta_data`
/// from the identity table. Both are writable by end users.
pub fn references_user_metadata(raw_sql: &str) -> bool {
    let lower = raw_sql.to_lowercase();
    (lower.contains("auth.jwt()") && lower.contains("user_metadata"))
        || (lower.contains("current_setting")
            && lower.contains("request.jwt.claims")
            && lower.contains("user_metadata"))
        || lower.contains("raw_user_meta_data")
}

/// Byte offset just past the first case-insensitive occurrence of `keyword`.
pub fn find_clause(raw_sql: &str, keyword: &str) -> Option<usize> {
    raw_sql
        .to_ascii_lowercase()
        .find(&keyword.to_ascii_lowercase())
        .map(|idx| idx + keyword.len())
}

/// Body of the first balanced parenthesized group at or after `start`,
/// without the outer parentheses. `None` if there is no group or it never closes.
pub fn clause_body(raw_sql: &str, start: usize) -> Option<&str> {
    let rest = raw_sql.get(start..)?;
    let open = rest.find('(')?;
    let mut depth = 0usize;
    for (i, c) in rest[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(rest[open + 1..open + i].trim());
                }
            }
            _ => {}
        }
    }
    None
}

const ALWAYS_TRUE: &[&str] = &["true", "(true)", "1=1", "(1=1)"];

/// Expression text is a trivially true predicate such as `true` or `1 = 1`.
pub fn is_always_true(expr: &str) -> bool {
    let compact: String = expr
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    ALWAYS_TRUE.contains(&compact.as_str())
}

/// Convenience: body of the clause introduced by `keyword`, if present.
pub fn extract_clause<'a>(raw_sql: &'a str, keyword: &str) -> Option<&'a str> {
    clause_body(raw_sql, find_clause(raw_sql, keyword)?)
}
