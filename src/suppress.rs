//! Suppression directive parsing
//!
//! Parses inline SQL comments for suppression directives:
//! - `-- schemalint-disable-next-line rule-a, rule-b` - suppress the next line
//! - `-- schemalint-disable rule-a` - suppress for the whole file (only honored
//!   in the first ten lines)
//!
//! `*` in place of a rule ID suppresses every rule.

use std::collections::{HashMap, HashSet};

const DIRECTIVE: &str = "schemalint-disable";
const NEXT_LINE_SUFFIX: &str = "-next-line";

/// File-wide directives further down than this are ignored.
pub const FILE_WIDE_WINDOW: usize = 10;

pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirectiveScope {
    NextLine,
    File,
}

/// Parsed suppression directives from a single file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Suppressions {
    /// Rules suppressed for the entire file.
    file_level: HashSet<String>,

    /// Rules suppressed for a specific 1-based line.
    line_level: HashMap<usize, HashSet<String>>,
}

impl Suppressions {
    /// Check if a rule is suppressed at a given line. Diagnostics without a
    /// line are only affected by file-wide directives.
    pub fn is_suppressed(&self, rule_id: &str, line: Option<usize>) -> bool {
        if matches_rule(&self.file_level, rule_id) {
            return true;
        }

        line.and_then(|l| self.line_level.get(&l))
            .is_some_and(|rules| matches_rule(rules, rule_id))
    }

    /// Rules disabled for the whole file.
    pub fn file_level(&self) -> &HashSet<String> {
        &self.file_level
    }

    /// Rules disabled on `line`, not counting file-wide directives.
    pub fn rules_on_line(&self, line: usize) -> Option<&HashSet<String>> {
        self.line_level.get(&line)
    }
}

fn matches_rule(rules: &HashSet<String>, rule_id: &str) -> bool {
    rules.contains(rule_id) || rules.contains(WILDCARD)
}

/// Recognize a directive comment. Returns its scope and the listed rule IDs.
fn parse_directive(line: &str) -> Option<(DirectiveScope, Vec<String>)> {
    let rest = line.trim().strip_prefix("--")?.trim_start();
    let head = rest.get(..DIRECTIVE.len())?;
    if !head.eq_ignore_ascii_case(DIRECTIVE) {
        return None;
    }
    let rest = &rest[DIRECTIVE.len()..];

    let (scope, rules_str) = match rest.get(..NEXT_LINE_SUFFIX.len()) {
        Some(suffix) if suffix.eq_ignore_ascii_case(NEXT_LINE_SUFFIX) => {
            (DirectiveScope::NextLine, &rest[NEXT_LINE_SUFFIX.len()..])
        }
        _ => (DirectiveScope::File, rest),
    };

    // Require whitespace between the directive and its rule list so that
    // `schemalint-disabled` and friends are not taken as directives.
    if !rules_str.starts_with(char::is_whitespace) {
        return None;
    }

    let rules: Vec<String> = rules_str
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect();
    if rules.is_empty() {
        return None;
    }
    Some((scope, rules))
}

fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with("--")
}

/// Parse suppression comments from SQL source text.
pub fn parse_suppressions(source: &str) -> Suppressions {
    let mut suppressions = Suppressions::default();
    let lines: Vec<&str> = source.lines().collect();

    for (idx, line) in lines.iter().enumerate() {
        let Some((scope, rules)) = parse_directive(line) else {
            continue;
        };

        match scope {
            DirectiveScope::File => {
                if idx < FILE_WIDE_WINDOW {
                    suppressions.file_level.extend(rules);
                } else {
                    tracing::debug!(line = idx + 1, "file-wide directive outside header ignored");
                }
            }
            DirectiveScope::NextLine => {
                // `idx` is 0-based, so the next line is `idx + 2` in 1-based terms.
                let mut targets = vec![idx + 2];
                if lines.get(idx + 1).is_some_and(|l| is_blank_or_comment(l)) {
                    targets.push(idx + 3);
                }
                for target in targets {
                    suppressions
                        .line_level
                        .entry(target)
                        .or_default()
                        .extend(rules.iter().cloned());
                }
            }
        }
    }

    suppressions
}

// ---------------------------------------------------------------------------
// Object-name proximity heuristic
// ---------------------------------------------------------------------------

/// Lines scanned upwards from the defining `CREATE` line.
const PROXIMITY_WINDOW: usize = 3;

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// `word` occurs in `line` as a whole identifier: neither neighbour is an
/// identifier character, so `t` does not match inside `create` and `users`
/// does not match `users_archive`.
fn contains_identifier(line: &str, word: &str) -> bool {
    line.match_indices(word).any(|(start, _)| {
        let before = line[..start].chars().next_back();
        let after = line[start + word.len()..].chars().next();
        !before.is_some_and(is_identifier_char) && !after.is_some_and(is_identifier_char)
    })
}

/// First double-quoted identifier in a diagnostic message.
pub fn quoted_identifier(message: &str) -> Option<&str> {
    let start = message.find('"')? + 1;
    let len = message[start..].find('"')?;
    let ident = &message[start..start + len];
    (!ident.is_empty()).then_some(ident)
}

/// Best-effort textual check for diagnostics whose line does not point at
/// the directive's target, e.g. schema-rule findings reported at a later
/// statement.
///
/// Takes the first quoted identifier in `message`, strips any schema
/// qualifier, finds the first line containing both `create` and the name
/// as whole identifiers (case-insensitive) and looks at up to three lines above it, through the
/// contiguous run of comments and blank lines, for a `disable-next-line`
/// directive naming `rule_id` or `*`.
pub fn suppressed_by_object_name(source: &str, rule_id: &str, message: &str) -> bool {
    let Some(ident) = quoted_identifier(message) else {
        return false;
    };
    let name = ident
        .rsplit('.')
        .next()
        .unwrap_or(ident)
        .to_ascii_lowercase();
    if name.is_empty() {
        return false;
    }

    let lines: Vec<&str> = source.lines().collect();
    let Some(create_idx) = lines.iter().position(|line| {
        let lower = line.to_ascii_lowercase();
        contains_identifier(&lower, "create") && contains_identifier(&lower, &name)
    }) else {
        return false;
    };

    for prev in lines[create_idx.saturating_sub(PROXIMITY_WINDOW)..create_idx]
        .iter()
        .rev()
    {
        if let Some((DirectiveScope::NextLine, rules)) = parse_directive(prev)
            && rules.iter().any(|r| r == rule_id || r == WILDCARD)
        {
            return true;
        }
        if !is_blank_or_comment(prev) {
            break;
        }
    }

    false
}
